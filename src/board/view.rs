//! The local mutation API.
//!
//! A `PlayerView` is the complete state one client owns: its own
//! authoritative zones plus a mirror of the opponent's, populated only by
//! the reconciliation engine. All `place_*` operations here act on the
//! *own* side: validate, move, recompute the layout-derived position, and
//! return an [`AppliedMove`] describing the committed fact. The caller
//! (the session) turns that record into the wire event - the event is a
//! notification of something that already happened, never a request.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::layout;
use crate::core::{Card, CardId, CardType, CardUuid, Position};
use crate::zones::{MoveError, ZoneName, ZoneSet};

/// A committed local move, with everything the codec needs to describe
/// it on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedMove {
    pub uuid: CardUuid,
    pub id: CardId,
    pub card_type: CardType,
    pub from: ZoneName,
    pub to: ZoneName,
    /// Position already written onto the card before emission.
    pub position: Position,
    /// Slot/site index when the destination is a slotted zone.
    pub index: Option<u8>,
}

impl AppliedMove {
    fn new(card: &Card, from: ZoneName, to: ZoneName, index: Option<u8>) -> Self {
        Self {
            uuid: card.uuid,
            id: card.id.clone(),
            card_type: card.card_type,
            from,
            to,
            position: card.position,
            index,
        }
    }
}

/// One client's complete view of the table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Authoritative zones, mutated only through the local mutation API.
    pub own: ZoneSet,
    /// Best-effort reconstruction of the opponent, mutated only by the
    /// reconciliation engine.
    pub mirror: ZoneSet,
}

impl PlayerView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a card into the hand, fanning it onto the end of the row.
    pub fn place_in_hand(&mut self, uuid: CardUuid) -> Result<AppliedMove, MoveError> {
        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = layout::hand_position(self.own.hand.len());
        let record = AppliedMove::new(&card, from, ZoneName::Hand, None);
        self.own.hand.push(card);
        debug!(uuid = record.uuid.raw(), ?from, "placed in hand");
        Ok(record)
    }

    /// Move a card onto the top of the discard pile.
    pub fn place_in_discard(&mut self, uuid: CardUuid) -> Result<AppliedMove, MoveError> {
        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = layout::discard_position();
        let record = AppliedMove::new(&card, from, ZoneName::Discard, None);
        self.own.discard.push(card);
        debug!(uuid = record.uuid.raw(), ?from, "discarded");
        Ok(record)
    }

    /// Move a killed character onto the dead pile.
    ///
    /// The dead pile is not a replicated zone, so this move never
    /// produces a wire event; the card is simply gone from the
    /// opponent's point of view.
    pub fn place_in_dead_pile(&mut self, uuid: CardUuid) -> Result<AppliedMove, MoveError> {
        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = layout::dead_pile_position();
        let record = AppliedMove::new(&card, from, ZoneName::DeadPile, None);
        self.own.dead_pile.push(card);
        debug!(uuid = record.uuid.raw(), ?from, "moved to dead pile");
        Ok(record)
    }

    /// Move a card into the support area.
    pub fn place_in_support(&mut self, uuid: CardUuid) -> Result<AppliedMove, MoveError> {
        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = layout::support_position(self.own.support.len());
        let record = AppliedMove::new(&card, from, ZoneName::Support, None);
        self.own.support.push(card);
        Ok(record)
    }

    /// Drop a card onto the play area at a caller-chosen position
    /// (free placement from a drag).
    pub fn place_on_play_area(
        &mut self,
        uuid: CardUuid,
        position: Position,
    ) -> Result<AppliedMove, MoveError> {
        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = position;
        let record = AppliedMove::new(&card, from, ZoneName::PlayArea, None);
        self.own.play_area.push(card);
        Ok(record)
    }

    /// Place a card into companion slot `slot`: anchors occupy the slot,
    /// everything else stacks on the anchor.
    pub fn place_in_companion_slot(
        &mut self,
        uuid: CardUuid,
        slot: usize,
    ) -> Result<AppliedMove, MoveError> {
        let card_type = self
            .own
            .find(uuid)
            .ok_or(MoveError::UnknownCard { uuid })?
            .card_type;
        // Validate before lifting the card so a rejection changes nothing.
        self.own.companions.can_accept(slot, card_type)?;

        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = if card.card_type.is_anchor() {
            layout::companion_slot_position(slot)
        } else {
            let stacked = self.own.companions.slot(slot).map_or(0, |s| {
                s.attachments().len()
            });
            layout::attachment_position(slot, stacked)
        };
        let record = AppliedMove::new(&card, from, ZoneName::Companion(slot as u8), Some(slot as u8));
        self.own.companions.place(slot, card);
        debug!(uuid = record.uuid.raw(), slot, "placed in companion slot");
        Ok(record)
    }

    /// Place a card at site slot `slot`: site cards occupy the slot,
    /// minions and attachments stack on the revealed site.
    pub fn place_at_site(&mut self, uuid: CardUuid, slot: usize) -> Result<AppliedMove, MoveError> {
        let card_type = self
            .own
            .find(uuid)
            .ok_or(MoveError::UnknownCard { uuid })?
            .card_type;
        self.own.sites.can_accept(slot, card_type)?;

        let (mut card, from) = self.own.take_card(uuid)?;
        self.restack_hand();
        card.position = if matches!(card.card_type, CardType::Site) {
            layout::site_slot_position(slot)
        } else {
            let stacked = self.own.sites.slot(slot).map_or(0, |s| s.attachments().len());
            layout::site_attachment_position(slot, stacked)
        };
        let record = AppliedMove::new(&card, from, ZoneName::Site(slot as u8), Some(slot as u8));
        self.own.sites.place(slot, card);
        Ok(record)
    }

    /// Reveal the site with the requested number from the site sub-deck.
    ///
    /// Sites are not drawn randomly: progression is deterministic per
    /// player, keyed by the card's printed site number. Site `n` lands at
    /// site slot `n - 1`.
    pub fn play_site_from_deck(&mut self, site_num: u8) -> Result<AppliedMove, MoveError> {
        let uuid = self
            .own
            .site_deck
            .iter()
            .find(|c| c.site_num == Some(site_num))
            .map(|c| c.uuid)
            .ok_or(MoveError::MissingSite { site_num })?;
        let slot = usize::from(site_num)
            .checked_sub(1)
            .ok_or(MoveError::MissingSite { site_num })?;
        self.place_at_site(uuid, slot)
    }

    /// Draw the top card of the draw deck into the hand.
    ///
    /// Returns `None` on an empty deck (a no-op, not an error).
    pub fn draw_from_deck(&mut self) -> Option<AppliedMove> {
        let uuid = self.own.draw_deck.top()?.uuid;
        // The card is known to exist, so the move cannot fail.
        self.place_in_hand(uuid).ok()
    }

    /// Close the fan-out gap after a card leaves the hand. Positions of
    /// the remaining hand cards are local-only until each next moves.
    fn restack_hand(&mut self) {
        for (i, card) in self.own.hand.iter_mut().enumerate() {
            card.position = layout::hand_position(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_view() -> PlayerView {
        let mut view = PlayerView::new();
        view.own
            .draw_deck
            .push(Card::new(CardUuid(1), CardId::new("c1"), CardType::Companion));
        view.own
            .draw_deck
            .push(Card::new(CardUuid(2), CardId::new("c2"), CardType::Possession));
        view.own
            .draw_deck
            .push(Card::new(CardUuid(3), CardId::new("c3"), CardType::Event));
        view.own.site_deck.push(
            Card::new(CardUuid(4), CardId::new("s1"), CardType::Site).with_site_num(1),
        );
        view.own.site_deck.push(
            Card::new(CardUuid(5), CardId::new("s2"), CardType::Site).with_site_num(2),
        );
        view
    }

    #[test]
    fn test_place_in_hand_fans_out() {
        let mut view = seeded_view();

        let first = view.place_in_hand(CardUuid(1)).unwrap();
        let second = view.place_in_hand(CardUuid(2)).unwrap();

        assert_eq!(first.from, ZoneName::DrawDeck);
        assert_eq!(first.to, ZoneName::Hand);
        assert_eq!(first.position, layout::hand_position(0));
        assert_eq!(second.position, layout::hand_position(1));
        assert_eq!(view.own.hand.len(), 2);
    }

    #[test]
    fn test_removal_restacks_hand() {
        let mut view = seeded_view();
        view.place_in_hand(CardUuid(1)).unwrap();
        view.place_in_hand(CardUuid(2)).unwrap();
        view.place_in_hand(CardUuid(3)).unwrap();

        view.place_in_discard(CardUuid(1)).unwrap();

        let positions: Vec<_> = view.own.hand.iter().map(|c| c.position).collect();
        assert_eq!(positions[0], layout::hand_position(0));
        assert_eq!(positions[1], layout::hand_position(1));
    }

    #[test]
    fn test_companion_slot_placement() {
        let mut view = seeded_view();

        let anchor = view.place_in_companion_slot(CardUuid(1), 0).unwrap();
        assert_eq!(anchor.index, Some(0));
        assert_eq!(anchor.position, layout::companion_slot_position(0));

        let attachment = view.place_in_companion_slot(CardUuid(2), 0).unwrap();
        assert_eq!(attachment.position, layout::attachment_position(0, 0));
    }

    #[test]
    fn test_dead_pile_placement() {
        let mut view = seeded_view();
        view.place_in_companion_slot(CardUuid(1), 0).unwrap();

        let record = view.place_in_dead_pile(CardUuid(1)).unwrap();

        assert_eq!(record.from, ZoneName::Companion(0));
        assert_eq!(record.to, ZoneName::DeadPile);
        assert_eq!(record.position, layout::dead_pile_position());
        assert!(view.own.dead_pile.contains(CardUuid(1)));
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut view = seeded_view();
        let before = view.clone();

        // Attachment into an empty companion slot.
        let err = view.place_in_companion_slot(CardUuid(2), 3).unwrap_err();
        assert_eq!(err, MoveError::NoAnchor { index: 3 });
        assert_eq!(view, before);
    }

    #[test]
    fn test_play_site_from_deck_is_keyed_not_random() {
        let mut view = seeded_view();

        let record = view.play_site_from_deck(2).unwrap();
        assert_eq!(record.uuid, CardUuid(5));
        assert_eq!(record.to, ZoneName::Site(1));
        assert_eq!(record.position, layout::site_slot_position(1));

        assert_eq!(
            view.play_site_from_deck(7),
            Err(MoveError::MissingSite { site_num: 7 })
        );
    }

    #[test]
    fn test_draw_from_deck() {
        let mut view = seeded_view();

        let drawn = view.draw_from_deck().unwrap();
        assert_eq!(drawn.uuid, CardUuid(3)); // top of deck
        assert_eq!(drawn.from, ZoneName::DrawDeck);

        view.draw_from_deck().unwrap();
        view.draw_from_deck().unwrap();
        assert!(view.draw_from_deck().is_none());
    }

    #[test]
    fn test_conservation_under_moves() {
        let mut view = seeded_view();
        let total = view.own.total_cards();

        view.draw_from_deck().unwrap();
        view.place_in_companion_slot(CardUuid(1), 0).unwrap();
        view.play_site_from_deck(1).unwrap();
        view.place_in_discard(CardUuid(1)).unwrap();

        assert_eq!(view.own.total_cards(), total);
    }
}
