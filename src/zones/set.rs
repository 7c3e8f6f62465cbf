//! The full zone collection owned by one side of the table.
//!
//! A `ZoneSet` is used twice per client: once for the local authoritative
//! zones and once for the mirror of the opponent. Only the reconciliation
//! engine writes to the mirror; everything else writes the local set.

use serde::{Deserialize, Serialize};

use super::zone::{MoveError, SlotKind, SlottedZone, StackZone, ZoneName};
use crate::core::{Card, CardUuid};

/// Every zone one side owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    pub hand: StackZone,
    pub discard: StackZone,
    pub draw_deck: StackZone,
    pub site_deck: StackZone,
    pub dead_pile: StackZone,
    pub support: StackZone,
    pub play_area: StackZone,
    pub companions: SlottedZone,
    pub sites: SlottedZone,
}

impl Default for ZoneSet {
    fn default() -> Self {
        Self {
            hand: StackZone::new(),
            discard: StackZone::new(),
            draw_deck: StackZone::new(),
            site_deck: StackZone::new(),
            dead_pile: StackZone::new(),
            support: StackZone::new(),
            play_area: StackZone::new(),
            companions: SlottedZone::new(SlotKind::Companion),
            sites: SlottedZone::new(SlotKind::Site),
        }
    }
}

impl ZoneSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Which zone currently holds this uuid, if any.
    #[must_use]
    pub fn locate(&self, uuid: CardUuid) -> Option<ZoneName> {
        if self.hand.contains(uuid) {
            return Some(ZoneName::Hand);
        }
        if self.discard.contains(uuid) {
            return Some(ZoneName::Discard);
        }
        if self.draw_deck.contains(uuid) {
            return Some(ZoneName::DrawDeck);
        }
        if self.site_deck.contains(uuid) {
            return Some(ZoneName::SiteDeck);
        }
        if self.dead_pile.contains(uuid) {
            return Some(ZoneName::DeadPile);
        }
        if self.support.contains(uuid) {
            return Some(ZoneName::Support);
        }
        if self.play_area.contains(uuid) {
            return Some(ZoneName::PlayArea);
        }
        if let Some(index) = self.companions.find(uuid) {
            return Some(ZoneName::Companion(index as u8));
        }
        if let Some(index) = self.sites.find(uuid) {
            return Some(ZoneName::Site(index as u8));
        }
        None
    }

    #[must_use]
    pub fn contains(&self, uuid: CardUuid) -> bool {
        self.locate(uuid).is_some()
    }

    /// Borrow a card wherever it is.
    #[must_use]
    pub fn find(&self, uuid: CardUuid) -> Option<&Card> {
        self.hand
            .get(uuid)
            .or_else(|| self.discard.get(uuid))
            .or_else(|| self.draw_deck.get(uuid))
            .or_else(|| self.site_deck.get(uuid))
            .or_else(|| self.dead_pile.get(uuid))
            .or_else(|| self.support.get(uuid))
            .or_else(|| self.play_area.get(uuid))
            .or_else(|| self.companions.iter_cards().find(|c| c.uuid == uuid))
            .or_else(|| self.sites.iter_cards().find(|c| c.uuid == uuid))
    }

    /// Remove a card from whichever zone holds it. This is the only
    /// primitive that changes zone membership: the card leaves its old
    /// zone and is owned by the caller until re-inserted, so no observer
    /// of the single-threaded event loop can see it in two zones.
    pub fn take_card(&mut self, uuid: CardUuid) -> Result<(Card, ZoneName), MoveError> {
        let stacks = [
            (&mut self.hand, ZoneName::Hand),
            (&mut self.discard, ZoneName::Discard),
            (&mut self.draw_deck, ZoneName::DrawDeck),
            (&mut self.site_deck, ZoneName::SiteDeck),
            (&mut self.dead_pile, ZoneName::DeadPile),
            (&mut self.support, ZoneName::Support),
            (&mut self.play_area, ZoneName::PlayArea),
        ];
        for (stack, name) in stacks {
            if let Some(card) = stack.take(uuid) {
                return Ok((card, name));
            }
        }
        if let Some((index, card)) = self.companions.take(uuid) {
            return Ok((card, ZoneName::Companion(index as u8)));
        }
        if let Some((index, card)) = self.sites.take(uuid) {
            return Ok((card, ZoneName::Site(index as u8)));
        }
        Err(MoveError::UnknownCard { uuid })
    }

    /// Total card count across every zone. Constant under local moves
    /// (cards are never created or destroyed by a move).
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.hand.len()
            + self.discard.len()
            + self.draw_deck.len()
            + self.site_deck.len()
            + self.dead_pile.len()
            + self.support.len()
            + self.play_area.len()
            + self.companions.total_cards()
            + self.sites.total_cards()
    }
}
