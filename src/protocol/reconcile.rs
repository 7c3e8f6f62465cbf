//! Mirror reconciliation: applying the opponent's card events.
//!
//! The receiver trusts the sender's claim about where the card came
//! from. The uuid is looked up *only* in the mirrored pile named by
//! `fromPile`; a hit relocates the existing mirror card, a miss
//! synthesizes a fresh one from the event's identity fields. A miss is
//! normal for first reveals (cards leaving the sender's hidden zones),
//! but after message loss the same path resurrects cards the mirror has
//! simply misplaced, so the outcome is reported explicitly rather than
//! folded away.
//!
//! Play-area destinations pass through the mirror transform; every
//! other destination adopts the sender's position verbatim.

use tracing::{debug, warn};

use super::events::{CardMovedEvent, PileName};
use crate::board::layout;
use crate::core::{Card, CardType};
use crate::zones::{MoveError, ZoneName, ZoneSet};

/// How a card event landed in the mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The card was found in the claimed source pile and moved.
    Relocated { from: ZoneName },
    /// No such card in the claimed source pile; a new mirror card was
    /// created from the event's identity fields.
    Synthesized,
}

/// Apply one opponent card event to the mirror.
///
/// On error the mirror is untouched and the event is dropped; the
/// boards silently disagree from here on, which is the protocol's
/// stated failure mode for divergent peers.
pub fn apply_card_event(
    mirror: &mut ZoneSet,
    event: &CardMovedEvent,
) -> Result<Reconciliation, MoveError> {
    // Validate the destination before touching the source pile so a
    // rejected event changes nothing.
    let slot = match event.to_pile {
        PileName::PlayerCompanion => {
            let index = usize::from(event.index.ok_or(MoveError::MissingIndex)?);
            mirror.companions.can_accept(index, event.card_type)?;
            Some(index)
        }
        PileName::Site => {
            let index = usize::from(event.index.ok_or(MoveError::MissingIndex)?);
            mirror.sites.can_accept(index, event.card_type)?;
            Some(index)
        }
        _ => None,
    };

    let (mut card, outcome) = match take_from_pile(mirror, event.from_pile, event) {
        Some((card, from)) => (card, Reconciliation::Relocated { from }),
        None => {
            warn!(
                uuid = event.card_uuid.raw(),
                from = ?event.from_pile,
                "card not in claimed pile, synthesizing"
            );
            let mut card = Card::new(event.card_uuid, event.card_id.clone(), event.card_type);
            if matches!(event.card_type, CardType::Site) {
                card.site_num = event.index.map(|i| i + 1);
            }
            (card, Reconciliation::Synthesized)
        }
    };

    card.position = if event.to_pile == PileName::PlayArea {
        layout::mirror_play_area(event.position)
    } else {
        event.position
    };

    match (event.to_pile, slot) {
        (PileName::PlayerCompanion, Some(index)) => mirror.companions.place(index, card),
        (PileName::Site, Some(index)) => mirror.sites.place(index, card),
        (PileName::PlayerHand, _) => mirror.hand.push(card),
        (PileName::PlayerDiscard, _) => mirror.discard.push(card),
        (PileName::PlayerSupportArea, _) => mirror.support.push(card),
        (PileName::PlayArea, _) => mirror.play_area.push(card),
        // Slotted piles always resolve a slot above.
        (PileName::PlayerCompanion | PileName::Site, None) => unreachable!(),
    }

    debug!(uuid = event.card_uuid.raw(), to = ?event.to_pile, ?outcome, "mirror updated");
    Ok(outcome)
}

/// Look the uuid up in the single mirrored pile the sender named. Other
/// piles are deliberately not searched: a card that exists elsewhere in
/// the mirror still counts as a miss.
fn take_from_pile(
    mirror: &mut ZoneSet,
    pile: PileName,
    event: &CardMovedEvent,
) -> Option<(Card, ZoneName)> {
    let uuid = event.card_uuid;
    match pile {
        PileName::PlayerHand => mirror.hand.take(uuid).map(|c| (c, ZoneName::Hand)),
        PileName::PlayerDiscard => mirror.discard.take(uuid).map(|c| (c, ZoneName::Discard)),
        PileName::PlayerSupportArea => mirror.support.take(uuid).map(|c| (c, ZoneName::Support)),
        PileName::PlayArea => mirror.play_area.take(uuid).map(|c| (c, ZoneName::PlayArea)),
        PileName::PlayerCompanion => mirror
            .companions
            .take(uuid)
            .map(|(i, c)| (c, ZoneName::Companion(i as u8))),
        PileName::Site => mirror
            .sites
            .take(uuid)
            .map(|(i, c)| (c, ZoneName::Site(i as u8))),
    }
}

/// Apply with warning on failure; returns `None` if the event was
/// dropped.
pub fn apply_or_warn(mirror: &mut ZoneSet, event: &CardMovedEvent) -> Option<Reconciliation> {
    match apply_card_event(mirror, event) {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            warn!(
                uuid = event.card_uuid.raw(),
                %err,
                "dropped opponent card event, mirror now diverges"
            );
            None
        }
    }
}
