//! Zone containers: ordered stacks and anchor slots.
//!
//! Two zone kinds exist:
//!
//! - *Stack* zones (hand, discard, draw deck, site deck, dead pile,
//!   support, play area): insertion-ordered, "top" is the last element.
//! - *Slotted* zones (9 companion slots, 9 site slots): fixed-index
//!   arrays where each slot holds at most one occupant card plus any
//!   number of attachments stacked on it. The companion row is occupied
//!   by anchor characters; the site track is occupied by site cards,
//!   with minions and attachments stacking on the site.
//!
//! Slot placement rules are validated here: an occupant may not land on
//! an occupied slot, and an attachment may not be the first card into an
//! empty slot. Violations are rejected without mutating anything, which
//! matters because the emitted event is the only signal the peer gets -
//! a silently accepted illegal move would desync the mirror.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::{Card, CardType, CardUuid};

/// Number of companion slots and site slots per side.
pub const SLOT_COUNT: usize = 9;

/// Which zone a card currently occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneName {
    Hand,
    Discard,
    DrawDeck,
    SiteDeck,
    DeadPile,
    Support,
    PlayArea,
    /// Companion slot by index (0..SLOT_COUNT).
    Companion(u8),
    /// Site slot by index (0..SLOT_COUNT).
    Site(u8),
}

/// Local placement rejection. The move is refused, nothing is mutated,
/// and no event is emitted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("slot {index} already holds an occupant")]
    SlotOccupied { index: usize },

    #[error("attachment may not enter empty slot {index} first")]
    NoAnchor { index: usize },

    #[error("slot index {index} out of range")]
    BadSlotIndex { index: usize },

    #[error("card {uuid} is not in any zone")]
    UnknownCard { uuid: CardUuid },

    #[error("no site numbered {site_num} in the site deck")]
    MissingSite { site_num: u8 },

    #[error("slotted destination without a slot index")]
    MissingIndex,
}

/// An insertion-ordered pile of cards. Top of the pile is the last
/// element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StackZone {
    cards: Vec<Card>,
}

impl StackZone {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a card onto the top of the stack.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Remove and return the card with the given uuid, preserving the
    /// order of the rest.
    pub fn take(&mut self, uuid: CardUuid) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.uuid == uuid)?;
        Some(self.cards.remove(idx))
    }

    /// Remove and return the top card.
    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    #[must_use]
    pub fn contains(&self, uuid: CardUuid) -> bool {
        self.cards.iter().any(|c| c.uuid == uuid)
    }

    #[must_use]
    pub fn get(&self, uuid: CardUuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.uuid == uuid)
    }

    #[must_use]
    pub fn top(&self) -> Option<&Card> {
        self.cards.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.iter_mut()
    }

    /// Access the backing slice (bottom to top).
    #[must_use]
    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Mutable access for shuffling at deck load.
    pub fn as_mut_slice(&mut self) -> &mut [Card] {
        &mut self.cards
    }
}

/// What kind of card occupies a slot in a slotted zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Companion row: occupied by anchor characters.
    Companion,
    /// Site track: occupied by site cards; everything else stacks.
    Site,
}

impl SlotKind {
    /// Does a card of this type occupy the slot (as opposed to stacking
    /// on the occupant)?
    #[must_use]
    pub fn is_occupant(self, card_type: CardType) -> bool {
        match self {
            SlotKind::Companion => card_type.is_anchor(),
            SlotKind::Site => matches!(card_type, CardType::Site),
        }
    }
}

/// One slot of a slotted zone: at most one occupant, any number of
/// attachments stacked on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    anchor: Option<Card>,
    attachments: SmallVec<[Card; 4]>,
}

impl Slot {
    /// Check whether a card could be placed here, without mutating.
    /// Called before the card is lifted out of its source zone so a
    /// rejection leaves both zones untouched.
    fn can_accept(&self, occupant: bool, index: usize) -> Result<(), MoveError> {
        if occupant {
            if self.anchor.is_some() {
                return Err(MoveError::SlotOccupied { index });
            }
        } else if self.anchor.is_none() {
            return Err(MoveError::NoAnchor { index });
        }
        Ok(())
    }

    fn place(&mut self, card: Card, occupant: bool) {
        if occupant {
            debug_assert!(self.anchor.is_none());
            self.anchor = Some(card);
        } else {
            self.attachments.push(card);
        }
    }

    /// Remove the card with the given uuid. Attachments stay behind when
    /// their occupant is taken; the slot rules constrain insertion only.
    pub fn take(&mut self, uuid: CardUuid) -> Option<Card> {
        if self.anchor.as_ref().map(|c| c.uuid) == Some(uuid) {
            return self.anchor.take();
        }
        let idx = self.attachments.iter().position(|c| c.uuid == uuid)?;
        Some(self.attachments.remove(idx))
    }

    #[must_use]
    pub fn contains(&self, uuid: CardUuid) -> bool {
        self.anchor.as_ref().map(|c| c.uuid) == Some(uuid)
            || self.attachments.iter().any(|c| c.uuid == uuid)
    }

    /// The occupant card, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&Card> {
        self.anchor.as_ref()
    }

    pub fn anchor_mut(&mut self) -> Option<&mut Card> {
        self.anchor.as_mut()
    }

    #[must_use]
    pub fn attachments(&self) -> &[Card] {
        &self.attachments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchor.is_none() && self.attachments.is_empty()
    }

    /// Cards in this slot: occupant first, then attachments in stack
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.anchor.iter().chain(self.attachments.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.anchor.is_some()) + self.attachments.len()
    }
}

/// Fixed array of occupant slots (companion row or site track).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlottedZone {
    kind: SlotKind,
    slots: [Slot; SLOT_COUNT],
}

impl SlottedZone {
    #[must_use]
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            slots: Default::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Validate placement at `index` without mutating.
    pub fn can_accept(&self, index: usize, card_type: CardType) -> Result<(), MoveError> {
        let slot = self
            .slots
            .get(index)
            .ok_or(MoveError::BadSlotIndex { index })?;
        slot.can_accept(self.kind.is_occupant(card_type), index)
    }

    /// Place a validated card at `index`.
    ///
    /// Callers must have validated with [`SlottedZone::can_accept`];
    /// this is `pub(crate)` so zone invariants cannot be bypassed from
    /// outside the crate.
    pub(crate) fn place(&mut self, index: usize, card: Card) {
        let occupant = self.kind.is_occupant(card.card_type);
        self.slots[index].place(card, occupant);
    }

    /// Find which slot holds a uuid.
    #[must_use]
    pub fn find(&self, uuid: CardUuid) -> Option<usize> {
        self.slots.iter().position(|s| s.contains(uuid))
    }

    /// Remove a card from whichever slot holds it.
    pub fn take(&mut self, uuid: CardUuid) -> Option<(usize, Card)> {
        let index = self.find(uuid)?;
        let card = self.slots[index].take(uuid)?;
        Some((index, card))
    }

    #[must_use]
    pub fn contains(&self, uuid: CardUuid) -> bool {
        self.find(uuid).is_some()
    }

    pub fn iter_slots(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate()
    }

    /// All cards across all slots.
    pub fn iter_cards(&self) -> impl Iterator<Item = &Card> {
        self.slots.iter().flat_map(Slot::iter)
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.slots.iter().map(Slot::len).sum()
    }
}
