//! Card instances and board positions.
//!
//! A [`Card`] is the unit that moves between zones. Its `position` is a
//! normalized board fraction (0..1 on both axes) and is part of the wire
//! format: stack zones encode fan-out order in it, and the play area
//! mirrors it across the horizontal midline on the receiving side.

use serde::{Deserialize, Serialize};

use super::ids::{CardId, CardUuid};

/// Card category, as printed on the definition.
///
/// The variants marked as *anchors* may occupy a companion/site slot by
/// themselves; everything else stacks on an anchor as an attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Companion,
    RingBearer,
    Ring,
    Ally,
    Minion,
    Site,
    Condition,
    Possession,
    Event,
}

impl CardType {
    /// Can this card occupy a slot on its own?
    #[must_use]
    pub const fn is_anchor(self) -> bool {
        matches!(
            self,
            CardType::Companion | CardType::RingBearer | CardType::Ally | CardType::Minion
        )
    }

    /// Does this card carry wound/burden/strength counters?
    ///
    /// Allies occupy slots but have no tracked counters.
    #[must_use]
    pub const fn has_character_info(self) -> bool {
        matches!(
            self,
            CardType::Companion | CardType::RingBearer | CardType::Minion
        )
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardType::Companion => "companion",
            CardType::RingBearer => "ringBearer",
            CardType::Ring => "ring",
            CardType::Ally => "ally",
            CardType::Minion => "minion",
            CardType::Site => "site",
            CardType::Condition => "condition",
            CardType::Possession => "possession",
            CardType::Event => "event",
        };
        f.write_str(name)
    }
}

/// Normalized board position, 0..1 in both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A card instance in a zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Instance identity, stable across wire messages.
    pub uuid: CardUuid,

    /// Definition reference; repeats across copies.
    pub id: CardId,

    /// Printed category.
    pub card_type: CardType,

    /// Normalized board position. Recomputed by zone placement and
    /// carried verbatim on the wire.
    pub position: Position,

    /// Site number (1..=9) for site cards, `None` otherwise.
    pub site_num: Option<u8>,
}

impl Card {
    /// Create a card at the origin.
    #[must_use]
    pub fn new(uuid: CardUuid, id: CardId, card_type: CardType) -> Self {
        Self {
            uuid,
            id,
            card_type,
            position: Position::default(),
            site_num: None,
        }
    }

    /// Set the site number (builder pattern, used at deck load).
    #[must_use]
    pub fn with_site_num(mut self, site_num: u8) -> Self {
        self.site_num = Some(site_num);
        self
    }
}
