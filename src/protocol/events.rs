//! Wire message families.
//!
//! Two channels reach the relay, each carrying one JSON payload family
//! verbatim:
//!
//! - `cardEvent`: [`CardMovedEvent`] - a card changed piles.
//! - `gameEvent`: [`GameEventEnvelope`] - everything else (deck init,
//!   twilight, character counters, site movement, bidding, phases).
//!
//! Every payload carries `playerId` as sender identity; the relay
//! broadcasts to the whole room including the sender, so receivers drop
//! their own echoes by comparing it.
//!
//! Emission contract: events describe mutations that have *already
//! committed* locally. There is no acknowledgement, retry, or sequence
//! number; delivery is fire-and-forget.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::AppliedMove;
use crate::core::{CardId, CardType, CardUuid, Position};
use crate::phase::GamePhase;
use crate::zones::ZoneName;

/// Sender identity carried on every wire payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pile tokens that travel on the wire.
///
/// This is a closed set: slotted zones put their numeric slot/site index
/// in the event's `index` field rather than widening the token set. The
/// hidden zones (draw deck, site sub-deck, dead pile) have no token -
/// cards leaving them appear on the wire as first reveals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PileName {
    #[serde(rename = "playArea")]
    PlayArea,
    #[serde(rename = "playerHand")]
    PlayerHand,
    #[serde(rename = "playerDiscard")]
    PlayerDiscard,
    #[serde(rename = "playerSupportArea")]
    PlayerSupportArea,
    #[serde(rename = "playerCompanion")]
    PlayerCompanion,
    #[serde(rename = "site")]
    Site,
}

impl PileName {
    /// Wire token for a zone, or `None` for zones that never appear on
    /// the wire.
    #[must_use]
    pub fn from_zone(zone: ZoneName) -> Option<Self> {
        match zone {
            ZoneName::Hand => Some(PileName::PlayerHand),
            ZoneName::Discard => Some(PileName::PlayerDiscard),
            ZoneName::Support => Some(PileName::PlayerSupportArea),
            ZoneName::PlayArea => Some(PileName::PlayArea),
            ZoneName::Companion(_) => Some(PileName::PlayerCompanion),
            ZoneName::Site(_) => Some(PileName::Site),
            ZoneName::DrawDeck | ZoneName::SiteDeck | ZoneName::DeadPile => None,
        }
    }
}

/// A card changed piles on the sender's side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "moveCard", rename_all = "camelCase")]
pub struct CardMovedEvent {
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub card_uuid: CardUuid,
    pub card_type: CardType,
    pub from_pile: PileName,
    pub to_pile: PileName,
    /// Position already written onto the card by the sender's layout.
    pub position: Position,
    /// Slot/site index when `to_pile` is a slotted zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u8>,
}

impl CardMovedEvent {
    /// Describe a committed local move for the wire.
    ///
    /// Moves out of a hidden zone (draw deck, site sub-deck, dead pile)
    /// borrow the *destination* token as `fromPile`: the receiver's
    /// lookup in that pile misses and the card is synthesized, which is
    /// exactly right for a first reveal. Returns `None` for moves whose
    /// destination is itself hidden; those never replicate.
    #[must_use]
    pub fn from_applied(player_id: &PlayerId, moved: &AppliedMove) -> Option<Self> {
        let to_pile = PileName::from_zone(moved.to)?;
        let from_pile = PileName::from_zone(moved.from).unwrap_or(to_pile);
        Some(Self {
            player_id: player_id.clone(),
            card_id: moved.id.clone(),
            card_uuid: moved.uuid,
            card_type: moved.card_type,
            from_pile,
            to_pile,
            position: moved.position,
            index: moved.index,
        })
    }
}

/// Everything that is not a card move.
///
/// `characterInfoChanged` carries the full current value of all three
/// counters (absolute, not delta): last message wins, no merge logic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    DeckInitialized { deck_size: u32, token: String },
    TwilightChanged { twilight: i32 },
    #[serde(rename_all = "camelCase")]
    CharacterInfoChanged {
        character: CardUuid,
        wounds: u8,
        burdens: u8,
        strength_modifier: i8,
    },
    PlayerMoved { site: u8 },
    BurdensBid { burdens: u8 },
    #[serde(rename_all = "camelCase")]
    PhaseFinished { current_state: GamePhase },
    #[serde(rename_all = "camelCase")]
    EndTurn { current_state: GamePhase },
}

/// A [`GameEvent`] with its sender identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEventEnvelope {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub event: GameEvent,
}

/// Payload decode failure (the relay forwards bytes untouched, so this
/// only fires on genuinely malformed JSON or unknown tags).
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a card event for the `cardEvent` channel.
pub fn encode_card_event(event: &CardMovedEvent) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode a payload from the `cardEvent` channel.
pub fn decode_card_event(payload: &str) -> Result<CardMovedEvent, WireError> {
    Ok(serde_json::from_str(payload)?)
}

/// Encode a game event for the `gameEvent` channel.
pub fn encode_game_event(event: &GameEventEnvelope) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode a payload from the `gameEvent` channel.
pub fn decode_game_event(payload: &str) -> Result<GameEventEnvelope, WireError> {
    Ok(serde_json::from_str(payload)?)
}
