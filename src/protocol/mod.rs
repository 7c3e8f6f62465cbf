//! Wire protocol: event types, JSON codec, and mirror reconciliation.
//!
//! ## Key Types
//!
//! - `CardMovedEvent` / `GameEvent`: the two payload families
//! - `PileName`: closed set of wire pile tokens
//! - `Reconciliation`: how an opponent move landed in the mirror
//! - `WireError`: payload decode failure

pub mod events;
pub mod reconcile;

pub use events::{
    decode_card_event, decode_game_event, encode_card_event, encode_game_event, CardMovedEvent,
    GameEvent, GameEventEnvelope, PileName, PlayerId, WireError,
};
pub use reconcile::{apply_card_event, Reconciliation};
