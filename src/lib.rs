//! # mirrortable
//!
//! Peer game-state replication for a two-player card table.
//!
//! Two clients, each authoritative only for its own hidden information
//! (hand, deck order), keep a shared notion of where every card is by
//! exchanging small JSON events through a relay that validates nothing
//! and guarantees only per-sender FIFO delivery. Each side holds its
//! own zones plus a *mirror* of the opponent's, reconstructed purely
//! from received events.
//!
//! ## Design Principles
//!
//! 1. **Commit locally, notify remotely**: every event describes a
//!    mutation that already happened on the sender. There are no
//!    requests, acknowledgements, or retries.
//!
//! 2. **Found-or-synthesize reconciliation**: a received move relocates
//!    the card if the mirror holds it where claimed, and fabricates it
//!    otherwise. First reveals and desync repair share one code path.
//!
//! 3. **Explicit context**: all state lives in a `GameSession`; the
//!    crate holds no module-level singletons.
//!
//! ## Modules
//!
//! - `core`: card identity, card types, positions, deck RNG
//! - `zones`: stack and slotted zones, placement validation
//! - `board`: layout geometry and the local mutation API
//! - `protocol`: wire codec and mirror reconciliation
//! - `characters`: wound/burden/strength counter tracking
//! - `phase`: the turn/phase machine and burden bidding
//! - `deck`: deck list CSV parsing
//! - `session`: the `GameSession` context object

pub mod board;
pub mod characters;
pub mod core;
pub mod deck;
pub mod phase;
pub mod protocol;
pub mod session;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Card, CardId, CardType, CardUuid, DeckRng, DeckRngState, Position, UuidAllocator,
};

pub use crate::zones::{MoveError, Slot, SlotKind, SlottedZone, StackZone, ZoneName, ZoneSet, SLOT_COUNT};

pub use crate::board::{AppliedMove, PlayerView};

pub use crate::protocol::{
    decode_card_event, decode_game_event, encode_card_event, encode_game_event, CardMovedEvent,
    GameEvent, GameEventEnvelope, PileName, PlayerId, Reconciliation, WireError,
};

pub use crate::characters::{CharacterError, CharacterInfo, CharacterTracker};

pub use crate::phase::{FellowshipHolder, GamePhase, PhaseError, PhaseMachine, PhaseSignal};

pub use crate::deck::{parse_deck_csv, DeckError, DeckRecord};

pub use crate::session::{GameSession, Outbound, SessionError, SnapshotError, UiPrompt};
