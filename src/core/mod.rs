//! Identity primitives: card uuids, card instances, positions, deck RNG.
//!
//! Everything here is side-agnostic: the same types describe a card in
//! the local authoritative zones and a card synthesized into the mirror
//! from a remote event.

pub mod card;
pub mod ids;
pub mod rng;

pub use card::{Card, CardType, Position};
pub use ids::{CardId, CardUuid, UuidAllocator};
pub use rng::{DeckRng, DeckRngState};
