//! Character counter tracking, separate from zone membership.

pub mod tracker;

pub use tracker::{CharacterError, CharacterInfo, CharacterTracker};
