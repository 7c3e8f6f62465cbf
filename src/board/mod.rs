//! Board state and geometry.
//!
//! - `layout`: normalized board geometry; protocol-visible because stack
//!   placement encodes fan-out order in card positions
//! - `view`: `PlayerView` (own zones + opponent mirror) and the local
//!   mutation API

pub mod layout;
pub mod view;

pub use view::{AppliedMove, PlayerView};
