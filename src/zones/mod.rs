//! Zone model: named card containers and placement rules.
//!
//! ## Key Types
//!
//! - `ZoneName`: which zone a card occupies
//! - `StackZone`: insertion-ordered pile (top = last)
//! - `SlottedZone` / `Slot`: fixed-index anchor slots with attachments
//! - `ZoneSet`: every zone one side owns
//! - `MoveError`: local-validation rejection (refused, nothing mutated)

pub mod set;
pub mod zone;

pub use set::ZoneSet;
pub use zone::{MoveError, Slot, SlotKind, SlottedZone, StackZone, ZoneName, SLOT_COUNT};
