//! Card identity.
//!
//! Every card instance carries two identifiers:
//!
//! - `CardUuid`: process-unique instance identity, allocated by whichever
//!   side *created* the card. This is the only key that is stable across
//!   wire messages.
//! - `CardId`: the card-definition reference (e.g. `"LOTR-EN01364"`). Many
//!   instances may share one `CardId`.
//!
//! Uuids for remotely created cards are adopted verbatim from the wire -
//! the creator is the uuid authority, never the observer.

use serde::{Deserialize, Serialize};

/// Process-unique card instance identity.
///
/// Allocated monotonically by [`UuidAllocator`]; never reused within a
/// session. A given uuid exists in at most one zone, on at most one side,
/// at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardUuid(pub u64);

impl CardUuid {
    /// Get the raw uuid value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for CardUuid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for CardUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// Card-definition reference.
///
/// Not unique per instance: a deck typically contains several copies of
/// the same definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a card-definition reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw definition string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Monotonic uuid source for locally created cards.
///
/// Callers must never reuse a returned uuid. Remote uuids bypass the
/// allocator entirely (they are adopted from the wire), so two peers
/// allocating from overlapping ranges is harmless: a uuid only needs to
/// be unique among the cards *this* process created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidAllocator {
    next: u64,
}

impl UuidAllocator {
    /// Create an allocator starting at 1 (0 is reserved as "unset" in
    /// debug output).
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return a uuid never previously returned by this allocator.
    pub fn allocate(&mut self) -> CardUuid {
        let uuid = CardUuid(self.next);
        self.next += 1;
        uuid
    }
}

impl Default for UuidAllocator {
    fn default() -> Self {
        Self::new()
    }
}
