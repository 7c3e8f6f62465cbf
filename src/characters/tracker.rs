//! Per-character counter state (wounds, burdens, strength modifier).
//!
//! Counters live beside the zones rather than on the cards: a card move
//! never touches them, and a counter change never moves a card. The two
//! meet only at lifecycle edges (a character entering play starts a
//! zeroed entry, a character leaving to the discard drops it).
//!
//! Remote updates carry absolute values and overwrite whatever is held;
//! there is no merge. An update for a uuid with no mirrored entry is
//! dropped with a warning: the character either never entered play on
//! this side or its move event has not arrived yet, and a late-arriving
//! move will start the entry from zero. That ordering race is accepted.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::CardUuid;

/// Counter update for a uuid this side is not tracking.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("no character entry for {uuid}")]
    UnknownCharacter { uuid: CardUuid },
}

/// The three replicated counters, absolute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub wounds: u8,
    pub burdens: u8,
    pub strength_modifier: i8,
}

/// Counter state for both sides: own characters (authoritative) and
/// mirrored opponent characters (overwritten by remote events).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterTracker {
    own: FxHashMap<CardUuid, CharacterInfo>,
    mirrored: FxHashMap<CardUuid, CharacterInfo>,
}

impl CharacterTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an own character at all-zero counters. A repeat
    /// init (character re-entering play) resets the entry.
    pub fn init_own(&mut self, uuid: CardUuid) {
        self.own.insert(uuid, CharacterInfo::default());
    }

    /// Stop tracking an own character (left play).
    pub fn remove_own(&mut self, uuid: CardUuid) {
        self.own.remove(&uuid);
    }

    pub fn init_mirrored(&mut self, uuid: CardUuid) {
        self.mirrored.insert(uuid, CharacterInfo::default());
    }

    pub fn remove_mirrored(&mut self, uuid: CardUuid) {
        self.mirrored.remove(&uuid);
    }

    #[must_use]
    pub fn own(&self, uuid: CardUuid) -> Option<&CharacterInfo> {
        self.own.get(&uuid)
    }

    #[must_use]
    pub fn mirrored(&self, uuid: CardUuid) -> Option<&CharacterInfo> {
        self.mirrored.get(&uuid)
    }

    /// Mutate an own character's counters and return the new absolute
    /// values for emission.
    pub fn update_own<F>(&mut self, uuid: CardUuid, f: F) -> Result<CharacterInfo, CharacterError>
    where
        F: FnOnce(&mut CharacterInfo),
    {
        let info = self
            .own
            .get_mut(&uuid)
            .ok_or(CharacterError::UnknownCharacter { uuid })?;
        f(info);
        Ok(*info)
    }

    /// Overwrite a mirrored character's counters with remote absolute
    /// values. Unknown uuids are dropped, not created: creation happens
    /// only when the character's move event lands.
    pub fn apply_remote(&mut self, uuid: CardUuid, info: CharacterInfo) {
        match self.mirrored.get_mut(&uuid) {
            Some(entry) => {
                *entry = info;
                debug!(uuid = uuid.raw(), ?info, "mirrored counters overwritten");
            }
            None => {
                warn!(
                    uuid = uuid.raw(),
                    "counter update for untracked character, dropped"
                );
            }
        }
    }

    pub fn iter_own(&self) -> impl Iterator<Item = (CardUuid, &CharacterInfo)> {
        self.own.iter().map(|(k, v)| (*k, v))
    }

    pub fn iter_mirrored(&self) -> impl Iterator<Item = (CardUuid, &CharacterInfo)> {
        self.mirrored.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_own_returns_absolute_values() {
        let mut tracker = CharacterTracker::new();
        tracker.init_own(CardUuid(1));

        let info = tracker
            .update_own(CardUuid(1), |i| i.wounds += 1)
            .unwrap();
        assert_eq!(info.wounds, 1);

        let info = tracker
            .update_own(CardUuid(1), |i| {
                i.wounds += 1;
                i.strength_modifier = -2;
            })
            .unwrap();
        assert_eq!(info.wounds, 2);
        assert_eq!(info.strength_modifier, -2);
    }

    #[test]
    fn test_update_unknown_character() {
        let mut tracker = CharacterTracker::new();
        assert_eq!(
            tracker.update_own(CardUuid(9), |i| i.wounds += 1),
            Err(CharacterError::UnknownCharacter { uuid: CardUuid(9) })
        );
    }

    #[test]
    fn test_remote_update_overwrites_whole_entry() {
        let mut tracker = CharacterTracker::new();
        tracker.init_mirrored(CardUuid(1));
        tracker.apply_remote(
            CardUuid(1),
            CharacterInfo {
                wounds: 3,
                burdens: 1,
                strength_modifier: 2,
            },
        );

        // Last message wins, even "backwards".
        tracker.apply_remote(
            CardUuid(1),
            CharacterInfo {
                wounds: 1,
                burdens: 0,
                strength_modifier: 0,
            },
        );

        assert_eq!(
            tracker.mirrored(CardUuid(1)),
            Some(&CharacterInfo {
                wounds: 1,
                burdens: 0,
                strength_modifier: 0,
            })
        );
    }

    #[test]
    fn test_remote_update_for_untracked_uuid_is_dropped() {
        let mut tracker = CharacterTracker::new();
        tracker.apply_remote(
            CardUuid(7),
            CharacterInfo {
                wounds: 1,
                burdens: 0,
                strength_modifier: 0,
            },
        );

        assert_eq!(tracker.mirrored(CardUuid(7)), None);
    }

    #[test]
    fn test_reentering_play_resets_counters() {
        let mut tracker = CharacterTracker::new();
        tracker.init_own(CardUuid(1));
        tracker.update_own(CardUuid(1), |i| i.wounds = 3).unwrap();

        tracker.remove_own(CardUuid(1));
        tracker.init_own(CardUuid(1));

        assert_eq!(tracker.own(CardUuid(1)), Some(&CharacterInfo::default()));
    }
}
