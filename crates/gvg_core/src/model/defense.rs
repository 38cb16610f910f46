//! Defense roster model.
//!
//! # Responsibility
//! - Define the stored 3-character defense with per-slot notes and a win tally.
//!
//! # Invariants
//! - Members are pairwise distinct (enforced by `Roster`).
//! - Identity for upsert purposes is `roster.key()`, not `uuid`: saving a
//!   defense whose key already exists overwrites the stored one.

use crate::model::composition::{CompositionKey, Roster, ROSTER_SIZE};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one stored defense.
pub type DefenseId = Uuid;

/// Stored defense composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defense {
    pub uuid: DefenseId,
    /// Slot order as entered; identity ignores it.
    pub roster: Roster,
    /// Free-text note per slot, parallel to `roster.members()`.
    pub member_notes: [String; ROSTER_SIZE],
    pub wins: u32,
    pub notes: String,
}

impl Defense {
    /// Creates a defense with a generated ID, empty notes and zero wins.
    pub fn new(roster: Roster) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            roster,
            member_notes: Default::default(),
            wins: 0,
            notes: String::new(),
        }
    }

    /// Upsert conflict key for this defense.
    pub fn composition_key(&self) -> CompositionKey {
        self.roster.key()
    }
}
