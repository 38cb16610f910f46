//! Counter (offense) roster model.
//!
//! # Responsibility
//! - Define an attacking roster recorded as beating one specific defense.
//!
//! # Invariants
//! - Attackers are pairwise distinct (enforced by `Roster`).
//! - Uniqueness is scoped to `(defense_id, attack_key)`: the same attackers
//!   may counter many defenses, but only once per defense.
//! - A counter never outlives its defense; deletion cascades in storage.

use crate::model::composition::{CompositionKey, Roster};
use crate::model::defense::DefenseId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one stored counter.
pub type CounterId = Uuid;

/// Stored offense composition for one defense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub uuid: CounterId,
    pub defense_id: DefenseId,
    pub attackers: Roster,
    pub wins: u32,
    pub notes: String,
}

impl Counter {
    /// Creates a counter for `defense_id` with a generated ID and zero wins.
    pub fn new(defense_id: DefenseId, attackers: Roster) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            defense_id,
            attackers,
            wins: 0,
            notes: String::new(),
        }
    }

    /// Attack-set key; unique together with `defense_id`.
    pub fn attack_key(&self) -> CompositionKey {
        self.attackers.key()
    }
}
