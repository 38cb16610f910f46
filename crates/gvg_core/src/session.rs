//! Session-scoped application state.
//!
//! # Responsibility
//! - Hold the single "active defense" used as context for counter entry and
//!   browsing.
//!
//! # Invariants
//! - State is owned by one session and passed explicitly; nothing here is
//!   process-global.
//! - `set_active_defense` is the only mutation path.
//! - An active defense that vanished from the store is treated as "no
//!   selection", never as an error.

use crate::model::defense::DefenseId;
use crate::query::view::DefenseView;
use log::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    active_defense: Option<DefenseId>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_defense(&self) -> Option<DefenseId> {
        self.active_defense
    }

    pub fn set_active_defense(&mut self, defense_id: Option<DefenseId>) {
        if self.active_defense != defense_id {
            info!(
                "event=active_defense_set module=session status=ok active={}",
                defense_id.map_or_else(|| "none".to_string(), |id| id.to_string())
            );
        }
        self.active_defense = defense_id;
    }

    /// Clears the active defense when it is `defense_id`.
    pub fn clear_if_active(&mut self, defense_id: DefenseId) {
        if self.active_defense == Some(defense_id) {
            self.set_active_defense(None);
        }
    }

    /// Drops the active defense when it is absent from a fresh listing.
    ///
    /// Returns `true` when the selection was cleared.
    pub fn reconcile(&mut self, defenses: &[DefenseView]) -> bool {
        let Some(active) = self.active_defense else {
            return false;
        };
        if defenses.iter().any(|defense| defense.id == active) {
            return false;
        }
        self.set_active_defense(None);
        true
    }
}
