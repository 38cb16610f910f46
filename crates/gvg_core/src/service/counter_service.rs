//! Counter (offense) use-case service.
//!
//! # Responsibility
//! - Record counters against the session's active defense.
//! - List counters for one defense with character data joined in.
//! - Apply win tally mutations and deletions.
//!
//! # Invariants
//! - Counter entry requires an active defense and a valid attacker roster;
//!   both are checked before any store call.
//! - Listing for "no defense" is empty, not an error.

use crate::images::ImageResolver;
use crate::model::character::CharacterId;
use crate::model::composition::{Roster, ROSTER_SIZE};
use crate::model::counter::{Counter, CounterId};
use crate::model::defense::DefenseId;
use crate::query::view::{CounterView, ViewAssembler};
use crate::repo::character_repo::CharacterRepository;
use crate::repo::counter_repo::CounterRepository;
use crate::service::{missing_after_write, ServiceError, ServiceResult};
use crate::session::SessionState;
use crate::tally;
use log::info;

/// Editor input for recording a counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterDraft {
    pub slots: [Option<CharacterId>; ROSTER_SIZE],
    pub wins: u32,
    pub notes: String,
}

/// Counter service facade over repository implementations.
pub struct CounterService<K: CounterRepository, C: CharacterRepository> {
    counters: K,
    characters: C,
    images: ImageResolver,
}

impl<K: CounterRepository, C: CharacterRepository> CounterService<K, C> {
    pub fn new(counters: K, characters: C, images: ImageResolver) -> Self {
        Self {
            counters,
            characters,
            images,
        }
    }

    /// Counters for `defense_id`, best first. `None` yields an empty list.
    pub fn list_counters(&self, defense_id: Option<DefenseId>) -> ServiceResult<Vec<CounterView>> {
        let counters = self.counters.list_counters(defense_id)?;
        if counters.is_empty() {
            return Ok(Vec::new());
        }

        let assembler = self.assembler()?;
        counters
            .iter()
            .map(|counter| assembler.counter(counter).map_err(Into::into))
            .collect()
    }

    /// Counters for the session's active defense.
    pub fn list_for_session(&self, session: &SessionState) -> ServiceResult<Vec<CounterView>> {
        self.list_counters(session.active_defense())
    }

    pub fn get_counter(&self, id: CounterId) -> ServiceResult<Option<CounterView>> {
        let Some(counter) = self.counters.get_counter(id)? else {
            return Ok(None);
        };
        Ok(Some(self.assembler()?.counter(&counter)?))
    }

    /// Records `draft` against the active defense and returns the refreshed
    /// counter list for that defense.
    ///
    /// # Errors
    /// - `NoActiveDefense` when the session has no active defense.
    /// - `Validation` when an attacker slot is empty or repeats.
    /// - `Repo` when the store rejects the write (including a defense that
    ///   was deleted by another session).
    pub fn save_counter(
        &self,
        session: &SessionState,
        draft: &CounterDraft,
    ) -> ServiceResult<Vec<CounterView>> {
        let defense_id = session
            .active_defense()
            .ok_or(ServiceError::NoActiveDefense)?;
        let attackers = Roster::from_slots(draft.slots)?;
        let counter = Counter {
            wins: draft.wins,
            notes: draft.notes.clone(),
            ..Counter::new(defense_id, attackers)
        };

        let id = self.counters.upsert_counter(&counter)?;
        info!("event=counter_save module=service status=ok id={id} defense_id={defense_id}");

        let refreshed = self.list_counters(Some(defense_id))?;
        if !refreshed.iter().any(|view| view.id == id) {
            return Err(missing_after_write("counter", id));
        }
        Ok(refreshed)
    }

    pub fn delete_counter(&self, id: CounterId) -> ServiceResult<()> {
        self.counters.delete_counter(id)?;
        Ok(())
    }

    /// Adds one win from the persisted value; returns the new count.
    pub fn increment_wins(&self, id: CounterId) -> ServiceResult<u32> {
        Ok(tally::increment_wins(&self.counters, id)?)
    }

    pub fn set_wins(&self, id: CounterId, wins: u32) -> ServiceResult<()> {
        Ok(tally::set_wins(&self.counters, id, wins)?)
    }

    fn assembler(&self) -> ServiceResult<ViewAssembler> {
        let characters = self.characters.list_characters()?;
        Ok(ViewAssembler::new(&characters, &self.images))
    }
}
