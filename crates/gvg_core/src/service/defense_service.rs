//! Defense use-case service.
//!
//! # Responsibility
//! - Save defenses from editor input (validate, upsert, read back).
//! - Delete defenses and keep the session's active selection consistent.
//! - Serve filtered/sorted defense views and win tally mutations.
//!
//! # Invariants
//! - Invalid rosters never reach the repository.
//! - Returned views always come from a fresh read after the write.
//! - Saving a roster that already exists, in any slot order, replaces it.

use crate::images::ImageResolver;
use crate::model::character::CharacterId;
use crate::model::composition::{Roster, ROSTER_SIZE};
use crate::model::defense::{Defense, DefenseId};
use crate::query::filter::{apply_defense_query, DefenseQuery};
use crate::query::view::{DefenseView, ViewAssembler};
use crate::repo::character_repo::CharacterRepository;
use crate::repo::defense_repo::DefenseRepository;
use crate::service::{missing_after_write, ServiceResult};
use crate::session::SessionState;
use crate::tally;
use log::{info, warn};

/// Editor input for saving a defense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefenseDraft {
    /// Character per slot; every slot must be filled and distinct.
    pub slots: [Option<CharacterId>; ROSTER_SIZE],
    pub member_notes: [String; ROSTER_SIZE],
    pub wins: u32,
    pub notes: String,
}

impl DefenseDraft {
    /// Loads an existing defense into editor form.
    pub fn from_view(view: &DefenseView) -> Self {
        let [a, b, c] = view.member_ids();
        Self {
            slots: [Some(a), Some(b), Some(c)],
            member_notes: view.member_notes.clone(),
            wins: view.wins,
            notes: view.notes.clone(),
        }
    }
}

/// Defense service facade over repository implementations.
pub struct DefenseService<D: DefenseRepository, C: CharacterRepository> {
    defenses: D,
    characters: C,
    images: ImageResolver,
}

impl<D: DefenseRepository, C: CharacterRepository> DefenseService<D, C> {
    pub fn new(defenses: D, characters: C, images: ImageResolver) -> Self {
        Self {
            defenses,
            characters,
            images,
        }
    }

    /// All defenses in storage order, joined with character data.
    pub fn list_defenses(&self) -> ServiceResult<Vec<DefenseView>> {
        let assembler = self.assembler()?;
        self.defenses
            .list_defenses()?
            .iter()
            .map(|defense| assembler.defense(defense).map_err(Into::into))
            .collect()
    }

    /// Re-reads defenses and drops an active selection that no longer exists.
    pub fn refresh(&self, session: &mut SessionState) -> ServiceResult<Vec<DefenseView>> {
        let views = self.list_defenses()?;
        if session.reconcile(&views) {
            warn!("event=defense_refresh module=service status=ok active_cleared=true");
        }
        Ok(views)
    }

    /// Evaluates text, prefix and member-set filters plus sort order.
    pub fn search(&self, query: &DefenseQuery) -> ServiceResult<Vec<DefenseView>> {
        let views = self.list_defenses()?;
        Ok(apply_defense_query(&views, query))
    }

    pub fn get_defense(&self, id: DefenseId) -> ServiceResult<Option<DefenseView>> {
        let Some(defense) = self.defenses.get_defense(id)? else {
            return Ok(None);
        };
        Ok(Some(self.assembler()?.defense(&defense)?))
    }

    /// Validates and upserts `draft`, returning the stored defense as re-read.
    ///
    /// # Errors
    /// - `Validation` when a slot is empty or a character repeats; nothing
    ///   is written in that case.
    /// - `Repo` when the store rejects the write.
    pub fn save_defense(&self, draft: &DefenseDraft) -> ServiceResult<DefenseView> {
        let roster = Roster::from_slots(draft.slots)?;
        let defense = Defense {
            member_notes: draft.member_notes.clone(),
            wins: draft.wins,
            notes: draft.notes.clone(),
            ..Defense::new(roster)
        };
        let key = defense.composition_key();

        let id = self.defenses.upsert_defense(&defense)?;
        info!("event=defense_save module=service status=ok id={id}");

        let stored = self
            .defenses
            .find_by_key(&key)?
            .ok_or_else(|| missing_after_write("defense", id))?;
        Ok(self.assembler()?.defense(&stored)?)
    }

    /// Deletes a defense (and its counters) and clears it from the session
    /// when it was the active one.
    pub fn delete_defense(&self, id: DefenseId, session: &mut SessionState) -> ServiceResult<()> {
        self.defenses.delete_defense(id)?;
        session.clear_if_active(id);
        info!("event=defense_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Adds one win from the persisted value; returns the new count.
    pub fn increment_wins(&self, id: DefenseId) -> ServiceResult<u32> {
        Ok(tally::increment_wins(&self.defenses, id)?)
    }

    pub fn set_wins(&self, id: DefenseId, wins: u32) -> ServiceResult<()> {
        Ok(tally::set_wins(&self.defenses, id, wins)?)
    }

    fn assembler(&self) -> ServiceResult<ViewAssembler> {
        let characters = self.characters.list_characters()?;
        Ok(ViewAssembler::new(&characters, &self.images))
    }
}
