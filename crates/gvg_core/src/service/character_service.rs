//! Character registry use-case service.
//!
//! # Responsibility
//! - Register characters from uploaded portrait file names.
//! - Serve picker lists and suggestions with resolved image URLs.
//!
//! # Invariants
//! - Blank derived names are skipped, never stored.
//! - Re-importing a known name keeps the character's identity.

use crate::images::ImageResolver;
use crate::model::character::{import_from_file_name, Character, CharacterId};
use crate::query::suggest::{suggest_characters, DEFAULT_SUGGESTION_LIMIT};
use crate::query::view::{character_view, CharacterView};
use crate::repo::character_repo::CharacterRepository;
use crate::service::ServiceResult;
use log::{info, warn};

/// Character registry facade over repository implementations.
pub struct CharacterService<R: CharacterRepository> {
    repo: R,
    images: ImageResolver,
}

impl<R: CharacterRepository> CharacterService<R> {
    pub fn new(repo: R, images: ImageResolver) -> Self {
        Self { repo, images }
    }

    /// Registers the character named after `file_name`.
    ///
    /// Returns `Ok(None)` when the file name yields a blank character name.
    pub fn import_file(&self, file_name: &str) -> ServiceResult<Option<Character>> {
        let Some(imported) = import_from_file_name(file_name) else {
            warn!("event=character_import module=service status=skipped reason=blank_name");
            return Ok(None);
        };

        let stored = self.repo.upsert_character(&Character::new(
            imported.name,
            Some(imported.image_path),
        ))?;
        info!(
            "event=character_import module=service status=ok id={}",
            stored.uuid
        );
        Ok(Some(stored))
    }

    /// Imports files in order, stopping at the first store failure.
    pub fn import_files<I, S>(&self, file_names: I) -> ServiceResult<Vec<Character>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut imported = Vec::new();
        for file_name in file_names {
            if let Some(character) = self.import_file(file_name.as_ref())? {
                imported.push(character);
            }
        }
        Ok(imported)
    }

    /// All characters ordered by name.
    pub fn list_characters(&self) -> ServiceResult<Vec<CharacterView>> {
        Ok(self
            .repo
            .list_characters()?
            .iter()
            .map(|character| character_view(character, &self.images))
            .collect())
    }

    pub fn get_character(&self, id: CharacterId) -> ServiceResult<Option<CharacterView>> {
        Ok(self
            .repo
            .get_character(id)?
            .map(|character| character_view(&character, &self.images)))
    }

    /// Picker suggestions for typed `text`.
    pub fn suggest(&self, text: &str) -> ServiceResult<Vec<CharacterView>> {
        let characters = self.list_characters()?;
        Ok(suggest_characters(&characters, text, DEFAULT_SUGGESTION_LIMIT)
            .into_iter()
            .cloned()
            .collect())
    }
}
