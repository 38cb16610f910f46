//! Character registry model.
//!
//! # Responsibility
//! - Define the named entity every roster slot points at.
//! - Derive character name and image path from an imported file name.
//!
//! # Invariants
//! - `name` is non-blank and unique case-insensitively across the registry.
//! - `uuid` is stable: re-importing the same name keeps the same identity.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for one character.
pub type CharacterId = Uuid;

/// Validation failure for character records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterValidationError {
    BlankName,
}

impl Display for CharacterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "character name must not be blank"),
        }
    }
}

impl Error for CharacterValidationError {}

/// Registry record for one playable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub uuid: CharacterId,
    /// Display name, stored with original casing.
    pub name: String,
    /// Blob-store path of the portrait, resolved to a URL at view time.
    pub image_path: Option<String>,
}

impl Character {
    /// Creates a character with a generated stable ID.
    pub fn new(name: impl Into<String>, image_path: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            image_path,
        }
    }

    pub fn validate(&self) -> Result<(), CharacterValidationError> {
        if self.name.trim().is_empty() {
            return Err(CharacterValidationError::BlankName);
        }
        Ok(())
    }
}

/// Character name and blob path derived from an uploaded image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedImage {
    pub name: String,
    pub image_path: String,
}

/// Derives the registry entry for an uploaded file.
///
/// The character name is the text before the last `.`, trimmed, with inner
/// whitespace runs collapsed to one space. The image path is that name
/// followed by the original extension (if any).
///
/// Returns `None` when the derived name is blank.
pub fn import_from_file_name(file_name: &str) -> Option<ImportedImage> {
    let (stem, extension) = match file_name.rfind('.') {
        Some(dot) => (&file_name[..dot], &file_name[dot..]),
        None => (file_name, ""),
    };

    let name = normalize_name(stem)?;
    let image_path = format!("{name}{extension}");
    Some(ImportedImage { name, image_path })
}

/// Normalizes user-provided character names.
pub fn normalize_name(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}
