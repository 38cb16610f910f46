//! Character registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert characters by name (re-import replaces the image, keeps identity).
//! - List and look up characters for pickers and view assembly.
//!
//! # Invariants
//! - Names are unique case-insensitively (`COLLATE NOCASE`).
//! - Characters are never deleted by this core.

use crate::db::ensure_schema_ready;
use crate::model::character::{Character, CharacterId};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CHARACTER_SELECT_SQL: &str = "SELECT uuid, name, image_path FROM characters";

/// Repository interface for the character registry.
pub trait CharacterRepository {
    /// Inserts `character`, or replaces the image of the existing character
    /// with the same name. Returns the stored record, whose `uuid` is the
    /// surviving identity.
    fn upsert_character(&self, character: &Character) -> RepoResult<Character>;
    fn get_character(&self, id: CharacterId) -> RepoResult<Option<Character>>;
    /// Case-insensitive exact name lookup.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Character>>;
    /// All characters ordered by name.
    fn list_characters(&self) -> RepoResult<Vec<Character>>;
}

/// SQLite-backed character registry.
pub struct SqliteCharacterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCharacterRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["characters"])?;
        Ok(Self { conn })
    }
}

impl CharacterRepository for SqliteCharacterRepository<'_> {
    fn upsert_character(&self, character: &Character) -> RepoResult<Character> {
        character.validate()?;

        let stored = self.conn.query_row(
            "INSERT INTO characters (uuid, name, image_path)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                image_path = excluded.image_path,
                updated_at = (strftime('%s', 'now') * 1000)
             RETURNING uuid, name, image_path;",
            params![
                character.uuid.to_string(),
                character.name.as_str(),
                character.image_path.as_deref(),
            ],
            RawCharacter::from_row,
        )?;

        stored.into_character()
    }

    fn get_character(&self, id: CharacterId) -> RepoResult<Option<Character>> {
        self.conn
            .query_row(
                &format!("{CHARACTER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                RawCharacter::from_row,
            )
            .optional()?
            .map(RawCharacter::into_character)
            .transpose()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Character>> {
        self.conn
            .query_row(
                &format!("{CHARACTER_SELECT_SQL} WHERE name = ?1;"),
                [name.trim()],
                RawCharacter::from_row,
            )
            .optional()?
            .map(RawCharacter::into_character)
            .transpose()
    }

    fn list_characters(&self) -> RepoResult<Vec<Character>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHARACTER_SELECT_SQL} ORDER BY name ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut characters = Vec::new();
        while let Some(row) = rows.next()? {
            characters.push(RawCharacter::from_row(row)?.into_character()?);
        }
        Ok(characters)
    }
}

struct RawCharacter {
    uuid: String,
    name: String,
    image_path: Option<String>,
}

impl RawCharacter {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get("uuid")?,
            name: row.get("name")?,
            image_path: row.get("image_path")?,
        })
    }

    fn into_character(self) -> RepoResult<Character> {
        let character = Character {
            uuid: parse_uuid(&self.uuid, "characters.uuid")?,
            name: self.name,
            image_path: self.image_path.filter(|path| !path.trim().is_empty()),
        };
        character.validate()?;
        Ok(character)
    }
}
