//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contracts the roster core relies on (upsert by
//!   conflict key, cascade delete, defense-scoped counter lookup).
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Write paths validate rosters before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `WriteConflict`) in
//!   addition to DB transport errors.
//! - Read paths reject corrupt persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::character::CharacterValidationError;
use crate::model::composition::{CompositionError, Roster, ROSTER_SIZE};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod character_repo;
pub mod counter_repo;
pub mod defense_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by character, defense and counter storage.
#[derive(Debug)]
pub enum RepoError {
    /// Roster failed composition validation.
    Validation(CompositionError),
    /// Character record failed validation.
    InvalidCharacter(CharacterValidationError),
    Db(DbError),
    /// Target record does not exist. `kind` names the record family.
    NotFound { kind: &'static str, id: Uuid },
    /// Compare-and-swap win update kept losing to concurrent writers.
    WriteConflict {
        kind: &'static str,
        id: Uuid,
        attempts: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidCharacter(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::WriteConflict { kind, id, attempts } => write!(
                f,
                "{kind} {id} win count changed concurrently; gave up after {attempts} attempts"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidCharacter(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::WriteConflict { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<CompositionError> for RepoError {
    fn from(value: CompositionError) -> Self {
        Self::Validation(value)
    }
}

impl From<CharacterValidationError> for RepoError {
    fn from(value: CharacterValidationError) -> Self {
        Self::InvalidCharacter(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record family that carries a `wins` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WinTable {
    Defenses,
    Counters,
}

impl WinTable {
    fn table(self) -> &'static str {
        match self {
            Self::Defenses => "defenses",
            Self::Counters => "counters",
        }
    }

    pub(crate) fn kind(self) -> &'static str {
        match self {
            Self::Defenses => "defense",
            Self::Counters => "counter",
        }
    }
}

pub(crate) fn read_wins(conn: &Connection, table: WinTable, id: Uuid) -> RepoResult<Option<u32>> {
    let stored: Option<Option<i64>> = conn
        .query_row(
            &format!("SELECT wins FROM {} WHERE uuid = ?1;", table.table()),
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    stored
        .map(|wins| decode_wins(wins, table.table()))
        .transpose()
}

pub(crate) fn compare_and_set_wins(
    conn: &Connection,
    table: WinTable,
    id: Uuid,
    expected: u32,
    next: u32,
) -> RepoResult<bool> {
    let changed = conn.execute(
        &format!(
            "UPDATE {}
             SET
                wins = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND COALESCE(wins, 0) = ?2;",
            table.table()
        ),
        params![id.to_string(), i64::from(expected), i64::from(next)],
    )?;
    Ok(changed == 1)
}

pub(crate) fn overwrite_wins(
    conn: &Connection,
    table: WinTable,
    id: Uuid,
    wins: u32,
) -> RepoResult<()> {
    let changed = conn.execute(
        &format!(
            "UPDATE {}
             SET
                wins = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            table.table()
        ),
        params![id.to_string(), i64::from(wins)],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound {
            kind: table.kind(),
            id,
        });
    }
    Ok(())
}

/// Missing tallies count as zero; anything outside `u32` is corrupt.
pub(crate) fn decode_wins(value: Option<i64>, table: &str) -> RepoResult<u32> {
    let raw = value.unwrap_or(0);
    u32::try_from(raw)
        .map_err(|_| RepoError::InvalidData(format!("invalid wins value `{raw}` in {table}.wins")))
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Reads three slot columns into a validated roster.
pub(crate) fn parse_roster(row: &Row<'_>, columns: [&str; ROSTER_SIZE]) -> RepoResult<Roster> {
    let mut members = [Uuid::nil(); ROSTER_SIZE];
    for (slot, column) in columns.iter().enumerate() {
        let text: String = row.get(*column)?;
        members[slot] = parse_uuid(&text, column)?;
    }
    Roster::new(members).map_err(|err| RepoError::InvalidData(format!("stored roster: {err}")))
}
