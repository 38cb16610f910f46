//! Defense repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert defenses on their composition key.
//! - Delete defenses together with every counter recorded against them.
//! - Expose win-count primitives for `tally`.
//!
//! # Invariants
//! - At most one stored defense per composition key.
//! - Stored `composition_key` always equals the key derived from the stored
//!   members; rows where they disagree are reported as `InvalidData`.
//! - Listing order is insertion order (`rowid`), which upserts preserve.

use crate::db::ensure_schema_ready;
use crate::model::composition::CompositionKey;
use crate::model::defense::{Defense, DefenseId};
use crate::repo::{
    compare_and_set_wins, decode_wins, overwrite_wins, parse_roster, parse_uuid, read_wins,
    RepoError, RepoResult, WinTable,
};
use crate::tally::WinCounterStore;
use log::info;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const DEFENSE_SELECT_SQL: &str = "SELECT
    uuid,
    composition_key,
    member1_uuid,
    member2_uuid,
    member3_uuid,
    member1_note,
    member2_note,
    member3_note,
    wins,
    notes
FROM defenses";

/// Repository interface for defense rosters.
pub trait DefenseRepository: WinCounterStore {
    /// Inserts `defense`, or overwrites every non-key field of the defense
    /// already stored under the same composition key. Returns the surviving id.
    fn upsert_defense(&self, defense: &Defense) -> RepoResult<DefenseId>;
    fn get_defense(&self, id: DefenseId) -> RepoResult<Option<Defense>>;
    fn find_by_key(&self, key: &CompositionKey) -> RepoResult<Option<Defense>>;
    fn list_defenses(&self) -> RepoResult<Vec<Defense>>;
    /// Deletes one defense; its counters are removed with it.
    fn delete_defense(&self, id: DefenseId) -> RepoResult<()>;
}

/// SQLite-backed defense repository.
pub struct SqliteDefenseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDefenseRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["characters", "defenses", "counters"])?;
        Ok(Self { conn })
    }

    fn query_one(&self, filter_sql: &str, value: String) -> RepoResult<Option<Defense>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEFENSE_SELECT_SQL} WHERE {filter_sql} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_defense_row(row)?));
        }
        Ok(None)
    }
}

impl DefenseRepository for SqliteDefenseRepository<'_> {
    fn upsert_defense(&self, defense: &Defense) -> RepoResult<DefenseId> {
        let key = defense.composition_key();
        let [m1, m2, m3] = defense.roster.members().map(|id| id.to_string());
        let [n1, n2, n3] = &defense.member_notes;

        let stored_id: String = self.conn.query_row(
            "INSERT INTO defenses (
                uuid,
                composition_key,
                member1_uuid,
                member2_uuid,
                member3_uuid,
                member1_note,
                member2_note,
                member3_note,
                wins,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(composition_key) DO UPDATE SET
                member1_uuid = excluded.member1_uuid,
                member2_uuid = excluded.member2_uuid,
                member3_uuid = excluded.member3_uuid,
                member1_note = excluded.member1_note,
                member2_note = excluded.member2_note,
                member3_note = excluded.member3_note,
                wins = excluded.wins,
                notes = excluded.notes,
                updated_at = (strftime('%s', 'now') * 1000)
            RETURNING uuid;",
            params![
                defense.uuid.to_string(),
                key.as_str(),
                m1,
                m2,
                m3,
                n1.as_str(),
                n2.as_str(),
                n3.as_str(),
                i64::from(defense.wins),
                defense.notes.as_str(),
            ],
            |row| row.get(0),
        )?;

        let id = parse_uuid(&stored_id, "defenses.uuid")?;
        info!(
            "event=defense_save module=repo status=ok id={id} replaced={}",
            id != defense.uuid
        );
        Ok(id)
    }

    fn get_defense(&self, id: DefenseId) -> RepoResult<Option<Defense>> {
        self.query_one("uuid", id.to_string())
    }

    fn find_by_key(&self, key: &CompositionKey) -> RepoResult<Option<Defense>> {
        self.query_one("composition_key", key.as_str().to_string())
    }

    fn list_defenses(&self) -> RepoResult<Vec<Defense>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEFENSE_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut defenses = Vec::new();
        while let Some(row) = rows.next()? {
            defenses.push(parse_defense_row(row)?);
        }
        Ok(defenses)
    }

    fn delete_defense(&self, id: DefenseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM defenses WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: WinTable::Defenses.kind(),
                id,
            });
        }

        info!("event=defense_delete module=repo status=ok id={id}");
        Ok(())
    }
}

impl WinCounterStore for SqliteDefenseRepository<'_> {
    fn record_kind(&self) -> &'static str {
        WinTable::Defenses.kind()
    }

    fn read_wins(&self, id: Uuid) -> RepoResult<Option<u32>> {
        read_wins(self.conn, WinTable::Defenses, id)
    }

    fn compare_and_set_wins(&self, id: Uuid, expected: u32, next: u32) -> RepoResult<bool> {
        compare_and_set_wins(self.conn, WinTable::Defenses, id, expected, next)
    }

    fn set_wins(&self, id: Uuid, wins: u32) -> RepoResult<()> {
        overwrite_wins(self.conn, WinTable::Defenses, id, wins)
    }
}

fn parse_defense_row(row: &Row<'_>) -> RepoResult<Defense> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "defenses.uuid")?;
    let roster = parse_roster(row, ["member1_uuid", "member2_uuid", "member3_uuid"])?;

    let stored_key: String = row.get("composition_key")?;
    if roster.key().as_str() != stored_key {
        return Err(RepoError::InvalidData(format!(
            "defense {uuid} composition_key `{stored_key}` does not match its members"
        )));
    }

    Ok(Defense {
        uuid,
        roster,
        member_notes: [
            row.get::<_, Option<String>>("member1_note")?.unwrap_or_default(),
            row.get::<_, Option<String>>("member2_note")?.unwrap_or_default(),
            row.get::<_, Option<String>>("member3_note")?.unwrap_or_default(),
        ],
        wins: decode_wins(row.get("wins")?, "defenses")?,
        notes: row.get::<_, Option<String>>("notes")?.unwrap_or_default(),
    })
}
