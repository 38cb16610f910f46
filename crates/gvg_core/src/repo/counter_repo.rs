//! Counter (offense) repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert counters on `(defense_uuid, attack_key)`.
//! - List counters scoped to one defense, best first.
//!
//! # Invariants
//! - Every lookup is scoped by defense; "no defense" lists nothing.
//! - Counters disappear with their defense (`ON DELETE CASCADE`).

use crate::db::ensure_schema_ready;
use crate::model::counter::{Counter, CounterId};
use crate::model::defense::DefenseId;
use crate::repo::{
    compare_and_set_wins, decode_wins, overwrite_wins, parse_roster, parse_uuid, read_wins,
    RepoError, RepoResult, WinTable,
};
use crate::tally::WinCounterStore;
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const COUNTER_SELECT_SQL: &str = "SELECT
    uuid,
    defense_uuid,
    attack_key,
    attacker1_uuid,
    attacker2_uuid,
    attacker3_uuid,
    wins,
    notes
FROM counters";

/// Repository interface for counters recorded against defenses.
pub trait CounterRepository: WinCounterStore {
    /// Inserts `counter`, or overwrites the counter already stored for the
    /// same defense and attacker set. Returns the surviving id.
    ///
    /// Fails with `NotFound` when the referenced defense does not exist.
    fn upsert_counter(&self, counter: &Counter) -> RepoResult<CounterId>;
    fn get_counter(&self, id: CounterId) -> RepoResult<Option<Counter>>;
    /// Counters for `defense_id`, ordered by wins descending then insertion.
    /// Returns an empty list when `defense_id` is `None`.
    fn list_counters(&self, defense_id: Option<DefenseId>) -> RepoResult<Vec<Counter>>;
    fn count_for_defense(&self, defense_id: DefenseId) -> RepoResult<u64>;
    fn delete_counter(&self, id: CounterId) -> RepoResult<()>;
}

/// SQLite-backed counter repository.
pub struct SqliteCounterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCounterRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["characters", "defenses", "counters"])?;
        Ok(Self { conn })
    }
}

impl CounterRepository for SqliteCounterRepository<'_> {
    fn upsert_counter(&self, counter: &Counter) -> RepoResult<CounterId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !defense_exists_in_tx(&tx, counter.defense_id)? {
            return Err(RepoError::NotFound {
                kind: WinTable::Defenses.kind(),
                id: counter.defense_id,
            });
        }

        let key = counter.attack_key();
        let [a1, a2, a3] = counter.attackers.members().map(|id| id.to_string());

        let stored_id: String = tx.query_row(
            "INSERT INTO counters (
                uuid,
                defense_uuid,
                attack_key,
                attacker1_uuid,
                attacker2_uuid,
                attacker3_uuid,
                wins,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(defense_uuid, attack_key) DO UPDATE SET
                attacker1_uuid = excluded.attacker1_uuid,
                attacker2_uuid = excluded.attacker2_uuid,
                attacker3_uuid = excluded.attacker3_uuid,
                wins = excluded.wins,
                notes = excluded.notes,
                updated_at = (strftime('%s', 'now') * 1000)
            RETURNING uuid;",
            params![
                counter.uuid.to_string(),
                counter.defense_id.to_string(),
                key.as_str(),
                a1,
                a2,
                a3,
                i64::from(counter.wins),
                counter.notes.as_str(),
            ],
            |row| row.get(0),
        )?;
        tx.commit()?;

        let id = parse_uuid(&stored_id, "counters.uuid")?;
        info!(
            "event=counter_save module=repo status=ok id={id} defense_id={} replaced={}",
            counter.defense_id,
            id != counter.uuid
        );
        Ok(id)
    }

    fn get_counter(&self, id: CounterId) -> RepoResult<Option<Counter>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COUNTER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_counter_row(row)?));
        }
        Ok(None)
    }

    fn list_counters(&self, defense_id: Option<DefenseId>) -> RepoResult<Vec<Counter>> {
        let Some(defense_id) = defense_id else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(&format!(
            "{COUNTER_SELECT_SQL}
             WHERE defense_uuid = ?1
             ORDER BY COALESCE(wins, 0) DESC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([defense_id.to_string()])?;
        let mut counters = Vec::new();
        while let Some(row) = rows.next()? {
            counters.push(parse_counter_row(row)?);
        }
        Ok(counters)
    }

    fn count_for_defense(&self, defense_id: DefenseId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM counters WHERE defense_uuid = ?1;",
            [defense_id.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative counter count `{count}`")))
    }

    fn delete_counter(&self, id: CounterId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM counters WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: WinTable::Counters.kind(),
                id,
            });
        }

        info!("event=counter_delete module=repo status=ok id={id}");
        Ok(())
    }
}

impl WinCounterStore for SqliteCounterRepository<'_> {
    fn record_kind(&self) -> &'static str {
        WinTable::Counters.kind()
    }

    fn read_wins(&self, id: Uuid) -> RepoResult<Option<u32>> {
        read_wins(self.conn, WinTable::Counters, id)
    }

    fn compare_and_set_wins(&self, id: Uuid, expected: u32, next: u32) -> RepoResult<bool> {
        compare_and_set_wins(self.conn, WinTable::Counters, id, expected, next)
    }

    fn set_wins(&self, id: Uuid, wins: u32) -> RepoResult<()> {
        overwrite_wins(self.conn, WinTable::Counters, id, wins)
    }
}

fn defense_exists_in_tx(tx: &Transaction<'_>, defense_id: DefenseId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM defenses WHERE uuid = ?1);",
        [defense_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_counter_row(row: &Row<'_>) -> RepoResult<Counter> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "counters.uuid")?;
    let defense_text: String = row.get("defense_uuid")?;
    let attackers = parse_roster(row, ["attacker1_uuid", "attacker2_uuid", "attacker3_uuid"])?;

    let stored_key: String = row.get("attack_key")?;
    if attackers.key().as_str() != stored_key {
        return Err(RepoError::InvalidData(format!(
            "counter {uuid} attack_key `{stored_key}` does not match its attackers"
        )));
    }

    Ok(Counter {
        uuid,
        defense_id: parse_uuid(&defense_text, "counters.defense_uuid")?,
        attackers,
        wins: decode_wins(row.get("wins")?, "counters")?,
        notes: row.get::<_, Option<String>>("notes")?.unwrap_or_default(),
    })
}
