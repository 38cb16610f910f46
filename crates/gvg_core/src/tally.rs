//! Win tally mutations for defenses and counters.
//!
//! # Responsibility
//! - Provide absolute overwrite and `+1` increment of a record's win count.
//!
//! # Invariants
//! - Increment always starts from the persisted value, never from a caller's
//!   in-memory copy.
//! - Increment writes only if the persisted value is still the one it read
//!   (compare-and-swap), retrying a bounded number of times.
//! - Neither mutation touches any other field.

use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use uuid::Uuid;

/// Upper bound on compare-and-swap rounds before reporting a conflict.
pub const MAX_INCREMENT_ATTEMPTS: u32 = 8;

/// Storage primitives needed by win tally mutations.
pub trait WinCounterStore {
    /// Record family name used in errors and log events.
    fn record_kind(&self) -> &'static str;

    /// Returns the persisted win count, or `None` when the record is gone.
    fn read_wins(&self, id: Uuid) -> RepoResult<Option<u32>>;

    /// Writes `next` only if the stored value still equals `expected`.
    ///
    /// Returns `false` when the precondition no longer holds (or the record
    /// disappeared).
    fn compare_and_set_wins(&self, id: Uuid, expected: u32, next: u32) -> RepoResult<bool>;

    /// Unconditionally overwrites the win count.
    fn set_wins(&self, id: Uuid, wins: u32) -> RepoResult<()>;
}

/// Increments the persisted win count of `id` by one and returns the new value.
///
/// # Errors
/// - `NotFound` when the record does not exist (or is deleted mid-loop).
/// - `WriteConflict` after [`MAX_INCREMENT_ATTEMPTS`] lost races.
/// - `InvalidData` when the stored count is already `u32::MAX`.
pub fn increment_wins<S: WinCounterStore + ?Sized>(store: &S, id: Uuid) -> RepoResult<u32> {
    let kind = store.record_kind();

    for attempt in 1..=MAX_INCREMENT_ATTEMPTS {
        let current = store
            .read_wins(id)?
            .ok_or(RepoError::NotFound { kind, id })?;
        let next = current.checked_add(1).ok_or_else(|| {
            RepoError::InvalidData(format!("{kind} {id} win count cannot exceed {}", u32::MAX))
        })?;

        if store.compare_and_set_wins(id, current, next)? {
            info!("event=win_increment module=tally status=ok kind={kind} id={id} wins={next} attempts={attempt}");
            return Ok(next);
        }

        warn!("event=win_increment module=tally status=retry kind={kind} id={id} attempt={attempt}");
    }

    warn!("event=win_increment module=tally status=error kind={kind} id={id} error_code=write_conflict");
    Err(RepoError::WriteConflict {
        kind,
        id,
        attempts: MAX_INCREMENT_ATTEMPTS,
    })
}

/// Overwrites the win count of `id` with a caller-supplied value.
pub fn set_wins<S: WinCounterStore + ?Sized>(store: &S, id: Uuid, wins: u32) -> RepoResult<()> {
    store.set_wins(id, wins)?;
    info!(
        "event=win_set module=tally status=ok kind={} id={id} wins={wins}",
        store.record_kind()
    );
    Ok(())
}
