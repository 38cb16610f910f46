//! Roster composition identity.
//!
//! # Responsibility
//! - Derive an order-independent canonical key from a set of character ids.
//! - Validate roster input (slot presence, pairwise distinct members) before
//!   any store call happens.
//!
//! # Invariants
//! - `canonical_key` is pure: the same id set always yields the same key,
//!   whatever order the ids are given in.
//! - Stored identities are always 3-member keys; 2-member keys exist only as
//!   search input and are never persisted.
//! - Set-containment search never goes through the key string; see
//!   `query::filter::matches_members`.

use crate::model::character::CharacterId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Separator between sorted ids. Hyphenated UUID text never contains it.
pub const KEY_SEPARATOR: char = '|';

/// Number of characters in a stored defense or counter roster.
pub const ROSTER_SIZE: usize = 3;

const MIN_KEY_MEMBERS: usize = 2;

/// Validation failure for roster input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// A roster slot (1-based) has no character selected.
    MissingMember { slot: usize },
    /// The same character was selected more than once.
    DuplicateMember(CharacterId),
    /// Key derivation was asked for an unsupported member count.
    InvalidMemberCount { actual: usize },
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMember { slot } => write!(f, "roster slot {slot} has no character"),
            Self::DuplicateMember(id) => write!(f, "character selected more than once: {id}"),
            Self::InvalidMemberCount { actual } => write!(
                f,
                "composition key needs {MIN_KEY_MEMBERS}..={ROSTER_SIZE} members, got {actual}"
            ),
        }
    }
}

impl Error for CompositionError {}

/// Canonical, order-independent identity of a character set.
///
/// Only built by [`canonical_key`] and [`Roster::key`]; never parsed from
/// external input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CompositionKey(String);

impl CompositionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CompositionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the canonical key for 2 or 3 distinct character ids.
///
/// Ids are ordered by their hyphenated text form and joined with
/// [`KEY_SEPARATOR`].
///
/// # Errors
/// - `InvalidMemberCount` when fewer than 2 or more than 3 ids are given.
/// - `DuplicateMember` when an id repeats.
pub fn canonical_key(ids: &[CharacterId]) -> Result<CompositionKey, CompositionError> {
    if !(MIN_KEY_MEMBERS..=ROSTER_SIZE).contains(&ids.len()) {
        return Err(CompositionError::InvalidMemberCount { actual: ids.len() });
    }
    ensure_distinct(ids)?;

    let mut parts = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
    parts.sort();
    Ok(CompositionKey(parts.join(&KEY_SEPARATOR.to_string())))
}

/// Ordered triple of distinct character references.
///
/// Slot order is kept for display and per-slot notes; identity ignores it.
/// Serialized as a plain slot array; deserialization goes through
/// [`Roster::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "[CharacterId; ROSTER_SIZE]",
    into = "[CharacterId; ROSTER_SIZE]"
)]
pub struct Roster {
    members: [CharacterId; ROSTER_SIZE],
}

impl Roster {
    /// Builds a roster from three filled slots.
    ///
    /// # Errors
    /// - `DuplicateMember` when any two slots hold the same character.
    pub fn new(members: [CharacterId; ROSTER_SIZE]) -> Result<Self, CompositionError> {
        ensure_distinct(&members)?;
        Ok(Self { members })
    }

    /// Builds a roster from editor slots where any slot may still be empty.
    ///
    /// # Errors
    /// - `MissingMember` for the first empty slot.
    /// - `DuplicateMember` when two slots hold the same character.
    pub fn from_slots(slots: [Option<CharacterId>; ROSTER_SIZE]) -> Result<Self, CompositionError> {
        let mut members = [CharacterId::nil(); ROSTER_SIZE];
        for (index, slot) in slots.iter().enumerate() {
            members[index] = slot.ok_or(CompositionError::MissingMember { slot: index + 1 })?;
        }
        Self::new(members)
    }

    pub fn members(&self) -> &[CharacterId; ROSTER_SIZE] {
        &self.members
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.members.contains(&id)
    }

    /// Canonical key for this roster's member set.
    pub fn key(&self) -> CompositionKey {
        let mut parts = self.members.map(|id| id.to_string());
        parts.sort();
        CompositionKey(parts.join(&KEY_SEPARATOR.to_string()))
    }
}

impl TryFrom<[CharacterId; ROSTER_SIZE]> for Roster {
    type Error = CompositionError;

    fn try_from(members: [CharacterId; ROSTER_SIZE]) -> Result<Self, Self::Error> {
        Self::new(members)
    }
}

impl From<Roster> for [CharacterId; ROSTER_SIZE] {
    fn from(roster: Roster) -> Self {
        roster.members
    }
}

fn ensure_distinct(ids: &[CharacterId]) -> Result<(), CompositionError> {
    for (index, id) in ids.iter().enumerate() {
        if ids[..index].contains(id) {
            return Err(CompositionError::DuplicateMember(*id));
        }
    }
    Ok(())
}
