//! Domain model for characters, defense rosters and counters.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own roster identity (`composition::canonical_key`).
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Roster identity is order-independent; slot order is display-only.

pub mod character;
pub mod composition;
pub mod counter;
pub mod defense;
