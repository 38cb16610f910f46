//! Core domain logic for GvG defense/counter tracking.
//! This crate is the single source of truth for roster invariants.

pub mod config;
pub mod db;
pub mod images;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod session;
pub mod tally;

pub use config::{Config, ConfigError};
pub use images::{ImageResolver, ImageResolverError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::character::{import_from_file_name, Character, CharacterId, ImportedImage};
pub use model::composition::{canonical_key, CompositionError, CompositionKey, Roster};
pub use model::counter::{Counter, CounterId};
pub use model::defense::{Defense, DefenseId};
pub use query::filter::{apply_defense_query, DefenseQuery, SortOrder};
pub use query::suggest::suggest_characters;
pub use query::view::{CharacterView, CounterView, DefenseView, ViewAssembler};
pub use repo::character_repo::{CharacterRepository, SqliteCharacterRepository};
pub use repo::counter_repo::{CounterRepository, SqliteCounterRepository};
pub use repo::defense_repo::{DefenseRepository, SqliteDefenseRepository};
pub use repo::{RepoError, RepoResult};
pub use service::character_service::CharacterService;
pub use service::counter_service::{CounterDraft, CounterService};
pub use service::defense_service::{DefenseDraft, DefenseService};
pub use service::{ServiceError, ServiceResult};
pub use session::SessionState;
pub use tally::{increment_wins, set_wins, WinCounterStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
