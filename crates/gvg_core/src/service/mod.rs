//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into editor/browser level operations.
//! - Validate input before any store call.
//! - Re-read state after every successful write instead of patching views
//!   optimistically.

use crate::model::composition::CompositionError;
use crate::query::view::UnknownCharacter;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod character_service;
pub mod counter_service;
pub mod defense_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Roster input rejected before reaching the store.
    Validation(CompositionError),
    /// Counter entry needs an active defense.
    NoActiveDefense,
    /// Stored roster points at a character missing from the registry.
    UnknownCharacter(UnknownCharacter),
    /// Persistence-layer failure, surfaced unchanged.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoActiveDefense => write!(f, "no active defense selected"),
            Self::UnknownCharacter(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent roster state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UnknownCharacter(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NoActiveDefense | Self::InconsistentState(_) => None,
        }
    }
}

impl From<CompositionError> for ServiceError {
    fn from(value: CompositionError) -> Self {
        Self::Validation(value)
    }
}

impl From<UnknownCharacter> for ServiceError {
    fn from(value: UnknownCharacter) -> Self {
        Self::UnknownCharacter(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

fn missing_after_write(kind: &str, id: Uuid) -> ServiceError {
    ServiceError::InconsistentState(format!("{kind} {id} not found in read-back"))
}
