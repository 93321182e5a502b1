use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use types::{GroupId, PreferenceLevel, SlotId};

/// Input rejected before any work is done. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("weekStartDate `{0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("weekStartDate {0} is not a Monday")]
    NotMonday(NaiveDate),
    #[error("preference set is empty")]
    EmptyPreferences,
    #[error("duplicate preference for slot {0}")]
    DuplicateSlot(SlotId),
    #[error("too many `{level}` preferences (limit {limit})")]
    CapExceeded { level: PreferenceLevel, limit: u32 },
    #[error("submission deadline {deadline} has passed")]
    DeadlinePassed { deadline: NaiveDateTime },
    #[error("slot {0} is not part of the group's schedule")]
    UnknownSlot(SlotId),
    #[error("invalid slot catalog: {0}")]
    Catalog(String),
}

/// A collaborator (catalog, preference store, history, assignment store)
/// failed. Propagated as-is; the engine has no retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collaborator} unavailable: {reason}")]
pub struct DataUnavailable {
    pub collaborator: &'static str,
    pub reason: String,
}

impl DataUnavailable {
    pub fn new(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("week {week} of group {group} is already scheduled")]
    AlreadyScheduled { group: GroupId, week: NaiveDate },
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
}

/// Coarse classification callers map onto their own transport semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    DataUnavailable,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::AlreadyScheduled { .. } => ErrorKind::Conflict,
            EngineError::DataUnavailable(_) => ErrorKind::DataUnavailable,
        }
    }
}

impl IntakeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntakeError::Validation(_) => ErrorKind::Validation,
            IntakeError::DataUnavailable(_) => ErrorKind::DataUnavailable,
        }
    }
}
