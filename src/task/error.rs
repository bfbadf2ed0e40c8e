//! Error taxonomy shared by every task repository operation.
//!
//! Store adapters convert their native failures into [`TaskError`] at a
//! single boundary, so callers see the same shape whichever backend runs.

use super::domain::{TaskId, TransitionError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository and store operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A task row.
    Task,
    /// A task run row.
    TaskRun,
    /// A task check run row.
    TaskCheckRun,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::TaskRun => "task run",
            Self::TaskCheckRun => "task check run",
        })
    }
}

/// Coarse classification that transport layers map to response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskErrorKind {
    /// The target record does not exist.
    NotFound,
    /// A filter matched several rows or a uniqueness constraint was violated.
    Conflict,
    /// There is no active run to transition from.
    InvalidTransition,
    /// A start was requested while a run is active.
    AlreadyRunning,
    /// The caller cancelled or the deadline passed before commit.
    Cancelled,
    /// The underlying store failed.
    Storage,
}

/// Errors returned by task repository operations.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The target record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of the missing record.
        entity: EntityKind,
        /// Identifier that was looked up.
        id: i64,
    },

    /// A lookup expected to be unique was not, or a constraint rejected a row.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested status change has no legal run effect.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The operation was cancelled before it could commit.
    #[error("operation cancelled before commit")]
    Cancelled,

    /// The transactional store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TaskError {
    /// Builds a not-found error for a task.
    #[must_use]
    pub const fn task_not_found(id: TaskId) -> Self {
        Self::NotFound {
            entity: EntityKind::Task,
            id: id.value(),
        }
    }

    /// Builds a conflict error for a filter that matched `matched` rows.
    #[must_use]
    pub fn ambiguous(entity: EntityKind, matched: usize) -> Self {
        Self::Conflict(format!(
            "{entity} filter matched {matched} rows, expected at most one"
        ))
    }

    /// Wraps a database failure.
    #[must_use]
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(StorageError::Database(Arc::new(err)))
    }

    /// Returns the coarse error classification.
    #[must_use]
    pub const fn kind(&self) -> TaskErrorKind {
        match self {
            Self::NotFound { .. } => TaskErrorKind::NotFound,
            Self::Conflict(_) => TaskErrorKind::Conflict,
            Self::Transition(TransitionError::InvalidTransition { .. }) => {
                TaskErrorKind::InvalidTransition
            }
            Self::Transition(TransitionError::AlreadyRunning { .. }) => {
                TaskErrorKind::AlreadyRunning
            }
            Self::Cancelled => TaskErrorKind::Cancelled,
            Self::Storage(_) => TaskErrorKind::Storage,
        }
    }

    /// Returns `true` when retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(StorageError::SerializationFailure(_)))
    }
}

/// Failures of the transactional store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// A concurrent transaction won; the whole operation may be retried.
    #[error("serialization failure: {0}")]
    SerializationFailure(String),

    /// No connection could be obtained or the connection was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),

    /// A persisted row could not be mapped back into the domain.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// A write was attempted inside a read-only transaction.
    #[error("write attempted in a read-only transaction")]
    ReadOnlyTransaction,

    /// A failure armed by a test double.
    #[error("injected fault: {0}")]
    InjectedFault(String),
}

/// Collapses a filtered row list into at most one row.
///
/// # Errors
///
/// Returns [`TaskError::Conflict`] when more than one row matched; callers
/// treat their filter as a unique key and must never see an arbitrary pick.
pub fn at_most_one<T>(entity: EntityKind, rows: Vec<T>) -> TaskResult<Option<T>> {
    if rows.len() > 1 {
        return Err(TaskError::ambiguous(entity, rows.len()));
    }
    Ok(rows.into_iter().next())
}
