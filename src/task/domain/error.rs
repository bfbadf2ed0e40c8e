//! Error types for task domain parsing and transition planning.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Error returned while parsing a persisted status string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} status: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    pub(super) fn task(value: &str) -> Self {
        Self {
            kind: "task",
            value: value.to_owned(),
        }
    }

    pub(super) fn task_run(value: &str) -> Self {
        Self {
            kind: "task run",
            value: value.to_owned(),
        }
    }

    pub(super) fn task_check_run(value: &str) -> Self {
        Self {
            kind: "task check run",
            value: value.to_owned(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Errors returned when a requested status change has no legal run effect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// No run is active, so there is nothing to move to the requested status.
    #[error("no running task run for task {task_id} to move from {from} to {requested}")]
    InvalidTransition {
        /// Task whose status was patched.
        task_id: TaskId,
        /// Status the task held before the request.
        from: TaskStatus,
        /// Status the caller asked for.
        requested: TaskStatus,
    },

    /// A run is already active and starting another one is rejected.
    #[error("task {task_id} is already running: {name}")]
    AlreadyRunning {
        /// Task whose status was patched.
        task_id: TaskId,
        /// Task name, for operator-facing messages.
        name: String,
    },
}
