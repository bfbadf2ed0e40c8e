//! Status enums for tasks, task runs, and task check runs.

use super::ParseStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task waits for an approver before it may be scheduled.
    PendingApproval,
    /// Task is approved and waits to be started.
    Pending,
    /// Task has an active run.
    Running,
    /// Task finished successfully.
    Done,
    /// Task finished with an error.
    Failed,
    /// Task was canceled.
    Canceled,
}

impl TaskStatus {
    /// Every task status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::PendingApproval,
        Self::Pending,
        Self::Running,
        Self::Done,
        Self::Failed,
        Self::Canceled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }

    /// Returns the run status that finishes an active run when the task moves
    /// to `self`, or `None` when `self` does not finish a run.
    #[must_use]
    pub const fn finishing_run_status(self) -> Option<TaskRunStatus> {
        match self {
            Self::Done => Some(TaskRunStatus::Done),
            Self::Failed => Some(TaskRunStatus::Failed),
            Self::Canceled => Some(TaskRunStatus::Canceled),
            Self::PendingApproval | Self::Pending | Self::Running => None,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING_APPROVAL" => Ok(Self::PendingApproval),
            "PENDING" => Ok(Self::Pending),
            "RUNNING" => Ok(Self::Running),
            "DONE" => Ok(Self::Done),
            "FAILED" => Ok(Self::Failed),
            "CANCELED" => Ok(Self::Canceled),
            _ => Err(ParseStatusError::task(value)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskRunStatus {
    /// The attempt is in progress.
    Running,
    /// The attempt succeeded.
    Done,
    /// The attempt failed.
    Failed,
    /// The attempt was canceled.
    Canceled,
}

impl TaskRunStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl TryFrom<&str> for TaskRunStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(Self::Running),
            "DONE" => Ok(Self::Done),
            "FAILED" => Ok(Self::Failed),
            "CANCELED" => Ok(Self::Canceled),
            _ => Err(ParseStatusError::task_run(value)),
        }
    }
}

impl fmt::Display for TaskRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one validation attempt, owned by the external checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCheckRunStatus {
    /// The check is in progress.
    Running,
    /// The check completed.
    Done,
    /// The check could not complete.
    Failed,
    /// The check was canceled.
    Canceled,
}

impl TaskCheckRunStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl TryFrom<&str> for TaskCheckRunStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(Self::Running),
            "DONE" => Ok(Self::Done),
            "FAILED" => Ok(Self::Failed),
            "CANCELED" => Ok(Self::Canceled),
            _ => Err(ParseStatusError::task_check_run(value)),
        }
    }
}

impl fmt::Display for TaskCheckRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
