//! Task check runs: validation attempts written by the external checker.

use super::{PrincipalId, TaskCheckRunId, TaskCheckRunStatus, TaskId, TaskPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One validation attempt associated with a task.
///
/// The orchestration core only reads these records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCheckRun {
    /// Row identifier.
    pub id: TaskCheckRunId,
    /// Principal that started the check.
    pub creator_id: PrincipalId,
    /// Creation timestamp.
    pub created_ts: DateTime<Utc>,
    /// Principal that last updated the check.
    pub updater_id: PrincipalId,
    /// Last update timestamp.
    pub updated_ts: DateTime<Utc>,
    /// Task under validation.
    pub task_id: TaskId,
    /// Check status.
    pub status: TaskCheckRunStatus,
    /// Check kind.
    #[serde(rename = "type")]
    pub check_type: String,
    /// Result code reported by the checker.
    pub code: i32,
    /// Free-text comment reported by the checker.
    pub comment: String,
    /// Result payload reported by the checker.
    pub result: Value,
    /// Checker input payload.
    pub payload: TaskPayload,
}

/// Typed filter for task check run lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCheckRunFind {
    /// Match checks of a task.
    pub task_id: Option<TaskId>,
    /// Match checks whose status is in the set.
    pub status_list: Option<Vec<TaskCheckRunStatus>>,
}

impl TaskCheckRunFind {
    /// Filter matching every check of a task.
    #[must_use]
    pub fn for_task(task_id: TaskId) -> Self {
        Self {
            task_id: Some(task_id),
            status_list: None,
        }
    }

    /// Returns `true` when `check` satisfies every set field.
    #[must_use]
    pub fn matches(&self, check: &TaskCheckRun) -> bool {
        self.task_id.is_none_or(|id| id == check.task_id)
            && self
                .status_list
                .as_ref()
                .is_none_or(|statuses| statuses.contains(&check.status))
    }
}
