//! Task runs: one record per execution attempt of a task.

use super::{PrincipalId, TaskId, TaskPayload, TaskRunId, TaskRunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One execution attempt of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRun {
    /// Row identifier.
    pub id: TaskRunId,
    /// Principal that started the run.
    pub creator_id: PrincipalId,
    /// Creation timestamp.
    pub created_ts: DateTime<Utc>,
    /// Principal that last updated the run.
    pub updater_id: PrincipalId,
    /// Last update timestamp.
    pub updated_ts: DateTime<Utc>,
    /// Owning task.
    pub task_id: TaskId,
    /// Task name followed by a uniqueness suffix.
    pub name: String,
    /// Run status.
    pub status: TaskRunStatus,
    /// Task kind copied from the task when the run started.
    #[serde(rename = "type")]
    pub run_type: String,
    /// Payload copied from the task when the run started.
    pub payload: TaskPayload,
    /// Result code reported by the executor.
    pub code: i32,
    /// Result payload reported by the executor.
    pub result: Value,
    /// Free-text comment reported by the executor.
    pub comment: String,
}

impl TaskRun {
    /// Returns `true` while the attempt is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TaskRunStatus::Running
    }
}

/// Parameter object for starting a run. Runs always start as
/// [`TaskRunStatus::Running`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRunCreate {
    /// Principal starting the run.
    pub creator_id: PrincipalId,
    /// Owning task.
    pub task_id: TaskId,
    /// Run name.
    pub name: String,
    /// Task kind copied from the task.
    pub run_type: String,
    /// Payload copied from the task.
    pub payload: TaskPayload,
}

/// Typed filter for task run lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRunFind {
    /// Match a single run id.
    pub id: Option<TaskRunId>,
    /// Match runs of a task.
    pub task_id: Option<TaskId>,
    /// Match runs whose status is in the set.
    pub status_list: Option<Vec<TaskRunStatus>>,
}

impl TaskRunFind {
    /// Filter matching every run of a task.
    #[must_use]
    pub fn for_task(task_id: TaskId) -> Self {
        Self {
            task_id: Some(task_id),
            ..Self::default()
        }
    }

    /// Filter matching the in-progress runs of a task.
    #[must_use]
    pub fn running_for(task_id: TaskId) -> Self {
        Self {
            task_id: Some(task_id),
            status_list: Some(vec![TaskRunStatus::Running]),
            ..Self::default()
        }
    }

    /// Returns `true` when `run` satisfies every set field.
    #[must_use]
    pub fn matches(&self, run: &TaskRun) -> bool {
        self.id.is_none_or(|id| id == run.id)
            && self.task_id.is_none_or(|id| id == run.task_id)
            && self
                .status_list
                .as_ref()
                .is_none_or(|statuses| statuses.contains(&run.status))
    }
}

/// Status change for a run, scoped to its owning task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRunStatusPatch {
    /// Run to update.
    pub id: TaskRunId,
    /// Owning task; the update matches nothing if the run belongs elsewhere.
    pub task_id: TaskId,
    /// Principal performing the update.
    pub updater_id: PrincipalId,
    /// New run status.
    pub status: TaskRunStatus,
    /// Result code, left unchanged when absent.
    pub code: Option<i32>,
    /// Result payload, left unchanged when absent.
    pub result: Option<Value>,
    /// Comment, left unchanged when absent.
    pub comment: Option<String>,
}
