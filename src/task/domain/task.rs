//! Task records and the parameter objects that create, find, and patch them.

use super::{
    DatabaseId, InstanceId, PipelineId, PrincipalId, StageId, TaskCheckRun, TaskId, TaskPayload,
    TaskRun, TaskStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of work inside a pipeline stage, together with its execution and
/// validation history.
///
/// Task runs and task check runs point back at the task; the lists here are
/// attached by the repository when the task is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Row identifier.
    pub id: TaskId,
    /// Principal that created the task.
    pub creator_id: PrincipalId,
    /// Creation timestamp.
    pub created_ts: DateTime<Utc>,
    /// Principal that last updated the task.
    pub updater_id: PrincipalId,
    /// Last update timestamp.
    pub updated_ts: DateTime<Utc>,
    /// Owning pipeline.
    pub pipeline_id: PipelineId,
    /// Owning stage.
    pub stage_id: StageId,
    /// Target instance.
    pub instance_id: InstanceId,
    /// Target database, absent for instance-level tasks.
    pub database_id: Option<DatabaseId>,
    /// Human-readable task name.
    pub name: String,
    /// Declared status.
    pub status: TaskStatus,
    /// Task kind, opaque to the orchestration core.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Executor payload.
    pub payload: TaskPayload,
    /// Instant before which the task must not start.
    pub earliest_allowed_ts: Option<DateTime<Utc>>,
    /// Execution attempts, ordered by id.
    pub task_runs: Vec<TaskRun>,
    /// Validation attempts, ordered by id.
    pub task_check_runs: Vec<TaskCheckRun>,
}

impl Task {
    /// Returns `true` once `now` is at or past the scheduling floor.
    #[must_use]
    pub fn earliest_start_reached(&self, now: DateTime<Utc>) -> bool {
        self.earliest_allowed_ts.is_none_or(|floor| now >= floor)
    }

    /// Returns the runs currently in progress.
    pub fn running_task_runs(&self) -> impl Iterator<Item = &TaskRun> {
        self.task_runs.iter().filter(|run| run.is_running())
    }
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCreate {
    /// Principal creating the task; also recorded as the first updater.
    pub creator_id: PrincipalId,
    /// Owning pipeline.
    pub pipeline_id: PipelineId,
    /// Owning stage.
    pub stage_id: StageId,
    /// Target instance.
    pub instance_id: InstanceId,
    /// Target database, stored only when supplied.
    pub database_id: Option<DatabaseId>,
    /// Task name.
    pub name: String,
    /// Initial status.
    pub status: TaskStatus,
    /// Task kind.
    pub task_type: String,
    /// Executor payload; defaults to an empty object.
    pub payload: TaskPayload,
    /// Scheduling floor.
    pub earliest_allowed_ts: Option<DateTime<Utc>>,
}

/// Placement of a new task inside a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPlacement {
    /// Owning pipeline.
    pub pipeline_id: PipelineId,
    /// Owning stage.
    pub stage_id: StageId,
    /// Target instance.
    pub instance_id: InstanceId,
}

impl TaskCreate {
    /// Creates a request with the required fields and an empty payload.
    #[must_use]
    pub fn new(
        creator_id: PrincipalId,
        placement: TaskPlacement,
        name: impl Into<String>,
        status: TaskStatus,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            creator_id,
            pipeline_id: placement.pipeline_id,
            stage_id: placement.stage_id,
            instance_id: placement.instance_id,
            database_id: None,
            name: name.into(),
            status,
            task_type: task_type.into(),
            payload: TaskPayload::empty(),
            earliest_allowed_ts: None,
        }
    }

    /// Targets a specific database.
    #[must_use]
    pub const fn with_database_id(mut self, database_id: DatabaseId) -> Self {
        self.database_id = Some(database_id);
        self
    }

    /// Sets the executor payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<TaskPayload>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Sets the scheduling floor.
    #[must_use]
    pub const fn with_earliest_allowed_ts(mut self, ts: DateTime<Utc>) -> Self {
        self.earliest_allowed_ts = Some(ts);
        self
    }
}

/// Typed filter for task lookups. Set fields are combined conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFind {
    /// Match a single task id.
    pub id: Option<TaskId>,
    /// Match tasks in a pipeline.
    pub pipeline_id: Option<PipelineId>,
    /// Match tasks in a stage.
    pub stage_id: Option<StageId>,
    /// Match tasks whose status is in the set.
    pub status_list: Option<Vec<TaskStatus>>,
}

impl TaskFind {
    /// Filter matching one task id.
    #[must_use]
    pub fn by_id(id: TaskId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Filter matching every task in a pipeline.
    #[must_use]
    pub fn in_pipeline(pipeline_id: PipelineId) -> Self {
        Self {
            pipeline_id: Some(pipeline_id),
            ..Self::default()
        }
    }

    /// Restricts the filter to a stage.
    #[must_use]
    pub const fn with_stage(mut self, stage_id: StageId) -> Self {
        self.stage_id = Some(stage_id);
        self
    }

    /// Restricts the filter to a set of statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.status_list = Some(statuses.into_iter().collect());
        self
    }

    /// Returns `true` when `task` satisfies every set field.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.id.is_none_or(|id| id == task.id)
            && self.pipeline_id.is_none_or(|id| id == task.pipeline_id)
            && self.stage_id.is_none_or(|id| id == task.stage_id)
            && self
                .status_list
                .as_ref()
                .is_none_or(|statuses| statuses.contains(&task.status))
    }
}

/// Partial update of a task's mutable metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    /// Task to update.
    pub id: TaskId,
    /// Principal performing the update.
    pub updater_id: PrincipalId,
    /// New target database.
    pub database_id: Option<DatabaseId>,
    /// New executor payload.
    pub payload: Option<TaskPayload>,
    /// New scheduling floor.
    pub earliest_allowed_ts: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Creates a patch that only stamps the updater.
    #[must_use]
    pub const fn new(id: TaskId, updater_id: PrincipalId) -> Self {
        Self {
            id,
            updater_id,
            database_id: None,
            payload: None,
            earliest_allowed_ts: None,
        }
    }

    /// Sets the target database.
    #[must_use]
    pub const fn with_database_id(mut self, database_id: DatabaseId) -> Self {
        self.database_id = Some(database_id);
        self
    }

    /// Replaces the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<TaskPayload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Moves the scheduling floor.
    #[must_use]
    pub const fn with_earliest_allowed_ts(mut self, ts: DateTime<Utc>) -> Self {
        self.earliest_allowed_ts = Some(ts);
        self
    }
}

/// Request to change a task's status, with the outcome to record on the
/// active run when the change finishes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusPatch {
    /// Task to update.
    pub id: TaskId,
    /// Principal performing the update.
    pub updater_id: PrincipalId,
    /// Requested task status.
    pub status: TaskStatus,
    /// Result code recorded on a finished run.
    pub code: Option<i32>,
    /// Result payload recorded on a finished run.
    pub result: Option<Value>,
    /// Free-text comment recorded on a finished run.
    pub comment: Option<String>,
}

impl TaskStatusPatch {
    /// Creates a status change without run outcome details.
    #[must_use]
    pub const fn new(id: TaskId, updater_id: PrincipalId, status: TaskStatus) -> Self {
        Self {
            id,
            updater_id,
            status,
            code: None,
            result: None,
            comment: None,
        }
    }

    /// Records a result code.
    #[must_use]
    pub const fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Records a result payload.
    #[must_use]
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Records a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
