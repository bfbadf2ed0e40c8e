//! Domain model for task orchestration.
//!
//! Tasks, task runs, and task check runs are plain records; the only domain
//! behaviour with real rules is [`plan_status_transition`], which decides
//! the run effect of a task status change without touching storage.

mod error;
mod ids;
mod payload;
mod status;
mod task;
mod task_check_run;
mod task_run;
mod transition;

pub use error::{ParseStatusError, TransitionError};
pub use ids::{
    DatabaseId, InstanceId, PipelineId, PrincipalId, StageId, TaskCheckRunId, TaskId, TaskRunId,
};
pub use payload::TaskPayload;
pub use status::{TaskCheckRunStatus, TaskRunStatus, TaskStatus};
pub use task::{Task, TaskCreate, TaskFind, TaskPatch, TaskPlacement, TaskStatusPatch};
pub use task_check_run::{TaskCheckRun, TaskCheckRunFind};
pub use task_run::{TaskRun, TaskRunCreate, TaskRunFind, TaskRunStatusPatch};
pub use transition::{RunEffect, TransitionPlan, is_approval_release, plan_status_transition};
