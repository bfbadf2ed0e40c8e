//! Pure planning of task status transitions.
//!
//! The planner decides which run effect a requested status change has, given
//! the task and its currently running run. It performs no I/O; the
//! coordinator in the service layer applies the plan inside a serializable
//! transaction.

use super::{
    Task, TaskId, TaskRun, TaskRunCreate, TaskRunId, TaskRunStatusPatch, TaskStatus,
    TaskStatusPatch, TransitionError,
};

/// Run-side effect of a task status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEffect {
    /// Runs are not looked at or modified.
    Untouched,
    /// A new attempt starts.
    Start(TaskRunCreate),
    /// The running attempt finishes with the given outcome.
    Finish(TaskRunStatusPatch),
    /// The task moves back to a waiting status while its run stays active.
    LeaveRunning(TaskRunId),
}

/// Outcome of planning a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Task being changed.
    pub task_id: TaskId,
    /// Status before the change.
    pub from: TaskStatus,
    /// Status after the change.
    pub to: TaskStatus,
    /// What happens to the task's runs.
    pub effect: RunEffect,
}

/// Returns `true` for the approval step, which never touches runs.
#[must_use]
pub fn is_approval_release(from: TaskStatus, to: TaskStatus) -> bool {
    from == TaskStatus::PendingApproval && to == TaskStatus::Pending
}

/// Plans the status change requested by `patch`.
///
/// `running` is the task's in-progress run, if any; it is ignored for the
/// approval step. `run_suffix` makes the name of a newly started run unique
/// and is normally the current unix time.
///
/// # Errors
///
/// Returns [`TransitionError::InvalidTransition`] when no run is active and
/// the request is not a start, and [`TransitionError::AlreadyRunning`] when a
/// run is active and the request is another start.
pub fn plan_status_transition(
    task: &Task,
    running: Option<&TaskRun>,
    patch: &TaskStatusPatch,
    run_suffix: i64,
) -> Result<TransitionPlan, TransitionError> {
    let from = task.status;
    let to = patch.status;
    let plan = |effect| TransitionPlan {
        task_id: task.id,
        from,
        to,
        effect,
    };

    if is_approval_release(from, to) {
        return Ok(plan(RunEffect::Untouched));
    }

    let Some(run) = running else {
        if to != TaskStatus::Running {
            return Err(TransitionError::InvalidTransition {
                task_id: task.id,
                from,
                requested: to,
            });
        }
        return Ok(plan(RunEffect::Start(TaskRunCreate {
            creator_id: patch.updater_id,
            task_id: task.id,
            name: format!("{} {run_suffix}", task.name),
            run_type: task.task_type.clone(),
            payload: task.payload.clone(),
        })));
    };

    if to == TaskStatus::Running {
        return Err(TransitionError::AlreadyRunning {
            task_id: task.id,
            name: task.name.clone(),
        });
    }

    let effect = match to.finishing_run_status() {
        Some(status) => RunEffect::Finish(TaskRunStatusPatch {
            id: run.id,
            task_id: task.id,
            updater_id: patch.updater_id,
            status,
            code: patch.code,
            result: patch.result.clone(),
            comment: patch.comment.clone(),
        }),
        None => RunEffect::LeaveRunning(run.id),
    };
    Ok(plan(effect))
}
