//! Status transition coordinator.
//!
//! Reads the task and its running run, plans the change with
//! [`plan_status_transition`], writes the run effect and the task status,
//! and reloads the aggregate. It must run inside one serializable
//! transaction: the at-most-one-running-run invariant is protected by the
//! store's isolation alone, so it holds across independent service
//! instances.

use super::TaskStores;
use crate::task::{
    domain::{
        RunEffect, Task, TaskCheckRunFind, TaskFind, TaskRunFind, TaskStatusPatch, TransitionPlan,
        is_approval_release, plan_status_transition,
    },
    error::{EntityKind, TaskError, TaskResult, at_most_one},
    ports::OperationContext,
};

/// Applies `patch` to the task it names, using `conn` as the open
/// transaction.
///
/// `run_suffix` is appended to the name of a newly started run. Nothing is
/// retried here; a failure at any step leaves the caller to roll back.
///
/// # Errors
///
/// Returns [`TaskError::NotFound`] when the task does not exist,
/// [`TaskError::Transition`] when the change has no legal run effect,
/// [`TaskError::Cancelled`] when `ctx` is cancelled, or any store error.
pub fn apply_status_patch<C>(
    conn: &mut C,
    stores: &TaskStores<C>,
    ctx: &OperationContext,
    patch: &TaskStatusPatch,
    run_suffix: i64,
) -> TaskResult<Task> {
    ctx.checkpoint()?;
    let task = find_task_row(conn, stores, &TaskFind::by_id(patch.id))?
        .ok_or_else(|| TaskError::task_not_found(patch.id))?;

    let running = if is_approval_release(task.status, patch.status) {
        None
    } else {
        ctx.checkpoint()?;
        stores
            .task_runs
            .find_task_run(conn, &TaskRunFind::running_for(task.id))?
    };

    let plan = plan_status_transition(&task, running.as_ref(), patch, run_suffix)?;
    ctx.checkpoint()?;
    apply_run_effect(conn, stores, &plan)?;

    ctx.checkpoint()?;
    let updated = stores
        .tasks
        .update_task_status(conn, patch.id, patch.status, patch.updater_id)?
        .ok_or_else(|| TaskError::task_not_found(patch.id))?;

    let aggregate = attach_history(conn, stores, updated)?;
    ctx.checkpoint()?;
    Ok(aggregate)
}

fn apply_run_effect<C>(
    conn: &mut C,
    stores: &TaskStores<C>,
    plan: &TransitionPlan,
) -> TaskResult<()> {
    match &plan.effect {
        RunEffect::Untouched => {}
        RunEffect::Start(create) => {
            let run = stores.task_runs.create_task_run(conn, create)?;
            tracing::debug!(
                task_id = %plan.task_id,
                task_run_id = %run.id,
                name = %run.name,
                "started task run"
            );
        }
        RunEffect::Finish(run_patch) => {
            stores.task_runs.patch_task_run_status(conn, run_patch)?;
            tracing::debug!(
                task_id = %plan.task_id,
                task_run_id = %run_patch.id,
                status = %run_patch.status,
                "finished task run"
            );
        }
        RunEffect::LeaveRunning(run_id) => {
            tracing::warn!(
                task_id = %plan.task_id,
                task_run_id = %run_id,
                from = %plan.from,
                to = %plan.to,
                "task leaves running status while its run stays active"
            );
        }
    }
    Ok(())
}

/// Returns the single task row matching `find`, without history.
pub(super) fn find_task_row<C>(
    conn: &mut C,
    stores: &TaskStores<C>,
    find: &TaskFind,
) -> TaskResult<Option<Task>> {
    at_most_one(EntityKind::Task, stores.tasks.select_tasks(conn, find)?)
}

/// Attaches the full run and check-run lists to a task row.
pub(super) fn attach_history<C>(
    conn: &mut C,
    stores: &TaskStores<C>,
    mut task: Task,
) -> TaskResult<Task> {
    task.task_runs = stores
        .task_runs
        .find_task_run_list(conn, &TaskRunFind::for_task(task.id))?;
    task.task_check_runs = stores
        .task_check_runs
        .find_task_check_run_list(conn, &TaskCheckRunFind::for_task(task.id))?;
    Ok(task)
}
