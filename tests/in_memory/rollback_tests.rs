//! In-memory integration tests for atomic status changes.
//!
//! Faults are injected at individual store calls; a failed status change
//! must leave the task and its runs exactly as they were.

use super::helpers::{TestService, create_task, db, patch_status, running_task};
use eyre::{OptionExt, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use schemaflow::task::{
    adapters::memory::{FaultPoint, InMemoryDatabase},
    domain::{Task, TaskFind, TaskRunStatus, TaskStatus},
    error::{StorageError, TaskError},
    ports::{OperationContext, TaskRepository},
};
use std::sync::Arc;

fn service_for(db: &InMemoryDatabase) -> TestService {
    db.task_service(Arc::new(DefaultClock))
}

async fn reload(service: &TestService, task: &Task) -> eyre::Result<Task> {
    service
        .find_task(&OperationContext::new(), &TaskFind::by_id(task.id))
        .await?
        .ok_or_eyre("task should still exist")
}

fn is_injected(result: &Result<Task, TaskError>) -> bool {
    matches!(result, Err(TaskError::Storage(StorageError::InjectedFault(_))))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_after_run_patch_rolls_back_both(db: InMemoryDatabase) -> eyre::Result<()> {
    let service = service_for(&db);
    let task = running_task(&service, "truncate staging").await?;
    db.arm_fault(FaultPoint::UpdateTaskStatus)?;

    let result = patch_status(&service, &task, TaskStatus::Done).await;
    ensure!(is_injected(&result), "unexpected result {result:?}");

    let reloaded = reload(&service, &task).await?;
    ensure!(reloaded.status == TaskStatus::Running, "task status leaked");
    let run = reloaded.task_runs.first().ok_or_eyre("run missing")?;
    ensure!(run.status == TaskRunStatus::Running, "run status leaked");
    ensure!(reloaded == task, "aggregate changed after rollback");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_after_run_create_leaves_no_run(db: InMemoryDatabase) -> eyre::Result<()> {
    let service = service_for(&db);
    let task = create_task(&service, "rename column", TaskStatus::Pending).await?;
    db.arm_fault(FaultPoint::UpdateTaskStatus)?;

    let result = patch_status(&service, &task, TaskStatus::Running).await;
    ensure!(is_injected(&result), "unexpected result {result:?}");

    ensure!(db.committed_task_runs()?.is_empty(), "orphan run committed");
    ensure!(reload(&service, &task).await?.status == TaskStatus::Pending);

    let started = patch_status(&service, &task, TaskStatus::Running).await?;
    ensure!(started.task_runs.len() == 1, "retry should start exactly one run");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_run_patch_leaves_task_running(db: InMemoryDatabase) -> eyre::Result<()> {
    let service = service_for(&db);
    let task = running_task(&service, "drop index").await?;
    db.arm_fault(FaultPoint::PatchTaskRunStatus)?;

    let result = patch_status(&service, &task, TaskStatus::Canceled).await;
    ensure!(is_injected(&result), "unexpected result {result:?}");
    ensure!(reload(&service, &task).await? == task);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_failure_discards_the_whole_transition(db: InMemoryDatabase) -> eyre::Result<()> {
    let service = service_for(&db);
    let task = running_task(&service, "analyze").await?;
    db.arm_fault(FaultPoint::Commit)?;

    let result = patch_status(&service, &task, TaskStatus::Failed).await;
    ensure!(is_injected(&result), "unexpected result {result:?}");
    ensure!(reload(&service, &task).await? == task);
    Ok(())
}
