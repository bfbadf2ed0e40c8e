//! In-memory integration tests for task status transitions.

use super::helpers::{OPERATOR, TestService, create_task, ctx, patch_status, running_task, service};
use eyre::{OptionExt, ensure};
use rstest::rstest;
use schemaflow::task::{
    domain::{TaskFind, TaskId, TaskRunStatus, TaskStatus, TaskStatusPatch},
    error::{TaskError, TaskErrorKind},
    ports::{OperationContext, TaskRepository},
};
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_release_creates_no_run(service: TestService) -> eyre::Result<()> {
    let task = create_task(&service, "create users table", TaskStatus::PendingApproval).await?;

    let released = patch_status(&service, &task, TaskStatus::Pending).await?;

    ensure!(released.status == TaskStatus::Pending);
    ensure!(released.updater_id == OPERATOR);
    ensure!(released.task_runs.is_empty(), "approval must not start a run");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_creates_one_running_run(service: TestService) -> eyre::Result<()> {
    let task = create_task(&service, "migrate-users", TaskStatus::Pending).await?;

    let started = patch_status(&service, &task, TaskStatus::Running).await?;

    ensure!(started.status == TaskStatus::Running);
    ensure!(started.task_runs.len() == 1, "expected one run, got {:?}", started.task_runs);
    let run = started.task_runs.first().ok_or_eyre("missing run")?;
    ensure!(run.status == TaskRunStatus::Running);
    ensure!(run.name.starts_with("migrate-users "), "unexpected run name {}", run.name);
    ensure!(run.run_type == task.task_type && run.payload == task.payload);
    ensure!(run.creator_id == OPERATOR);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_start_is_rejected_without_new_run(service: TestService) -> eyre::Result<()> {
    let task = running_task(&service, "backfill orders").await?;

    let result = patch_status(&service, &task, TaskStatus::Running).await;
    ensure!(
        result_kind(&result) == Some(TaskErrorKind::AlreadyRunning),
        "unexpected result {result:?}"
    );

    let reloaded = service
        .find_task(&OperationContext::new(), &TaskFind::by_id(task.id))
        .await?
        .ok_or_eyre("task disappeared")?;
    ensure!(reloaded.task_runs.len() == 1, "run count changed");
    ensure!(reloaded.status == TaskStatus::Running);
    Ok(())
}

#[rstest]
#[case(TaskStatus::Done, TaskRunStatus::Done)]
#[case(TaskStatus::Failed, TaskRunStatus::Failed)]
#[case(TaskStatus::Canceled, TaskRunStatus::Canceled)]
#[tokio::test(flavor = "multi_thread")]
async fn terminal_status_finishes_run_with_outcome(
    service: TestService,
    ctx: OperationContext,
    #[case] requested: TaskStatus,
    #[case] run_status: TaskRunStatus,
) -> eyre::Result<()> {
    let task = running_task(&service, "drop legacy column").await?;
    let patch = TaskStatusPatch::new(task.id, OPERATOR, requested)
        .with_code(17)
        .with_result(json!({"affected_rows": 0}))
        .with_comment("finished by executor");

    let finished = service.patch_task_status(&ctx, &patch).await?;

    ensure!(finished.status == requested);
    let run = finished.task_runs.first().ok_or_eyre("missing run")?;
    ensure!(finished.task_runs.len() == 1);
    ensure!(run.status == run_status);
    ensure!(run.code == 17);
    ensure!(run.result == json!({"affected_rows": 0}));
    ensure!(run.comment == "finished by executor");
    ensure!(run.updater_id == OPERATOR);
    ensure!(finished.running_task_runs().count() == 0);
    Ok(())
}

#[rstest]
#[case(TaskStatus::Done)]
#[case(TaskStatus::Pending)]
#[tokio::test(flavor = "multi_thread")]
async fn non_start_without_running_run_is_invalid(
    service: TestService,
    #[case] requested: TaskStatus,
) -> eyre::Result<()> {
    let task = create_task(&service, "vacuum", TaskStatus::Failed).await?;

    let result = patch_status(&service, &task, requested).await;

    ensure!(
        result_kind(&result) == Some(TaskErrorKind::InvalidTransition),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retry_after_failure_starts_a_fresh_run(service: TestService) -> eyre::Result<()> {
    let task = running_task(&service, "add index").await?;
    let failed = patch_status(&service, &task, TaskStatus::Failed).await?;

    let restarted = patch_status(&service, &failed, TaskStatus::Running).await?;

    let statuses: Vec<TaskRunStatus> = restarted.task_runs.iter().map(|run| run.status).collect();
    ensure!(
        statuses == [TaskRunStatus::Failed, TaskRunStatus::Running],
        "runs should be ordered by id: {statuses:?}"
    );
    ensure!(restarted.running_task_runs().count() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn waiting_status_keeps_the_run_active(service: TestService) -> eyre::Result<()> {
    let task = running_task(&service, "rebuild index").await?;

    let paused = patch_status(&service, &task, TaskStatus::Pending).await?;

    ensure!(paused.status == TaskStatus::Pending);
    ensure!(paused.running_task_runs().count() == 1, "run should stay active");

    let resumed = patch_status(&service, &paused, TaskStatus::Running).await;
    ensure!(
        result_kind(&resumed) == Some(TaskErrorKind::AlreadyRunning),
        "active run should still block a new start: {resumed:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_task_is_not_found(service: TestService) -> eyre::Result<()> {
    let task = create_task(&service, "placeholder", TaskStatus::Pending).await?;
    let mut ghost = task.clone();
    ghost.id = TaskId::new(task.id.value() + 1000);

    let result = patch_status(&service, &ghost, TaskStatus::Running).await;

    ensure!(result_kind(&result) == Some(TaskErrorKind::NotFound), "unexpected {result:?}");
    Ok(())
}

fn result_kind<T>(result: &Result<T, TaskError>) -> Option<TaskErrorKind> {
    result.as_ref().err().map(TaskError::kind)
}
