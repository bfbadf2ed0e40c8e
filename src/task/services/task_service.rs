//! Task repository service: transaction scoping around the store ports.

use super::status_transition::{apply_status_patch, attach_history};
use crate::task::{
    domain::{Task, TaskCreate, TaskFind, TaskPatch, TaskStatusPatch},
    error::{EntityKind, StorageError, TaskError, TaskResult, at_most_one},
    ports::{
        OperationContext, TaskCheckRunStore, TaskRepository, TaskRowStore, TaskRunStore,
        TransactionMode, TransactionRunner,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

/// Store ports sharing one connection type.
pub struct TaskStores<C> {
    /// Task table access.
    pub tasks: Arc<dyn TaskRowStore<C>>,
    /// Task run store.
    pub task_runs: Arc<dyn TaskRunStore<C>>,
    /// Task check run store.
    pub task_check_runs: Arc<dyn TaskCheckRunStore<C>>,
}

impl<C> TaskStores<C> {
    /// Bundles the three store ports.
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskRowStore<C>>,
        task_runs: Arc<dyn TaskRunStore<C>>,
        task_check_runs: Arc<dyn TaskCheckRunStore<C>>,
    ) -> Self {
        Self {
            tasks,
            task_runs,
            task_check_runs,
        }
    }
}

impl<C> Clone for TaskStores<C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            task_runs: Arc::clone(&self.task_runs),
            task_check_runs: Arc::clone(&self.task_check_runs),
        }
    }
}

/// [`TaskRepository`] implementation over any transactional store.
///
/// The service is stateless between calls. Each operation runs in exactly
/// one transaction on a blocking thread; status changes use
/// [`TransactionMode::Serializable`], reads use [`TransactionMode::Snapshot`].
pub struct TaskService<X, C>
where
    X: TransactionRunner,
    C: Clock + Send + Sync + 'static,
{
    transactions: Arc<X>,
    stores: TaskStores<X::Connection>,
    clock: Arc<C>,
}

impl<X, C> Clone for TaskService<X, C>
where
    X: TransactionRunner,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            transactions: Arc::clone(&self.transactions),
            stores: self.stores.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<X, C> TaskService<X, C>
where
    X: TransactionRunner,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service over a transaction runner and its store ports.
    #[must_use]
    pub const fn new(
        transactions: Arc<X>,
        stores: TaskStores<X::Connection>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            transactions,
            stores,
            clock,
        }
    }

    /// Runs `f` in one transaction on the blocking pool and logs failures.
    ///
    /// The closure sees a context scoped to the returned future: dropping
    /// the future before it resolves cancels that context, so the
    /// transaction fails its next checkpoint and rolls back.
    async fn run<T, F>(
        &self,
        operation: &'static str,
        mode: TransactionMode,
        ctx: &OperationContext,
        f: F,
    ) -> TaskResult<T>
    where
        F: FnOnce(
                &mut X::Connection,
                &TaskStores<X::Connection>,
                &OperationContext,
            ) -> TaskResult<T>
            + Send
            + 'static,
        T: Send + 'static,
    {
        let (op_ctx, _cancel_on_drop) = ctx.scoped();
        let transactions = Arc::clone(&self.transactions);
        let stores = self.stores.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            transactions.run_with_deadline(mode, op_ctx.deadline(), |conn| {
                f(conn, &stores, &op_ctx)
            })
        })
        .await
        .unwrap_or_else(|err| {
            Err(TaskError::Storage(StorageError::Connection(format!(
                "task join error: {err}"
            ))))
        });
        if let Err(err) = &outcome {
            tracing::warn!(
                operation,
                kind = ?err.kind(),
                error = %err,
                "task repository operation failed"
            );
        }
        outcome
    }
}

fn load_task_list<C>(
    conn: &mut C,
    stores: &TaskStores<C>,
    ctx: &OperationContext,
    find: &TaskFind,
) -> TaskResult<Vec<Task>> {
    ctx.checkpoint()?;
    let rows = stores.tasks.select_tasks(conn, find)?;
    let mut tasks = Vec::with_capacity(rows.len());
    for row in rows {
        ctx.checkpoint()?;
        tasks.push(attach_history(conn, stores, row)?);
    }
    Ok(tasks)
}

#[async_trait]
impl<X, C> TaskRepository for TaskService<X, C>
where
    X: TransactionRunner,
    C: Clock + Send + Sync + 'static,
{
    async fn create_task(&self, ctx: &OperationContext, create: &TaskCreate) -> TaskResult<Task> {
        let request = create.clone();
        let task = self
            .run(
                "create_task",
                TransactionMode::ReadWrite,
                ctx,
                move |conn, stores, op_ctx| {
                    op_ctx.checkpoint()?;
                    let inserted = stores.tasks.insert_task(conn, &request)?;
                    op_ctx.checkpoint()?;
                    Ok(inserted)
                },
            )
            .await?;
        tracing::info!(
            task_id = %task.id,
            name = %task.name,
            status = %task.status,
            "created task"
        );
        Ok(task)
    }

    async fn find_task_list(
        &self,
        ctx: &OperationContext,
        find: &TaskFind,
    ) -> TaskResult<Vec<Task>> {
        let filter = find.clone();
        let tasks = self
            .run(
                "find_task_list",
                TransactionMode::Snapshot,
                ctx,
                move |conn, stores, op_ctx| load_task_list(conn, stores, op_ctx, &filter),
            )
            .await?;
        tracing::debug!(count = tasks.len(), "found tasks");
        Ok(tasks)
    }

    async fn find_task(&self, ctx: &OperationContext, find: &TaskFind) -> TaskResult<Option<Task>> {
        let filter = find.clone();
        let found = self
            .run(
                "find_task",
                TransactionMode::Snapshot,
                ctx,
                move |conn, stores, op_ctx| {
                    at_most_one(EntityKind::Task, load_task_list(conn, stores, op_ctx, &filter)?)
                },
            )
            .await?;
        tracing::debug!(found = found.is_some(), "found task");
        Ok(found)
    }

    async fn patch_task(&self, ctx: &OperationContext, patch: &TaskPatch) -> TaskResult<Task> {
        let request = patch.clone();
        let task = self
            .run(
                "patch_task",
                TransactionMode::ReadWrite,
                ctx,
                move |conn, stores, op_ctx| {
                    op_ctx.checkpoint()?;
                    let updated = stores
                        .tasks
                        .update_task(conn, &request)?
                        .ok_or_else(|| TaskError::task_not_found(request.id))?;
                    let aggregate = attach_history(conn, stores, updated)?;
                    op_ctx.checkpoint()?;
                    Ok(aggregate)
                },
            )
            .await?;
        tracing::info!(task_id = %task.id, updater_id = %task.updater_id, "patched task");
        Ok(task)
    }

    async fn patch_task_status(
        &self,
        ctx: &OperationContext,
        patch: &TaskStatusPatch,
    ) -> TaskResult<Task> {
        let request = patch.clone();
        let run_suffix = self.clock.utc().timestamp();
        let task = self
            .run(
                "patch_task_status",
                TransactionMode::Serializable,
                ctx,
                move |conn, stores, op_ctx| {
                    apply_status_patch(conn, stores, op_ctx, &request, run_suffix)
                },
            )
            .await?;
        tracing::info!(
            task_id = %task.id,
            status = %task.status,
            task_runs = task.task_runs.len(),
            "patched task status"
        );
        Ok(task)
    }
}
