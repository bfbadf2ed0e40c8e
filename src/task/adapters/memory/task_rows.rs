//! In-memory task table.

use super::{FaultPoint, InMemoryTransaction};
use crate::task::{
    domain::{PrincipalId, Task, TaskCreate, TaskFind, TaskId, TaskPatch, TaskStatus},
    error::TaskResult,
    ports::TaskRowStore,
};

/// Task rows stored in an [`super::InMemoryDatabase`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryTaskRows;

impl TaskRowStore<InMemoryTransaction> for InMemoryTaskRows {
    fn insert_task(&self, tx: &mut InMemoryTransaction, create: &TaskCreate) -> TaskResult<Task> {
        tx.trip(FaultPoint::InsertTask)?;
        let now = tx.now();
        let tables = tx.tables_mut()?;
        let task = Task {
            id: tables.next_task_id(),
            creator_id: create.creator_id,
            created_ts: now,
            updater_id: create.creator_id,
            updated_ts: now,
            pipeline_id: create.pipeline_id,
            stage_id: create.stage_id,
            instance_id: create.instance_id,
            database_id: create.database_id,
            name: create.name.clone(),
            status: create.status,
            task_type: create.task_type.clone(),
            payload: create.payload.clone(),
            earliest_allowed_ts: create.earliest_allowed_ts,
            task_runs: Vec::new(),
            task_check_runs: Vec::new(),
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    fn select_tasks(&self, tx: &mut InMemoryTransaction, find: &TaskFind) -> TaskResult<Vec<Task>> {
        Ok(tx
            .tables()
            .tasks
            .values()
            .filter(|task| find.matches(task))
            .cloned()
            .collect())
    }

    fn update_task(
        &self,
        tx: &mut InMemoryTransaction,
        patch: &TaskPatch,
    ) -> TaskResult<Option<Task>> {
        tx.trip(FaultPoint::UpdateTask)?;
        let now = tx.now();
        let Some(task) = tx.tables_mut()?.tasks.get_mut(&patch.id) else {
            return Ok(None);
        };
        if let Some(database_id) = patch.database_id {
            task.database_id = Some(database_id);
        }
        if let Some(payload) = &patch.payload {
            task.payload = payload.clone();
        }
        if let Some(ts) = patch.earliest_allowed_ts {
            task.earliest_allowed_ts = Some(ts);
        }
        task.updater_id = patch.updater_id;
        task.updated_ts = now;
        Ok(Some(task.clone()))
    }

    fn update_task_status(
        &self,
        tx: &mut InMemoryTransaction,
        id: TaskId,
        status: TaskStatus,
        updater_id: PrincipalId,
    ) -> TaskResult<Option<Task>> {
        tx.trip(FaultPoint::UpdateTaskStatus)?;
        let now = tx.now();
        let Some(task) = tx.tables_mut()?.tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.status = status;
        task.updater_id = updater_id;
        task.updated_ts = now;
        Ok(Some(task.clone()))
    }
}
