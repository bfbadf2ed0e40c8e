//! In-memory task run store.

use super::{FaultPoint, InMemoryTransaction};
use crate::task::{
    domain::{TaskRun, TaskRunCreate, TaskRunFind, TaskRunStatus, TaskRunStatusPatch},
    error::{EntityKind, TaskError, TaskResult},
    ports::TaskRunStore,
};
use serde_json::{Map, Value};

/// Task runs stored in an [`super::InMemoryDatabase`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryTaskRunStore;

impl TaskRunStore<InMemoryTransaction> for InMemoryTaskRunStore {
    fn create_task_run(
        &self,
        tx: &mut InMemoryTransaction,
        create: &TaskRunCreate,
    ) -> TaskResult<TaskRun> {
        tx.trip(FaultPoint::CreateTaskRun)?;
        let now = tx.now();
        let tables = tx.tables_mut()?;
        let run = TaskRun {
            id: tables.next_task_run_id(),
            creator_id: create.creator_id,
            created_ts: now,
            updater_id: create.creator_id,
            updated_ts: now,
            task_id: create.task_id,
            name: create.name.clone(),
            status: TaskRunStatus::Running,
            run_type: create.run_type.clone(),
            payload: create.payload.clone(),
            code: 0,
            result: Value::Object(Map::new()),
            comment: String::new(),
        };
        tables.task_runs.insert(run.id, run.clone());
        Ok(run)
    }

    fn find_task_run_list(
        &self,
        tx: &mut InMemoryTransaction,
        find: &TaskRunFind,
    ) -> TaskResult<Vec<TaskRun>> {
        Ok(tx
            .tables()
            .task_runs
            .values()
            .filter(|run| find.matches(run))
            .cloned()
            .collect())
    }

    fn patch_task_run_status(
        &self,
        tx: &mut InMemoryTransaction,
        patch: &TaskRunStatusPatch,
    ) -> TaskResult<TaskRun> {
        tx.trip(FaultPoint::PatchTaskRunStatus)?;
        let now = tx.now();
        let run = tx
            .tables_mut()?
            .task_runs
            .get_mut(&patch.id)
            .filter(|run| run.task_id == patch.task_id)
            .ok_or(TaskError::NotFound {
                entity: EntityKind::TaskRun,
                id: patch.id.value(),
            })?;
        run.status = patch.status;
        run.updater_id = patch.updater_id;
        run.updated_ts = now;
        if let Some(code) = patch.code {
            run.code = code;
        }
        if let Some(result) = &patch.result {
            run.result = result.clone();
        }
        if let Some(comment) = &patch.comment {
            run.comment = comment.clone();
        }
        Ok(run.clone())
    }
}
