//! Diesel implementation of the task run port.

use super::{
    models::{NewTaskRunRow, TaskRunRow, TaskRunStatusChangeset},
    schema::task_run,
};
use crate::task::{
    domain::{TaskRun, TaskRunCreate, TaskRunFind, TaskRunStatusPatch},
    error::{EntityKind, TaskError, TaskResult},
    ports::TaskRunStore,
};
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Task runs stored in `PostgreSQL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTaskRunStore;

impl TaskRunStore<PgConnection> for PostgresTaskRunStore {
    fn create_task_run(
        &self,
        conn: &mut PgConnection,
        create: &TaskRunCreate,
    ) -> TaskResult<TaskRun> {
        let row = diesel::insert_into(task_run::table)
            .values(NewTaskRunRow::from(create))
            .returning(TaskRunRow::as_returning())
            .get_result::<TaskRunRow>(conn)?;
        TaskRun::try_from(row)
    }

    fn find_task_run_list(
        &self,
        conn: &mut PgConnection,
        find: &TaskRunFind,
    ) -> TaskResult<Vec<TaskRun>> {
        let mut query = task_run::table
            .select(TaskRunRow::as_select())
            .order(task_run::id.asc())
            .into_boxed();
        if let Some(id) = find.id {
            query = query.filter(task_run::id.eq(id.value()));
        }
        if let Some(task_id) = find.task_id {
            query = query.filter(task_run::task_id.eq(task_id.value()));
        }
        if let Some(statuses) = &find.status_list {
            let names: Vec<&str> = statuses.iter().map(|status| status.as_str()).collect();
            query = query.filter(task_run::status.eq_any(names));
        }
        query
            .load::<TaskRunRow>(conn)?
            .into_iter()
            .map(TaskRun::try_from)
            .collect()
    }

    fn patch_task_run_status(
        &self,
        conn: &mut PgConnection,
        patch: &TaskRunStatusPatch,
    ) -> TaskResult<TaskRun> {
        let changes = TaskRunStatusChangeset {
            updater_id: patch.updater_id.value(),
            updated_ts: Utc::now(),
            status: patch.status.as_str().to_owned(),
            code: patch.code,
            result: patch.result.clone(),
            comment: patch.comment.clone(),
        };
        let target = task_run::table
            .filter(task_run::id.eq(patch.id.value()))
            .filter(task_run::task_id.eq(patch.task_id.value()));
        let row = diesel::update(target)
            .set(&changes)
            .returning(TaskRunRow::as_returning())
            .get_result::<TaskRunRow>(conn)
            .optional()?
            .ok_or(TaskError::NotFound {
                entity: EntityKind::TaskRun,
                id: patch.id.value(),
            })?;
        TaskRun::try_from(row)
    }
}
