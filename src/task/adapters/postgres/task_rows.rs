//! Diesel implementation of the task table port.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::task,
};
use crate::task::{
    domain::{DatabaseId, PrincipalId, Task, TaskCreate, TaskFind, TaskId, TaskPatch, TaskStatus},
    error::TaskResult,
    ports::TaskRowStore,
};
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Task rows stored in `PostgreSQL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTaskRows;

impl TaskRowStore<PgConnection> for PostgresTaskRows {
    fn insert_task(&self, conn: &mut PgConnection, create: &TaskCreate) -> TaskResult<Task> {
        let row = diesel::insert_into(task::table)
            .values(NewTaskRow::from(create))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(conn)?;
        Task::try_from(row)
    }

    fn select_tasks(&self, conn: &mut PgConnection, find: &TaskFind) -> TaskResult<Vec<Task>> {
        let mut query = task::table
            .select(TaskRow::as_select())
            .order(task::id.asc())
            .into_boxed();
        if let Some(id) = find.id {
            query = query.filter(task::id.eq(id.value()));
        }
        if let Some(pipeline_id) = find.pipeline_id {
            query = query.filter(task::pipeline_id.eq(pipeline_id.value()));
        }
        if let Some(stage_id) = find.stage_id {
            query = query.filter(task::stage_id.eq(stage_id.value()));
        }
        if let Some(statuses) = &find.status_list {
            let names: Vec<&str> = statuses.iter().map(|status| status.as_str()).collect();
            query = query.filter(task::status.eq_any(names));
        }
        query
            .load::<TaskRow>(conn)?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    fn update_task(&self, conn: &mut PgConnection, patch: &TaskPatch) -> TaskResult<Option<Task>> {
        let changes = TaskChangeset {
            updater_id: patch.updater_id.value(),
            updated_ts: Utc::now(),
            database_id: patch.database_id.map(DatabaseId::value),
            payload: patch
                .payload
                .as_ref()
                .map(|payload| payload.as_value().clone()),
            earliest_allowed_ts: patch.earliest_allowed_ts,
        };
        diesel::update(task::table.find(patch.id.value()))
            .set(&changes)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(conn)
            .optional()?
            .map(Task::try_from)
            .transpose()
    }

    fn update_task_status(
        &self,
        conn: &mut PgConnection,
        id: TaskId,
        status: TaskStatus,
        updater_id: PrincipalId,
    ) -> TaskResult<Option<Task>> {
        diesel::update(task::table.find(id.value()))
            .set((
                task::status.eq(status.as_str()),
                task::updater_id.eq(updater_id.value()),
                task::updated_ts.eq(Utc::now()),
            ))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(conn)
            .optional()?
            .map(Task::try_from)
            .transpose()
    }
}
