//! Diesel implementation of the task check run port.

use super::{models::TaskCheckRunRow, schema::task_check_run};
use crate::task::{
    domain::{TaskCheckRun, TaskCheckRunFind},
    error::TaskResult,
    ports::TaskCheckRunStore,
};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Task check runs stored in `PostgreSQL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTaskCheckRunStore;

impl TaskCheckRunStore<PgConnection> for PostgresTaskCheckRunStore {
    fn find_task_check_run_list(
        &self,
        conn: &mut PgConnection,
        find: &TaskCheckRunFind,
    ) -> TaskResult<Vec<TaskCheckRun>> {
        let mut query = task_check_run::table
            .select(TaskCheckRunRow::as_select())
            .order(task_check_run::id.asc())
            .into_boxed();
        if let Some(task_id) = find.task_id {
            query = query.filter(task_check_run::task_id.eq(task_id.value()));
        }
        if let Some(statuses) = &find.status_list {
            let names: Vec<&str> = statuses.iter().map(|status| status.as_str()).collect();
            query = query.filter(task_check_run::status.eq_any(names));
        }
        query
            .load::<TaskCheckRunRow>(conn)?
            .into_iter()
            .map(TaskCheckRun::try_from)
            .collect()
    }
}
