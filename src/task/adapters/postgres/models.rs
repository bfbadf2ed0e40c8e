//! Diesel row models for task orchestration persistence.

use super::schema::{task, task_check_run, task_run};
use crate::task::{
    domain::{
        DatabaseId, InstanceId, PipelineId, PrincipalId, StageId, Task, TaskCheckRun,
        TaskCheckRunId, TaskCheckRunStatus, TaskCreate, TaskId, TaskPayload, TaskRun,
        TaskRunCreate, TaskRunId, TaskRunStatus, TaskStatus,
    },
    error::{StorageError, TaskError, TaskResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: i64,
    pub creator_id: i64,
    pub created_ts: DateTime<Utc>,
    pub updater_id: i64,
    pub updated_ts: DateTime<Utc>,
    pub pipeline_id: i64,
    pub stage_id: i64,
    pub instance_id: i64,
    pub database_id: Option<i64>,
    pub name: String,
    pub status: String,
    pub task_type: String,
    pub payload: Value,
    pub earliest_allowed_ts: Option<DateTime<Utc>>,
}

/// Insert model for task records. A `None` database id leaves the column
/// at its default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task)]
pub struct NewTaskRow {
    pub creator_id: i64,
    pub updater_id: i64,
    pub pipeline_id: i64,
    pub stage_id: i64,
    pub instance_id: i64,
    pub database_id: Option<i64>,
    pub name: String,
    pub status: String,
    pub task_type: String,
    pub payload: Value,
    pub earliest_allowed_ts: Option<DateTime<Utc>>,
}

impl From<&TaskCreate> for NewTaskRow {
    fn from(create: &TaskCreate) -> Self {
        Self {
            creator_id: create.creator_id.value(),
            updater_id: create.creator_id.value(),
            pipeline_id: create.pipeline_id.value(),
            stage_id: create.stage_id.value(),
            instance_id: create.instance_id.value(),
            database_id: create.database_id.map(DatabaseId::value),
            name: create.name.clone(),
            status: create.status.as_str().to_owned(),
            task_type: create.task_type.clone(),
            payload: create.payload.as_value().clone(),
            earliest_allowed_ts: create.earliest_allowed_ts,
        }
    }
}

/// Metadata changes for a task; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task)]
pub struct TaskChangeset {
    pub updater_id: i64,
    pub updated_ts: DateTime<Utc>,
    pub database_id: Option<i64>,
    pub payload: Option<Value>,
    pub earliest_allowed_ts: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskError;

    fn try_from(row: TaskRow) -> TaskResult<Self> {
        let status = TaskStatus::try_from(row.status.as_str()).map_err(corrupt)?;
        Ok(Self {
            id: TaskId::new(row.id),
            creator_id: PrincipalId::new(row.creator_id),
            created_ts: row.created_ts,
            updater_id: PrincipalId::new(row.updater_id),
            updated_ts: row.updated_ts,
            pipeline_id: PipelineId::new(row.pipeline_id),
            stage_id: StageId::new(row.stage_id),
            instance_id: InstanceId::new(row.instance_id),
            database_id: row.database_id.map(DatabaseId::new),
            name: row.name,
            status,
            task_type: row.task_type,
            payload: TaskPayload::new(row.payload),
            earliest_allowed_ts: row.earliest_allowed_ts,
            task_runs: Vec::new(),
            task_check_runs: Vec::new(),
        })
    }
}

/// Query result row for task run records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_run)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRunRow {
    pub id: i64,
    pub creator_id: i64,
    pub created_ts: DateTime<Utc>,
    pub updater_id: i64,
    pub updated_ts: DateTime<Utc>,
    pub task_id: i64,
    pub name: String,
    pub status: String,
    pub run_type: String,
    pub payload: Value,
    pub code: i32,
    pub result: Value,
    pub comment: String,
}

/// Insert model for task run records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_run)]
pub struct NewTaskRunRow {
    pub creator_id: i64,
    pub updater_id: i64,
    pub task_id: i64,
    pub name: String,
    pub status: String,
    pub run_type: String,
    pub payload: Value,
}

impl From<&TaskRunCreate> for NewTaskRunRow {
    fn from(create: &TaskRunCreate) -> Self {
        Self {
            creator_id: create.creator_id.value(),
            updater_id: create.creator_id.value(),
            task_id: create.task_id.value(),
            name: create.name.clone(),
            status: TaskRunStatus::Running.as_str().to_owned(),
            run_type: create.run_type.clone(),
            payload: create.payload.as_value().clone(),
        }
    }
}

/// Status and outcome changes for a task run.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task_run)]
pub struct TaskRunStatusChangeset {
    pub updater_id: i64,
    pub updated_ts: DateTime<Utc>,
    pub status: String,
    pub code: Option<i32>,
    pub result: Option<Value>,
    pub comment: Option<String>,
}

impl TryFrom<TaskRunRow> for TaskRun {
    type Error = TaskError;

    fn try_from(row: TaskRunRow) -> TaskResult<Self> {
        let status = TaskRunStatus::try_from(row.status.as_str()).map_err(corrupt)?;
        Ok(Self {
            id: TaskRunId::new(row.id),
            creator_id: PrincipalId::new(row.creator_id),
            created_ts: row.created_ts,
            updater_id: PrincipalId::new(row.updater_id),
            updated_ts: row.updated_ts,
            task_id: TaskId::new(row.task_id),
            name: row.name,
            status,
            run_type: row.run_type,
            payload: TaskPayload::new(row.payload),
            code: row.code,
            result: row.result,
            comment: row.comment,
        })
    }
}

/// Query result row for task check run records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_check_run)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskCheckRunRow {
    pub id: i64,
    pub creator_id: i64,
    pub created_ts: DateTime<Utc>,
    pub updater_id: i64,
    pub updated_ts: DateTime<Utc>,
    pub task_id: i64,
    pub status: String,
    pub check_type: String,
    pub code: i32,
    pub comment: String,
    pub result: Value,
    pub payload: Value,
}

impl TryFrom<TaskCheckRunRow> for TaskCheckRun {
    type Error = TaskError;

    fn try_from(row: TaskCheckRunRow) -> TaskResult<Self> {
        let status = TaskCheckRunStatus::try_from(row.status.as_str()).map_err(corrupt)?;
        Ok(Self {
            id: TaskCheckRunId::new(row.id),
            creator_id: PrincipalId::new(row.creator_id),
            created_ts: row.created_ts,
            updater_id: PrincipalId::new(row.updater_id),
            updated_ts: row.updated_ts,
            task_id: TaskId::new(row.task_id),
            status,
            check_type: row.check_type,
            code: row.code,
            comment: row.comment,
            result: row.result,
            payload: TaskPayload::new(row.payload),
        })
    }
}

fn corrupt(err: impl std::fmt::Display) -> TaskError {
    TaskError::Storage(StorageError::CorruptRow(err.to_string()))
}
