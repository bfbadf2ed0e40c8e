//! Diesel transactions and the error boundary for the `PostgreSQL` store.

use super::{
    PostgresTaskCheckRunStore, PostgresTaskRows, PostgresTaskRunStore, config::TaskPgPool,
};
use crate::task::{
    error::{StorageError, TaskError, TaskResult},
    ports::{TransactionMode, TransactionRunner},
    services::{TaskService, TaskStores},
};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::Clock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Message `PostgreSQL` reports when `statement_timeout` cancels a statement.
const STATEMENT_TIMEOUT_MESSAGE: &str = "canceling statement due to statement timeout";

/// Runs task store transactions on pooled `PostgreSQL` connections.
#[derive(Debug, Clone)]
pub struct PostgresTransactionRunner {
    pool: TaskPgPool,
}

impl PostgresTransactionRunner {
    /// Creates a runner over `pool`.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Returns the `PostgreSQL` store ports.
    #[must_use]
    pub fn stores() -> TaskStores<PgConnection> {
        TaskStores::new(
            Arc::new(PostgresTaskRows),
            Arc::new(PostgresTaskRunStore),
            Arc::new(PostgresTaskCheckRunStore),
        )
    }

    /// Builds a task service backed by this runner.
    #[must_use]
    pub fn task_service<C>(self, clock: Arc<C>) -> TaskService<Self, C>
    where
        C: Clock + Send + Sync + 'static,
    {
        TaskService::new(Arc::new(self), Self::stores(), clock)
    }
}

impl TransactionRunner for PostgresTransactionRunner {
    type Connection = PgConnection;

    fn run_in_transaction<T, F>(&self, mode: TransactionMode, f: F) -> TaskResult<T>
    where
        F: FnOnce(&mut Self::Connection) -> TaskResult<T>,
    {
        self.run_with_deadline(mode, None, f)
    }

    fn run_with_deadline<T, F>(
        &self,
        mode: TransactionMode,
        deadline: Option<Instant>,
        f: F,
    ) -> TaskResult<T>
    where
        F: FnOnce(&mut Self::Connection) -> TaskResult<T>,
    {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| TaskError::Storage(StorageError::Connection(err.to_string())))?;
        let bounded = |tx: &mut PgConnection| -> TaskResult<T> {
            if let Some(limit) = deadline {
                set_statement_timeout(tx, limit.saturating_duration_since(Instant::now()))?;
            }
            f(tx)
        };
        let builder = conn.build_transaction();
        match mode {
            TransactionMode::Snapshot => builder.repeatable_read().read_only().run(bounded),
            TransactionMode::ReadWrite => builder.read_write().run(bounded),
            TransactionMode::Serializable => builder.serializable().run(bounded),
        }
    }
}

/// Bounds every later statement of the open transaction by `remaining`.
///
/// `SET` takes no bind parameters, so the value is formatted from an
/// integer. Zero would disable the timeout; an expired deadline becomes one
/// millisecond instead.
fn set_statement_timeout(conn: &mut PgConnection, remaining: Duration) -> TaskResult<()> {
    let millis = i32::try_from(remaining.as_millis())
        .unwrap_or(i32::MAX)
        .max(1);
    diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}")).execute(conn)?;
    Ok(())
}

/// Maps a Diesel error into the task error taxonomy.
#[must_use]
pub fn format_error(err: DieselError) -> TaskError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            TaskError::Storage(StorageError::SerializationFailure(info.message().to_owned()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            TaskError::Conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ReadOnlyTransaction, _) => {
            TaskError::Storage(StorageError::ReadOnlyTransaction)
        }
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info)
            if info.message().starts_with(STATEMENT_TIMEOUT_MESSAGE) =>
        {
            TaskError::Cancelled
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            TaskError::Storage(StorageError::Connection(info.message().to_owned()))
        }
        DieselError::DeserializationError(err) => {
            TaskError::Storage(StorageError::CorruptRow(err.to_string()))
        }
        other => TaskError::storage(other),
    }
}

impl From<DieselError> for TaskError {
    fn from(err: DieselError) -> Self {
        format_error(err)
    }
}
