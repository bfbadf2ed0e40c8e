//! `PostgreSQL` adapters for task orchestration persistence.
//!
//! Every store runs on the connection of a transaction opened by
//! [`PostgresTransactionRunner`]; Diesel errors are converted once, in
//! [`format_error`].

mod config;
mod models;
mod schema;
mod task_check_run;
mod task_rows;
mod task_run;
mod transaction;

pub use config::{
    CONNECT_TIMEOUT_VAR, ConfigError, DATABASE_URL_VAR, MAX_CONNECTIONS_VAR, PostgresConfig,
    TaskPgPool,
};
pub use task_check_run::PostgresTaskCheckRunStore;
pub use task_rows::PostgresTaskRows;
pub use task_run::PostgresTaskRunStore;
pub use transaction::{PostgresTransactionRunner, format_error};
