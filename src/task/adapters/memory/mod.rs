//! In-memory adapters for task orchestration tests.

mod database;
mod task_check_run;
mod task_rows;
mod task_run;

pub use database::{FaultPoint, InMemoryDatabase, InMemoryTransaction};
pub use task_check_run::InMemoryTaskCheckRunStore;
pub use task_rows::InMemoryTaskRows;
pub use task_run::InMemoryTaskRunStore;
