//! Port contracts for task orchestration.
//!
//! Ports define infrastructure-agnostic interfaces. The store ports are
//! generic over the connection type of a [`TransactionRunner`], which is how
//! they join the caller's transaction.

pub mod context;
pub mod repository;
pub mod task_check_run;
pub mod task_rows;
pub mod task_run;
pub mod transaction;

pub use context::OperationContext;
pub use repository::TaskRepository;
pub use task_check_run::TaskCheckRunStore;
pub use task_rows::TaskRowStore;
pub use task_run::TaskRunStore;
pub use transaction::{TransactionMode, TransactionRunner};
