//! Application services for task orchestration.

mod retry;
mod status_transition;
mod task_service;

pub use retry::retry_serialization_failures;
pub use status_transition::apply_status_patch;
pub use task_service::{TaskService, TaskStores};
