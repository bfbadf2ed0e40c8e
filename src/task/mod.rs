//! Task orchestration for schema change pipelines.
//!
//! A task is one unit of work inside a pipeline stage. Each execution
//! attempt of a task is a task run, and an external checker records task
//! check runs against it. Changing a task's status is the one operation
//! with real rules: it starts, finishes, or leaves alone the task's active
//! run inside a single serializable transaction.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types and the transition planner in [`domain`]
//! - The error taxonomy in [`error`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The repository service and status coordinator in [`services`]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
