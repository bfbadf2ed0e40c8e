//! Schemaflow: task orchestration core for database change pipelines.
//!
//! A deployment pipeline is split into stages, and each stage holds tasks
//! that apply one change to one database. This crate owns the persistence
//! and status rules of those tasks: every execution attempt is recorded as
//! a task run, and status changes start or finish runs atomically so that a
//! task never has two active runs.
//!
//! # Architecture
//!
//! Schemaflow follows hexagonal architecture principles:
//!
//! - **Domain**: Records and the pure status transition planner
//! - **Ports**: Repository, transaction, and store traits
//! - **Adapters**: In-memory and `PostgreSQL` implementations
//! - **Services**: The repository service and status coordinator
//!
//! # Modules
//!
//! - [`task`]: Tasks, task runs, task check runs, and status transitions

pub mod task;
