//! Shared world state for task status transition BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use schemaflow::task::{
    adapters::memory::InMemoryDatabase,
    domain::{Task, TaskFind, TaskStatus},
    error::TaskResult,
    ports::{OperationContext, TaskRepository},
    services::TaskService,
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<InMemoryDatabase, DefaultClock>;

/// Scenario world for task status behaviour tests.
pub struct TaskStatusWorld {
    /// Database behind the service, used to arm faults.
    pub db: InMemoryDatabase,
    /// Service under test.
    pub service: TestTaskService,
    /// Task created by the scenario.
    pub task: Option<Task>,
    /// Outcome of the last status change.
    pub last_result: Option<TaskResult<Task>>,
}

impl TaskStatusWorld {
    /// Creates a world over an empty database.
    #[must_use]
    pub fn new() -> Self {
        let db = InMemoryDatabase::new();
        let service = db.task_service(Arc::new(DefaultClock));
        Self {
            db,
            service,
            task: None,
            last_result: None,
        }
    }

    /// Returns the task created by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Reloads the scenario task from the store.
    ///
    /// # Errors
    ///
    /// Returns an error when the task is missing or the lookup fails.
    pub fn stored_task(&self) -> Result<Task, eyre::Report> {
        let id = self.task()?.id;
        run_async(
            self.service
                .find_task(&OperationContext::new(), &TaskFind::by_id(id)),
        )?
        .ok_or_else(|| eyre::eyre!("task {id} is no longer stored"))
    }
}

impl Default for TaskStatusWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStatusWorld {
    TaskStatusWorld::default()
}

/// Parses a status named in a feature file.
///
/// # Errors
///
/// Returns an error when the name is not a task status.
pub fn parse_status(name: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(name).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
