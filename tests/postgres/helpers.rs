//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::BoxError;
use super::cluster::{TemporaryDatabase, shared_cluster};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use once_cell::sync::{Lazy, OnceCell};
use schemaflow::task::{
    adapters::postgres::{DATABASE_URL_VAR, PostgresConfig, PostgresTransactionRunner},
    domain::{
        InstanceId, PipelineId, PrincipalId, StageId, TaskCreate, TaskPlacement, TaskStatus,
    },
    services::TaskService,
};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Environment variable naming an external database to use instead of the
/// embedded cluster.
pub const TEST_DATABASE_URL_VAR: &str = "SCHEMAFLOW_TEST_DATABASE_URL";

/// SQL creating the task tables.
pub const CREATE_TASK_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_task_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "schemaflow_test_template";

/// Service type used by the `PostgreSQL` integration tests.
pub type PgService = TaskService<PostgresTransactionRunner, DefaultClock>;

/// Principal used for every write in the tests.
pub const OPERATOR: PrincipalId = PrincipalId::new(301);

static MIGRATED: OnceCell<()> = OnceCell::new();
static SERIAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// What keeps one test's rows away from the others.
enum Isolation {
    /// A private database cloned from the template.
    Database { _database: TemporaryDatabase },
    /// The shared external database, held exclusively.
    Serial { _lock: MutexGuard<'static, ()> },
}

/// Database handle for one test.
pub struct PgHarness {
    /// Service over a fresh pool. Declared first so the pool closes before
    /// the database is dropped.
    pub service: PgService,
    /// Runner the service uses, for tests that drive transactions directly.
    pub runner: PostgresTransactionRunner,
    /// Pipeline id no other test uses.
    pub pipeline_id: PipelineId,
    _isolation: Isolation,
}

impl PgHarness {
    /// Builds a create request inside this harness's pipeline.
    #[must_use]
    pub fn task_create(&self, name: &str, status: TaskStatus) -> TaskCreate {
        TaskCreate::new(
            OPERATOR,
            TaskPlacement {
                pipeline_id: self.pipeline_id,
                stage_id: StageId::new(1),
                instance_id: InstanceId::new(1),
            },
            name,
            status,
            "bb.task.database.schema.update",
        )
    }
}

/// Prepares a migrated database for one test.
///
/// Uses a fresh database cloned from the template on the embedded cluster,
/// or the database named by `SCHEMAFLOW_TEST_DATABASE_URL` when it is set.
///
/// # Errors
///
/// Returns an error when the cluster, migrations, or pool construction fail.
pub async fn pg_harness() -> Result<PgHarness, BoxError> {
    if let Ok(url) = std::env::var(TEST_DATABASE_URL_VAR) {
        return external_harness(url).await;
    }

    let database = tokio::task::spawn_blocking(|| -> Result<TemporaryDatabase, BoxError> {
        let cluster = shared_cluster()?;
        cluster.ensure_template_exists(TEMPLATE_DB, apply_migrations)?;
        let name = format!("schemaflow_{}", Uuid::new_v4().simple());
        cluster.temporary_database(&name, TEMPLATE_DB)
    })
    .await??;
    let url = database.url().to_owned();
    build_harness(&url, Isolation::Database { _database: database })
}

async fn external_harness(url: String) -> Result<PgHarness, BoxError> {
    let serial = SERIAL.lock().await;
    let migrate_url = url.clone();
    tokio::task::spawn_blocking(move || {
        MIGRATED
            .get_or_try_init(|| apply_migrations(&migrate_url))
            .map(|_| ())
    })
    .await??;
    build_harness(&url, Isolation::Serial { _lock: serial })
}

fn build_harness(url: &str, isolation: Isolation) -> Result<PgHarness, BoxError> {
    let config =
        PostgresConfig::from_lookup(|var| (var == DATABASE_URL_VAR).then(|| url.to_owned()))?;
    let runner = PostgresTransactionRunner::new(config.build_pool()?);
    Ok(PgHarness {
        service: runner.clone().task_service(Arc::new(DefaultClock)),
        runner,
        pipeline_id: unique_pipeline_id()?,
        _isolation: isolation,
    })
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url)?;
    conn.batch_execute(CREATE_TASK_TABLES_SQL)?;
    Ok(())
}

fn unique_pipeline_id() -> Result<PipelineId, BoxError> {
    let raw = i64::try_from(Uuid::new_v4().as_u128() >> 66)?;
    Ok(PipelineId::new(raw))
}
