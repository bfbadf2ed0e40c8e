//! Connection settings for the `PostgreSQL` task store.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::time::Duration;
use thiserror::Error;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Environment variable holding the connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the maximum pool size.
pub const MAX_CONNECTIONS_VAR: &str = "SCHEMAFLOW_DB_MAX_CONNECTIONS";
/// Environment variable holding the connection timeout in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "SCHEMAFLOW_DB_CONNECT_TIMEOUT_SECS";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while reading settings or opening the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Settings for the task store connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    pub connect_timeout: Duration,
}

impl PostgresConfig {
    /// Creates settings for `database_url` with default pool limits.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or a limit does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or blank, or a limit
    /// is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let mut config = Self::new(database_url);
        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            config.max_connections = parse_positive(MAX_CONNECTIONS_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CONNECT_TIMEOUT_VAR) {
            let secs = parse_positive(CONNECT_TIMEOUT_VAR, &raw)?;
            config.connect_timeout = Duration::from_secs(u64::from(secs));
        }
        Ok(config)
    }

    /// Builds an r2d2 pool from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the initial connections cannot be
    /// established.
    pub fn build_pool(&self) -> Result<TaskPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.database_url);
        Ok(Pool::builder()
            .max_size(self.max_connections)
            .connection_timeout(self.connect_timeout)
            .build(manager)?)
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var,
        value: raw.to_owned(),
        reason,
    };
    let value = raw.trim().parse::<u32>().map_err(|err| invalid(err.to_string()))?;
    if value == 0 {
        return Err(invalid("must be greater than zero".to_owned()));
    }
    Ok(value)
}
