//! SQLite connection pool
//!
//! One sqlx pool is opened at startup and handed to the observation store.
//! Pragmas are applied per connection through `SqliteConnectOptions`, and the
//! schema comes from the workspace `migrations/` directory.

use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;

const MEMORY_URL: &str = "sqlite::memory:";

/// Failures opening or migrating the observation database
#[derive(Debug, thiserror::Error)]
pub enum AsyncDatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool settings for the observation database
#[derive(Debug, Clone)]
pub struct AsyncDatabaseConfig {
    /// sqlx URL, `sqlite:<path>` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Journal mode set on every new connection
    pub journal: SqliteJournalMode,
    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for AsyncDatabaseConfig {
    fn default() -> Self {
        Self::file("weather.sqlite")
    }
}

impl AsyncDatabaseConfig {
    /// Private in-memory database
    ///
    /// Every connection to `:memory:` sees its own database, so the pool is
    /// pinned to one connection.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: MEMORY_URL.to_string(),
            max_connections: 1,
            min_connections: 1,
            journal: SqliteJournalMode::Memory,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Database file at `path`, created on first open
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            url: format!("sqlite:{}", path.as_ref().display()),
            max_connections: 5,
            min_connections: 1,
            journal: SqliteJournalMode::Wal,
            busy_timeout: Duration::from_secs(5),
        }
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .journal_mode(self.journal)
            .busy_timeout(self.busy_timeout);

        // synchronous=NORMAL is only safe under WAL
        Ok(if matches!(self.journal, SqliteJournalMode::Wal) {
            options.synchronous(SqliteSynchronous::Normal)
        } else {
            options
        })
    }
}

impl From<&DatabaseConfig> for AsyncDatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            ..Self::file(&config.path)
        }
    }
}

/// Shared handle on the observation database
#[derive(Debug, Clone)]
pub struct AsyncDatabase {
    pool: SqlitePool,
}

impl AsyncDatabase {
    /// Open the pool described by `config`
    ///
    /// # Errors
    ///
    /// Fails on a malformed URL or when the first connection cannot be made.
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn new(config: &AsyncDatabaseConfig) -> Result<Self, AsyncDatabaseError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(config.connect_options()?)
            .await?;

        info!(
            max_connections = config.max_connections,
            journal = ?config.journal,
            "Observation database opened"
        );
        Ok(Self { pool })
    }

    /// Fresh in-memory database, used by tests
    pub async fn in_memory() -> Result<Self, AsyncDatabaseError> {
        Self::new(&AsyncDatabaseConfig::in_memory()).await
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending migrations from `migrations/`
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), AsyncDatabaseError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Observation schema up to date");
        Ok(())
    }

    /// Wait for checked-out connections and close the pool
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Observation database closed");
    }
}
