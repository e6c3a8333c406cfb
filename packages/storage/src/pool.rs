// ABOUTME: SQLite connection pool construction and schema migrations
// ABOUTME: Reads database settings from the environment and applies embedded migrations

use std::str::FromStr;
use std::time::Duration;

use negaihoshi_config::constants::{
    DATABASE_URL, DB_BUSY_TIMEOUT_SECS, DB_MAX_CONNECTIONS, DEFAULT_BUSY_TIMEOUT_SECS,
    DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS,
};
use negaihoshi_config::{env_or, parse_env_or};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{StorageError, StorageResult};

/// Embedded schema migrations for the users table
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
    /// Create the database file when it does not exist yet
    pub create_if_missing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_seconds: DEFAULT_BUSY_TIMEOUT_SECS,
            create_if_missing: true,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env_or(DATABASE_URL, DEFAULT_DATABASE_URL),
            max_connections: parse_env_or(DB_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS).max(1),
            busy_timeout_seconds: parse_env_or(DB_BUSY_TIMEOUT_SECS, DEFAULT_BUSY_TIMEOUT_SECS),
            create_if_missing: true,
        }
    }

    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }
}

/// Open a pool for the configured database and bring the schema up to date
pub async fn connect(config: &StorageConfig) -> StorageResult<SqlitePool> {
    debug!("Connecting to database: {}", config.database_url);

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(StorageError::Sqlx)?
        .create_if_missing(config.create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    info!("Database connection established");

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied.
/// Every connection to `:memory:` is its own database, hence the pool size of one.
pub async fn connect_in_memory() -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(":memory:")
        .map_err(StorageError::Sqlx)?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    MIGRATOR.run(pool).await.map_err(StorageError::Migration)?;
    debug!("Database migrations completed");
    Ok(())
}
