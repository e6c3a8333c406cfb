// ABOUTME: Data layer and persistence for Negaihoshi
// ABOUTME: Shared storage error type, SQLite pool setup, and embedded schema migrations

pub mod pool;

pub use pool::{connect, connect_in_memory, run_migrations, StorageConfig, MIGRATOR};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error("User not found")]
    NotFound,
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
