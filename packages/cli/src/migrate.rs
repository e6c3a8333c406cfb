// ABOUTME: Wires configuration, storage and encryption together for one migration run
// ABOUTME: Opens the database, runs the password migrator, and closes the pool

use std::sync::Arc;

use anyhow::Context;
use negaihoshi_security::{
    MigrationOutcome, PasswordCrypto, PasswordMigrator, RowOutcome, UserRow, UserStorage,
};
use negaihoshi_storage::connect;
use tracing::info;

use crate::config::MigratorConfig;

/// Encrypt every legacy password in the configured database.
/// `on_row` receives each user row with its outcome as the run progresses.
pub async fn run_migration<F>(config: &MigratorConfig, on_row: F) -> anyhow::Result<MigrationOutcome>
where
    F: FnMut(&UserRow, &RowOutcome),
{
    config.validate()?;

    let pool = connect(&config.storage)
        .await
        .with_context(|| format!("Failed to open database {}", config.storage.database_url))?;
    info!("Connected to {}", config.storage.database_url);

    let crypto = Arc::new(PasswordCrypto::new(&config.encryption_key));
    let storage = UserStorage::new(pool.clone(), crypto.clone());
    let migrator = PasswordMigrator::new(storage, crypto);

    let result = migrator
        .run_with_progress(on_row)
        .await
        .context("Failed to list users");

    pool.close().await;

    result
}
