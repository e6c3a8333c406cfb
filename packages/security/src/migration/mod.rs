// ABOUTME: One-shot migration that encrypts legacy stored passwords in place
// ABOUTME: Walks every user row, skips values that already look encrypted, and tallies outcomes
//
// Each row is an independent unit of work: there is no transaction spanning
// rows, and a failure on one row is logged and counted without stopping the
// batch. An interrupted run is safe to repeat because rows that were already
// migrated are skipped by the same length check on the next pass.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use negaihoshi_storage::StorageError;
use tracing::{error, info};

use crate::encryption::PasswordCrypto;
use crate::users::UserRow;

/// Storage operations the migration needs from the user table
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn fetch_all_users(&self) -> Result<Vec<UserRow>, StorageError>;

    async fn update_user_password(
        &self,
        user_id: i64,
        encrypted_password: &str,
    ) -> Result<(), StorageError>;
}

/// Step at which a row failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Encrypt,
    Persist,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Encrypt => write!(f, "encrypt"),
            FailureStage::Persist => write!(f, "persist"),
        }
    }
}

/// Terminal state of a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Stored value already looks encrypted; left untouched
    Skipped,
    Migrated,
    Failed { stage: FailureStage, reason: String },
}

/// Tally for one migration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub total: usize,
    pub skipped: usize,
    pub migrated: usize,
    pub failed: usize,
}

impl MigrationOutcome {
    fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Migrated => self.migrated += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status for the run: 1 if any row failed
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

pub struct PasswordMigrator<S> {
    store: S,
    crypto: Arc<PasswordCrypto>,
}

impl<S: UserStore> PasswordMigrator<S> {
    pub fn new(store: S, crypto: Arc<PasswordCrypto>) -> Self {
        Self { store, crypto }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&self) -> Result<MigrationOutcome, StorageError> {
        self.run_with_progress(|_, _| {}).await
    }

    /// Run the migration, calling `on_row` with each row and its outcome.
    /// Only a failure to list the users aborts the run.
    pub async fn run_with_progress<F>(&self, mut on_row: F) -> Result<MigrationOutcome, StorageError>
    where
        F: FnMut(&UserRow, &RowOutcome),
    {
        let users = self.store.fetch_all_users().await?;
        info!("Found {} users to check", users.len());

        let mut outcome = MigrationOutcome {
            total: users.len(),
            ..Default::default()
        };

        for user in &users {
            info!("Processing user: {} (ID: {})", user.username, user.id);

            let row_outcome = self.migrate_row(user).await;
            outcome.record(&row_outcome);
            on_row(user, &row_outcome);
        }

        info!(
            "Password migration finished: {} migrated, {} skipped, {} failed, {} total",
            outcome.migrated, outcome.skipped, outcome.failed, outcome.total
        );

        Ok(outcome)
    }

    async fn migrate_row(&self, user: &UserRow) -> RowOutcome {
        if PasswordCrypto::looks_encrypted(&user.password) {
            info!(
                "Password for user {} looks already encrypted, skipping",
                user.id
            );
            return RowOutcome::Skipped;
        }

        let encrypted = match self.crypto.encrypt(&user.password) {
            Ok(encrypted) => encrypted,
            Err(e) => {
                error!("Failed to encrypt password for user {}: {}", user.id, e);
                return RowOutcome::Failed {
                    stage: FailureStage::Encrypt,
                    reason: e.to_string(),
                };
            }
        };

        if let Err(e) = self.store.update_user_password(user.id, &encrypted).await {
            error!("Failed to store password for user {}: {}", user.id, e);
            return RowOutcome::Failed {
                stage: FailureStage::Persist,
                reason: e.to_string(),
            };
        }

        info!("Password for user {} encrypted", user.id);
        RowOutcome::Migrated
    }
}
