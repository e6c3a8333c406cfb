// ABOUTME: Password encryption, user accounts, and password migration for Negaihoshi
// ABOUTME: Provides the AES-GCM password store, user storage, and the legacy password migrator

pub mod encryption;
pub mod migration;
pub mod users;

// Re-export main types for convenience
pub use encryption::{CryptoError, PasswordCrypto};
pub use migration::{FailureStage, MigrationOutcome, PasswordMigrator, RowOutcome, UserStore};
pub use users::{NewUser, ProfileUpdate, User, UserRow, UserStorage};
