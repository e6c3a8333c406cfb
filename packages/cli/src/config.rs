// ABOUTME: Configuration for the password migrator
// ABOUTME: Resolves database settings and the encryption key from env vars and CLI overrides

use negaihoshi_config::constants::PASSWORD_ENCRYPTION_KEY;
use negaihoshi_config::env_var;
use negaihoshi_storage::StorageConfig;
use thiserror::Error;

/// Key used by deployments that never configured one. Records written by those
/// deployments can only be read with it, so it remains the fallback.
pub const DEFAULT_ENCRYPTION_KEY: &str = "negaihoshi-password-encryption-key-32bytes";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported database URL: {0} (expected a sqlite: URL)")]
    UnsupportedDatabase(String),
    #[error("Encryption key must not be empty")]
    EmptyEncryptionKey,
}

/// Where the encryption key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    CommandLine,
    Environment,
    BuiltIn,
}

#[derive(Debug, Clone)]
pub struct MigratorConfig {
    pub storage: StorageConfig,
    pub encryption_key: Vec<u8>,
    pub key_source: KeySource,
}

impl MigratorConfig {
    pub fn from_env() -> Self {
        let (encryption_key, key_source) = match env_var(PASSWORD_ENCRYPTION_KEY) {
            Some(key) => (key.into_bytes(), KeySource::Environment),
            None => (
                DEFAULT_ENCRYPTION_KEY.as_bytes().to_vec(),
                KeySource::BuiltIn,
            ),
        };

        // Only migrate a database that already exists
        Self {
            storage: StorageConfig::from_env().with_create_if_missing(false),
            encryption_key,
            key_source,
        }
    }

    /// Apply command line values on top of the environment
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        encryption_key: Option<String>,
    ) -> Self {
        if let Some(url) = database_url {
            self.storage = self.storage.with_database_url(url);
        }
        if let Some(key) = encryption_key {
            self.encryption_key = key.into_bytes();
            self.key_source = KeySource::CommandLine;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.storage.database_url.starts_with("sqlite:") {
            return Err(ConfigError::UnsupportedDatabase(
                self.storage.database_url.clone(),
            ));
        }
        if self.encryption_key.is_empty() {
            return Err(ConfigError::EmptyEncryptionKey);
        }
        Ok(())
    }
}
