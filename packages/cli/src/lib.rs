// ABOUTME: Library half of the Negaihoshi command line tools
// ABOUTME: Exposes migrator configuration, the migration runner, and terminal reporting

pub mod config;
pub mod migrate;
pub mod report;


pub use config::{ConfigError, KeySource, MigratorConfig, DEFAULT_ENCRYPTION_KEY};
pub use migrate::run_migration;
