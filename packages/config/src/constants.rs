// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Negaihoshi

// Database Configuration
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const DB_BUSY_TIMEOUT_SECS: &str = "DB_BUSY_TIMEOUT_SECS";

// Password Encryption
pub const PASSWORD_ENCRYPTION_KEY: &str = "PASSWORD_ENCRYPTION_KEY";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";

// Defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://negaihoshi.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "warn";
