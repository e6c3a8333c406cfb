// ABOUTME: Configuration and environment variable helpers for Negaihoshi
// ABOUTME: Shared env var names plus typed lookups with logged fallbacks

pub mod constants;

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Read an environment variable, treating empty values as unset
pub fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Read an environment variable or fall back to `default`
pub fn env_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when it is unset or invalid.
/// Invalid values are logged so misconfiguration does not go unnoticed.
pub fn parse_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "Invalid value '{}' for {}, using default {}",
                    raw, name, default
                );
                default
            }
        },
        None => default,
    }
}
