// ABOUTME: User management module
// ABOUTME: Provides types and storage for user accounts and their encrypted passwords

pub mod storage;
pub mod types;

#[cfg(test)]
mod storage_test;

pub use storage::UserStorage;
pub use types::*;
