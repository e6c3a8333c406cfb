// ABOUTME: User type definitions
// ABOUTME: Structures for accounts, sign-up input, profile updates, and migration rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Stored password field; an encrypted record once migrated
    #[serde(skip_serializing)]
    pub password: String,
    pub nickname: String,
    pub bio: String,
    pub avatar: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up input. The password is plaintext here and encrypted before insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub nickname: String,
    pub bio: String,
    pub avatar: String,
    pub phone: String,
    pub location: String,
    pub website: String,
}

/// Minimal projection of a user consumed by the password migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
}
