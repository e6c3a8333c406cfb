// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles account CRUD, credential checks, and password updates for migration

use std::sync::Arc;

use async_trait::async_trait;
use negaihoshi_storage::StorageError;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use super::types::{NewUser, ProfileUpdate, User, UserRow};
use crate::encryption::PasswordCrypto;
use crate::migration::UserStore;

const SELECT_USER: &str = r#"
    SELECT id, username, email, password, nickname, bio, avatar, phone, location, website,
           created_at, updated_at
    FROM users
"#;

pub struct UserStorage {
    pool: SqlitePool,
    crypto: Arc<PasswordCrypto>,
}

impl UserStorage {
    pub fn new(pool: SqlitePool, crypto: Arc<PasswordCrypto>) -> Self {
        Self { pool, crypto }
    }

    /// Register a new account. The password is encrypted before it reaches the database.
    pub async fn create_user(&self, input: NewUser) -> Result<User, StorageError> {
        debug!("Creating user: {}", input.username);

        let encrypted = self.crypto.encrypt(&input.password).map_err(|e| {
            StorageError::Encryption(format!("Failed to encrypt password: {}", e))
        })?;

        let result = sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
            .bind(&input.username)
            .bind(&input.email)
            .bind(&encrypted)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &input))?;

        self.get_user(result.last_insert_rowid()).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USER))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or(StorageError::NotFound)?;

        row_to_user(&row)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, StorageError> {
        debug!("Fetching user by email");

        let row = sqlx::query(&format!("{} WHERE email = ?", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or(StorageError::NotFound)?;

        row_to_user(&row)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, StorageError> {
        debug!("Fetching user by username: {}", username);

        let row = sqlx::query(&format!("{} WHERE username = ?", SELECT_USER))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or(StorageError::NotFound)?;

        row_to_user(&row)
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        profile: ProfileUpdate,
    ) -> Result<User, StorageError> {
        debug!("Updating profile for user: {}", user_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET nickname = ?, bio = ?, avatar = ?, phone = ?, location = ?, website = ?,
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&profile.nickname)
        .bind(&profile.bio)
        .bind(&profile.avatar)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USER))
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let user = row_to_user(&row)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    /// Check a login (email or username) and password.
    /// Unknown accounts and wrong passwords both come back as `Ok(None)`.
    pub async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<User>, StorageError> {
        // Email matches take precedence over username matches
        let row = match self.fetch_login_row("email", login).await? {
            Some(row) => Some(row),
            None => self.fetch_login_row("username", login).await?,
        };

        let user = match row {
            Some(row) => row_to_user(&row)?,
            None => {
                debug!("Credential check rejected");
                return Ok(None);
            }
        };

        if self.crypto.verify_password(password, &user.password) {
            Ok(Some(user))
        } else {
            debug!("Credential check rejected");
            Ok(None)
        }
    }

    async fn fetch_login_row(
        &self,
        column: &'static str,
        login: &str,
    ) -> Result<Option<SqliteRow>, StorageError> {
        sqlx::query(&format!("{} WHERE {} = ?", SELECT_USER, column))
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }
}

#[async_trait]
impl UserStore for UserStorage {
    async fn fetch_all_users(&self) -> Result<Vec<UserRow>, StorageError> {
        debug!("Fetching all users for password migration");

        let rows = sqlx::query("SELECT id, username, password, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| -> Result<UserRow, StorageError> {
                Ok(UserRow {
                    id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    password: row.try_get("password")?,
                    email: row.try_get("email")?,
                })
            })
            .collect()
    }

    async fn update_user_password(
        &self,
        user_id: i64,
        encrypted_password: &str,
    ) -> Result<(), StorageError> {
        debug!("Updating stored password for user: {}", user_id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(encrypted_password)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error, input: &NewUser) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.username") {
                return StorageError::DuplicateUsername(input.username.clone());
            }
            if message.contains("users.email") {
                return StorageError::DuplicateEmail(input.email.clone());
            }
        }
    }
    StorageError::Sqlx(err)
}

fn row_to_user(row: &SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        nickname: row.try_get("nickname")?,
        bio: row.try_get("bio")?,
        avatar: row.try_get("avatar")?,
        phone: row.try_get("phone")?,
        location: row.try_get("location")?,
        website: row.try_get("website")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
