// ABOUTME: Tests for user storage layer
// ABOUTME: Verifies password encryption on sign-up, credential checks, and migration against SQLite

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use negaihoshi_storage::{connect_in_memory, StorageError};
    use sqlx::SqlitePool;

    use super::super::storage::UserStorage;
    use super::super::types::{NewUser, ProfileUpdate};
    use crate::encryption::PasswordCrypto;
    use crate::migration::{PasswordMigrator, UserStore};

    const KEY: &[u8] = b"negaihoshi-password-encryption-key-32bytes";

    async fn setup_test_db() -> (SqlitePool, UserStorage) {
        let pool = connect_in_memory().await.unwrap();
        let storage = UserStorage::new(pool.clone(), Arc::new(PasswordCrypto::new(KEY)));
        (pool, storage)
    }

    fn new_user(username: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn insert_legacy_user(pool: &SqlitePool, username: &str, password: &str) {
        sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
            .bind(username)
            .bind(format!("{}@example.com", username))
            .bind(password)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn raw_password(pool: &SqlitePool, username: &str) -> String {
        sqlx::query_scalar("SELECT password FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_password_is_encrypted_on_create() {
        let (pool, storage) = setup_test_db().await;

        let user = storage
            .create_user(new_user("hoshi", "hoshi@example.com", "password1"))
            .await
            .unwrap();

        let stored = raw_password(&pool, "hoshi").await;
        assert_ne!(stored, "password1", "Password should be encrypted in DB");
        assert_eq!(stored, user.password);

        let crypto = PasswordCrypto::new(KEY);
        assert_eq!(crypto.decrypt(&stored).unwrap(), "password1");
    }

    #[tokio::test]
    async fn test_lookup_by_id_email_and_username() {
        let (_pool, storage) = setup_test_db().await;

        let created = storage
            .create_user(new_user("hoshi", "hoshi@example.com", "password1"))
            .await
            .unwrap();

        let by_id = storage.get_user(created.id).await.unwrap();
        let by_email = storage.find_by_email("hoshi@example.com").await.unwrap();
        let by_username = storage.find_by_username("hoshi").await.unwrap();

        assert_eq!(by_id.username, "hoshi");
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_username.email, "hoshi@example.com");
        assert_eq!(by_id.nickname, "");
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let (_pool, storage) = setup_test_db().await;

        assert!(matches!(
            storage.get_user(42).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            storage.find_by_email("nobody@example.com").await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            storage.find_by_username("nobody").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let (_pool, storage) = setup_test_db().await;

        storage
            .create_user(new_user("hoshi", "hoshi@example.com", "password1"))
            .await
            .unwrap();

        let result = storage
            .create_user(new_user("hoshi", "other@example.com", "password1"))
            .await;
        assert!(matches!(result, Err(StorageError::DuplicateUsername(name)) if name == "hoshi"));

        let result = storage
            .create_user(new_user("other", "hoshi@example.com", "password1"))
            .await;
        assert!(
            matches!(result, Err(StorageError::DuplicateEmail(email)) if email == "hoshi@example.com")
        );
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let (_pool, storage) = setup_test_db().await;

        let created = storage
            .create_user(new_user("hoshi", "hoshi@example.com", "password1"))
            .await
            .unwrap();

        let by_email = storage
            .verify_credentials("hoshi@example.com", "password1")
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));

        let by_username = storage
            .verify_credentials("hoshi", "password1")
            .await
            .unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(created.id));

        // Wrong password and unknown account look the same to the caller
        assert!(storage
            .verify_credentials("hoshi", "password2")
            .await
            .unwrap()
            .is_none());
        assert!(storage
            .verify_credentials("nobody", "password1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_verify_credentials_rejects_unmigrated_password() {
        let (pool, storage) = setup_test_db().await;
        insert_legacy_user(&pool, "legacy", "password1").await;

        assert!(storage
            .verify_credentials("legacy", "password1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_verify_credentials_prefers_email_over_username() {
        let (_pool, storage) = setup_test_db().await;

        // Older account whose username is another account's email
        storage
            .create_user(new_user("alice@example.com", "mallory@example.com", "mallory-pass"))
            .await
            .unwrap();
        let alice = storage
            .create_user(new_user("alice", "alice@example.com", "alice-pass"))
            .await
            .unwrap();

        let verified = storage
            .verify_credentials("alice@example.com", "alice-pass")
            .await
            .unwrap();
        assert_eq!(verified.map(|u| u.id), Some(alice.id));

        // Username lookup still applies when no email matches
        let by_username = storage
            .verify_credentials("alice", "alice-pass")
            .await
            .unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(alice.id));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (_pool, storage) = setup_test_db().await;

        let created = storage
            .create_user(new_user("hoshi", "hoshi@example.com", "password1"))
            .await
            .unwrap();

        let profile = ProfileUpdate {
            nickname: "Hoshi".to_string(),
            bio: "stargazer".to_string(),
            website: "https://example.com".to_string(),
            ..Default::default()
        };

        let updated = storage.update_profile(created.id, profile).await.unwrap();

        assert_eq!(updated.nickname, "Hoshi");
        assert_eq!(updated.bio, "stargazer");
        assert_eq!(updated.website, "https://example.com");
        assert_eq!(updated.phone, "");
        assert_eq!(updated.password, created.password);

        assert!(matches!(
            storage.update_profile(999, ProfileUpdate::default()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_users_in_id_order() {
        let (pool, storage) = setup_test_db().await;
        insert_legacy_user(&pool, "first", "one").await;
        insert_legacy_user(&pool, "second", "two").await;

        let rows = storage.fetch_all_users().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].username, "first");
        assert_eq!(rows[0].password, "one");
        assert_eq!(rows[1].email, "second@example.com");
        assert!(rows[0].id < rows[1].id);
    }

    #[tokio::test]
    async fn test_update_user_password_missing_row() {
        let (_pool, storage) = setup_test_db().await;

        assert!(matches!(
            storage.update_user_password(7, "value").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_migration_against_sqlite() {
        let (pool, storage) = setup_test_db().await;
        let already_encrypted = PasswordCrypto::new(KEY).encrypt("hello world").unwrap();

        insert_legacy_user(&pool, "plain", "password1").await;
        insert_legacy_user(&pool, "migrated", &already_encrypted).await;
        insert_legacy_user(&pool, "legacy", "legacy-hash-0f3a9c").await;

        let migrator = PasswordMigrator::new(storage, Arc::new(PasswordCrypto::new(KEY)));
        let outcome = migrator.run().await.unwrap();

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.migrated, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.failed, 0);

        // Untouched row keeps its exact record
        assert_eq!(raw_password(&pool, "migrated").await, already_encrypted);

        // Migrated rows now pass the login check with their old secret
        let storage = migrator.store();
        assert!(storage
            .verify_credentials("plain", "password1")
            .await
            .unwrap()
            .is_some());
        assert!(storage
            .verify_credentials("legacy", "legacy-hash-0f3a9c")
            .await
            .unwrap()
            .is_some());

        // A second pass finds nothing left to do
        let rerun = migrator.run().await.unwrap();
        assert_eq!(rerun.skipped, 3);
        assert_eq!(rerun.migrated, 0);
    }
}
