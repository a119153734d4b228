//! User repository: registration, authentication, name lookups.
//!
//! The wire carries a client-produced password hash; the store compares it
//! verbatim and never sees a cleartext password.

use super::{Store, StoreError};

/// Repository for user operations.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new user. Returns false when the username is already taken;
    /// the UNIQUE constraint makes the check-and-insert atomic.
    pub async fn register(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        let _gate = self.store.gate.lock().await;

        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.store.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Exact match on username and password hash.
    pub async fn authenticate(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<i64>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let id = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM users WHERE username = ? AND password_hash = ?",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.store.pool)
        .await?;
        Ok(id)
    }

    pub async fn id_by_name(&self, username: &str) -> Result<Option<i64>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.store.pool)
            .await?;
        Ok(id)
    }

    pub async fn username(&self, user_id: i64) -> Result<Option<String>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let name = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.store.pool)
            .await?;
        Ok(name)
    }
}
