//! Persistence store for users, chats, messages and chat events.
//!
//! Async SQLite access through SQLx. Every operation acquires the
//! store-wide gate mutex for its full duration, so the rest of the server
//! can treat the store as a sequential oracle; callers never synchronise
//! further. Multi-statement operations (private-chat creation, member
//! removal plus its LEFT event) stay atomic with respect to other store
//! callers because the gate is held across all of their statements.

mod chats;
mod messages;
mod users;

pub use chats::{ChatEvent, ChatRepository, ChatSummary, PrivateChat};
pub use messages::MessageRepository;
pub use users::UserRepository;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Store errors. Every store failure crosses the component boundary as a
/// value; handlers map it to the generic `ERROR` reply.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Store handle: connection pool plus the store-wide gate.
pub struct Store {
    pool: SqlitePool,
    gate: Mutex<()>,
}

impl Store {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open the store, running migrations if needed.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let pool = if path == ":memory:" {
            // In-memory database - file::memory: with shared cache for
            // connection pool compatibility.
            let options = SqliteConnectOptions::new()
                .filename("file::memory:")
                .shared_cache(true)
                .create_if_missing(true);

            Self::pool_options().connect_with(options).await?
        } else {
            // File-based database; create the parent directory if needed.
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            Self::pool_options().connect_with(options).await?
        };

        info!(path = %path, "Store connected");

        Self::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            gate: Mutex::new(()),
        })
    }

    fn pool_options() -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(Some(Self::IDLE_TIMEOUT))
            .test_before_acquire(true)
    }

    /// Run embedded migrations. The schema is created in one shot and gated
    /// on the presence of the users table.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        let initialized = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='users')",
        )
        .fetch_one(pool)
        .await
        .unwrap_or(false);

        if initialized {
            info!("Store already initialized");
            return Ok(());
        }

        for statement in include_str!("../../migrations/001_init.sql").split(';') {
            let sql: Vec<&str> = statement
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("--"))
                .collect();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(&sql.join("\n")).execute(pool).await?;
        }

        info!("Store migrations applied (001_init)");
        Ok(())
    }

    /// Get user repository.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    /// Get chat repository.
    pub fn chats(&self) -> ChatRepository<'_> {
        ChatRepository::new(self)
    }

    /// Get message repository.
    pub fn messages(&self) -> MessageRepository<'_> {
        MessageRepository::new(self)
    }

    /// Truncate all six tables. Admin RESET only.
    pub async fn delete_everything(&self) -> Result<(), StoreError> {
        let _gate = self.gate.lock().await;
        for table in [
            "users",
            "chats",
            "chat_members",
            "messages",
            "user_deleted_messages",
            "chat_events",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::open_temp_store;

    #[tokio::test]
    async fn delete_everything_truncates_all_tables() {
        let (_dir, store) = open_temp_store().await;

        assert!(store.users().register("alice", "h1").await.unwrap());
        assert!(store.users().register("bob", "h2").await.unwrap());
        let alice = store.users().id_by_name("alice").await.unwrap().unwrap();
        let bob = store.users().id_by_name("bob").await.unwrap().unwrap();
        let chat = match store.chats().create_private(alice, bob).await.unwrap() {
            super::PrivateChat::Created(id) => id,
            super::PrivateChat::Exists(id) => id,
        };
        store.messages().store(chat, alice, "hi").await.unwrap();

        store.delete_everything().await.unwrap();

        assert_eq!(store.users().id_by_name("alice").await.unwrap(), None);
        assert_eq!(store.chats().list_for_user(alice).await.unwrap(), vec![]);
        assert_eq!(store.messages().history(chat, alice).await.unwrap(), vec![]);
        // The username is free again.
        assert!(store.users().register("alice", "h3").await.unwrap());
    }
}
