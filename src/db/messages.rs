//! Message repository: storage, visible history, deletion marks.

use super::{Store, StoreError};
use chatter_proto::{format_wire_time, MessageRow};

/// Repository for message operations.
pub struct MessageRepository<'a> {
    store: &'a Store,
}

impl<'a> MessageRepository<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Store a message; the server assigns created_at and the id.
    pub async fn store(
        &self,
        chat_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<i64, StoreError> {
        let _gate = self.store.gate.lock().await;

        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO messages (chat_id, sender_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(sender_id)
        .bind(content)
        .bind(now)
        .execute(&self.store.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Messages of a chat visible to the given user, oldest first.
    ///
    /// A message is visible iff it is not globally deleted and the user has
    /// no per-user deletion mark for it; the LEFT JOIN keeps messages with
    /// no mark.
    pub async fn history(&self, chat_id: i64, user_id: i64) -> Result<Vec<MessageRow>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let rows = sqlx::query_as::<_, (i64, i64, String, String)>(
            r#"
            SELECT m.msg_id, m.created_at, u.username, m.content
            FROM messages m
            JOIN users u ON m.sender_id = u.user_id
            LEFT JOIN user_deleted_messages d ON d.msg_id = m.msg_id AND d.user_id = ?
            WHERE m.chat_id = ? AND m.deleted = 0 AND d.msg_id IS NULL
            ORDER BY m.created_at, m.msg_id
            "#,
        )
        .bind(user_id)
        .bind(chat_id)
        .fetch_all(&self.store.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(msg_id, ts, sender, content)| MessageRow {
                msg_id,
                ts: format_wire_time(ts),
                sender,
                content,
            })
            .collect())
    }

    /// Hide a message from one user. No-op when already hidden.
    pub async fn delete_for_user(&self, msg_id: i64, user_id: i64) -> Result<(), StoreError> {
        let _gate = self.store.gate.lock().await;

        sqlx::query("INSERT OR IGNORE INTO user_deleted_messages (msg_id, user_id) VALUES (?, ?)")
            .bind(msg_id)
            .bind(user_id)
            .execute(&self.store.pool)
            .await?;
        Ok(())
    }

    /// Mark a message deleted for every viewer. The row itself stays.
    pub async fn delete_global(&self, msg_id: i64) -> Result<(), StoreError> {
        let _gate = self.store.gate.lock().await;

        sqlx::query("UPDATE messages SET deleted = 1 WHERE msg_id = ?")
            .bind(msg_id)
            .execute(&self.store.pool)
            .await?;
        Ok(())
    }

    pub async fn sender_of(&self, msg_id: i64) -> Result<Option<i64>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let id = sqlx::query_scalar::<_, i64>("SELECT sender_id FROM messages WHERE msg_id = ?")
            .bind(msg_id)
            .fetch_optional(&self.store.pool)
            .await?;
        Ok(id)
    }

    pub async fn chat_of(&self, msg_id: i64) -> Result<Option<i64>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let id = sqlx::query_scalar::<_, i64>("SELECT chat_id FROM messages WHERE msg_id = ?")
            .bind(msg_id)
            .fetch_optional(&self.store.pool)
            .await?;
        Ok(id)
    }
}
