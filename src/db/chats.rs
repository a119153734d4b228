//! Chat repository: chats, membership and chat events.

use super::{Store, StoreError};
use chatter_proto::format_wire_time;

/// Outcome of a private-chat creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateChat {
    /// A new chat was created with both memberships in place.
    Created(i64),
    /// The pair already shares a private chat.
    Exists(i64),
}

/// One row of a user's chat listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub chat_id: i64,
    pub is_group: bool,
    /// Empty for private chats.
    pub name: String,
}

/// A durable chat event, timestamp already in wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub ts: String,
    pub user_id: i64,
    pub event_type: String,
}

/// Repository for chat operations.
pub struct ChatRepository<'a> {
    store: &'a Store,
}

impl<'a> ChatRepository<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Find an existing private chat whose membership contains both users.
    #[allow(dead_code)] // Creation goes through create_private; kept for callers that only probe.
    pub async fn find_private(&self, u1: i64, u2: i64) -> Result<Option<i64>, StoreError> {
        let _gate = self.store.gate.lock().await;
        self.find_private_locked(u1, u2).await
    }

    async fn find_private_locked(&self, u1: i64, u2: i64) -> Result<Option<i64>, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT c.chat_id
            FROM chats c
            JOIN chat_members m1 ON c.chat_id = m1.chat_id AND m1.user_id = ?
            JOIN chat_members m2 ON c.chat_id = m2.chat_id AND m2.user_id = ?
            WHERE c.is_group = 0
            GROUP BY c.chat_id
            "#,
        )
        .bind(u1)
        .bind(u2)
        .fetch_optional(&self.store.pool)
        .await?;
        Ok(id)
    }

    /// Create a private chat for the pair unless one already exists.
    ///
    /// Lookup, chat insert and both memberships run under a single gate
    /// hold, so two racing creations cannot both pass the lookup.
    pub async fn create_private(&self, u1: i64, u2: i64) -> Result<PrivateChat, StoreError> {
        let _gate = self.store.gate.lock().await;

        if let Some(existing) = self.find_private_locked(u1, u2).await? {
            return Ok(PrivateChat::Exists(existing));
        }

        let chat_id = sqlx::query("INSERT INTO chats (is_group, chat_name) VALUES (0, NULL)")
            .execute(&self.store.pool)
            .await?
            .last_insert_rowid();

        for user in [u1, u2] {
            self.add_member_locked(chat_id, user).await?;
        }

        Ok(PrivateChat::Created(chat_id))
    }

    /// Create a group chat and insert every listed member.
    pub async fn create_group(&self, name: &str, members: &[i64]) -> Result<i64, StoreError> {
        let _gate = self.store.gate.lock().await;

        let chat_id = sqlx::query("INSERT INTO chats (is_group, chat_name) VALUES (1, ?)")
            .bind(name)
            .execute(&self.store.pool)
            .await?
            .last_insert_rowid();

        for &user in members {
            self.add_member_locked(chat_id, user).await?;
        }

        Ok(chat_id)
    }

    /// Add a member. Idempotent under conflict.
    #[allow(dead_code)] // Chat creation inserts its own members; kept for later invites.
    pub async fn add_member(&self, chat_id: i64, user_id: i64) -> Result<(), StoreError> {
        let _gate = self.store.gate.lock().await;
        self.add_member_locked(chat_id, user_id).await
    }

    async fn add_member_locked(&self, chat_id: i64, user_id: i64) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO chat_members (chat_id, user_id) VALUES (?, ?)")
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.store.pool)
            .await?;
        Ok(())
    }

    pub async fn is_member(&self, chat_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let _gate = self.store.gate.lock().await;

        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM chat_members WHERE chat_id = ? AND user_id = ?",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.store.pool)
        .await?;
        Ok(found.is_some())
    }

    /// Usernames of all members, user_id order.
    pub async fn members(&self, chat_id: i64) -> Result<Vec<String>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let members = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.username
            FROM users u
            JOIN chat_members m ON u.user_id = m.user_id
            WHERE m.chat_id = ?
            ORDER BY u.user_id
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.store.pool)
        .await?;
        Ok(members)
    }

    /// Every chat the user belongs to, chat_id order.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<ChatSummary>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let rows = sqlx::query_as::<_, (i64, bool, Option<String>)>(
            r#"
            SELECT c.chat_id, c.is_group, c.chat_name
            FROM chats c
            JOIN chat_members m ON c.chat_id = m.chat_id
            WHERE m.user_id = ?
            ORDER BY c.chat_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.store.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(chat_id, is_group, name)| ChatSummary {
                chat_id,
                is_group,
                name: name.unwrap_or_default(),
            })
            .collect())
    }

    /// Remove a member and append the LEFT event under the same gate hold,
    /// so the two effects are observable together. Returns the wire
    /// timestamp recorded on the event.
    pub async fn remove_member(&self, chat_id: i64, user_id: i64) -> Result<String, StoreError> {
        let _gate = self.store.gate.lock().await;

        sqlx::query("DELETE FROM chat_members WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.store.pool)
            .await?;

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO chat_events (chat_id, user_id, event_type, event_ts) VALUES (?, ?, 'LEFT', ?)",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(now)
        .execute(&self.store.pool)
        .await?;

        Ok(format_wire_time(now))
    }

    /// Chat events in event_ts order, timestamps formatted at read time.
    pub async fn events(&self, chat_id: i64) -> Result<Vec<ChatEvent>, StoreError> {
        let _gate = self.store.gate.lock().await;

        let rows = sqlx::query_as::<_, (i64, i64, String)>(
            "SELECT event_ts, user_id, event_type FROM chat_events WHERE chat_id = ? ORDER BY event_ts",
        )
        .bind(chat_id)
        .fetch_all(&self.store.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(ts, user_id, event_type)| ChatEvent {
                ts: format_wire_time(ts),
                user_id,
                event_type,
            })
            .collect())
    }
}
