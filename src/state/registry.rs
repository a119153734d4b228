//! Session registry: live connections, their users, their subscriptions.
//!
//! Purely in-memory and reconstructable from client reconnects; no crash
//! recovery. Each map locks independently, no two entry locks are held at
//! once, and no lock is ever held across I/O or store calls. Audiences are
//! snapshots: they are consistent at enumeration time and may go stale the
//! moment they are returned, so delivery must tolerate dead receivers.

use dashmap::DashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{:06}", self.0)
    }
}

/// Allocates connection ids.
#[derive(Default)]
pub(crate) struct ConnIdGen(AtomicU64);

impl ConnIdGen {
    pub fn next(&self) -> ConnId {
        ConnId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// A connection's push queue, drained by its single writer task.
type PushSender = mpsc::Sender<String>;

/// Bidirectional mappings between connections, users and chat
/// subscriptions.
#[derive(Default)]
pub struct Registry {
    /// Push queues of every live connection.
    senders: DashMap<ConnId, PushSender>,
    /// Entry exists iff the connection is authenticated.
    session_user: DashMap<ConnId, i64>,
    /// One user may hold multiple concurrent connections.
    user_conns: DashMap<i64, HashSet<ConnId>>,
    /// Connections currently interested in a chat's pushes.
    subscribers: DashMap<i64, HashSet<ConnId>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection's push queue.
    pub fn register_sender(&self, conn: ConnId, tx: PushSender) {
        self.senders.insert(conn, tx);
    }

    /// Bind the connection to an authenticated user. Rebinding moves the
    /// connection off its previous user.
    pub fn bind_user(&self, conn: ConnId, user_id: i64) {
        if let Some(previous) = self.session_user.insert(conn, user_id)
            && previous != user_id
        {
            self.remove_user_conn(previous, conn);
        }
        self.user_conns.entry(user_id).or_default().insert(conn);
    }

    fn remove_user_conn(&self, user_id: i64, conn: ConnId) {
        if let Some(mut conns) = self.user_conns.get_mut(&user_id) {
            conns.remove(&conn);
        }
        self.user_conns.remove_if(&user_id, |_, conns| conns.is_empty());
    }

    /// Replace the connection's subscription set with exactly `chats`.
    pub fn resubscribe(&self, conn: ConnId, chats: &[i64]) {
        for mut entry in self.subscribers.iter_mut() {
            entry.value_mut().remove(&conn);
        }
        for &chat_id in chats {
            self.subscribers.entry(chat_id).or_default().insert(conn);
        }
        self.subscribers.retain(|_, conns| !conns.is_empty());
    }

    /// Drop the connection's subscription for one chat.
    pub fn unsubscribe(&self, conn: ConnId, chat_id: i64) {
        if let Some(mut conns) = self.subscribers.get_mut(&chat_id) {
            conns.remove(&conn);
        }
        self.subscribers.remove_if(&chat_id, |_, conns| conns.is_empty());
    }

    /// Push queues of every subscriber of a chat, minus the excluded
    /// connection.
    pub fn chat_audience(&self, chat_id: i64, exclude: Option<ConnId>) -> Vec<PushSender> {
        let conns: Vec<ConnId> = match self.subscribers.get(&chat_id) {
            Some(set) => set
                .iter()
                .copied()
                .filter(|conn| Some(*conn) != exclude)
                .collect(),
            None => return Vec::new(),
        };
        self.collect_senders(&conns)
    }

    /// Push queues of every live connection of a user.
    pub fn user_audience(&self, user_id: i64) -> Vec<PushSender> {
        let conns: Vec<ConnId> = match self.user_conns.get(&user_id) {
            Some(set) => set.iter().copied().collect(),
            None => return Vec::new(),
        };
        self.collect_senders(&conns)
    }

    fn collect_senders(&self, conns: &[ConnId]) -> Vec<PushSender> {
        conns
            .iter()
            .filter_map(|conn| self.senders.get(conn).map(|tx| tx.value().clone()))
            .collect()
    }

    /// Purge every trace of a closed connection.
    pub fn teardown(&self, conn: ConnId) {
        self.senders.remove(&conn);
        if let Some((_, user_id)) = self.session_user.remove(&conn) {
            self.remove_user_conn(user_id, conn);
        }
        for mut entry in self.subscribers.iter_mut() {
            entry.value_mut().remove(&conn);
        }
        self.subscribers.retain(|_, conns| !conns.is_empty());
    }
}
