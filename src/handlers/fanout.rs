//! Push delivery to chat subscribers and user sockets.
//!
//! Audiences are snapshotted from the registry, then delivered with no
//! registry lock held. Enqueueing never blocks: a full or closed push
//! queue drops that one recipient's notification and leaves the rest of
//! the audience untouched. A dead recipient is torn down by its own
//! connection task, not here.

use crate::state::{ConnId, Registry};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Deliver `line` to every subscriber of the chat except `exclude`.
pub fn notify_chat(registry: &Registry, chat_id: i64, exclude: Option<ConnId>, line: &str) {
    deliver(registry.chat_audience(chat_id, exclude), line);
}

/// Deliver `line` to every live connection of the user.
pub fn notify_user(registry: &Registry, user_id: i64, line: &str) {
    deliver(registry.user_audience(user_id), line);
}

fn deliver(audience: Vec<mpsc::Sender<String>>, line: &str) {
    for sender in audience {
        match sender.try_send(line.to_string()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(line = %line, "Push queue full, dropping notification");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(line = %line, "Recipient gone, dropping notification");
            }
        }
    }
}
