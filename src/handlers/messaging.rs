//! SEND, HISTORY and message deletion.

use super::{fanout, Session};
use crate::error::HandlerResult;
use crate::state::Hub;
use chatter_proto::{history_line, reply, EventRow, Reject};
use std::collections::HashMap;

pub async fn send(hub: &Hub, session: &mut Session, chat_id: i64, text: &str) -> HandlerResult {
    let user_id = session.require_user()?;

    if !hub.store.chats().is_member(chat_id, user_id).await? {
        return Err(Reject::NoChatAccess.into());
    }

    let msg_id = hub.store.messages().store(chat_id, user_id, text).await?;

    // Other subscribers get a refetch hint; the sender only gets the reply.
    fanout::notify_chat(
        &hub.registry,
        chat_id,
        Some(session.conn_id),
        &reply::new_history(chat_id),
    );

    Ok(reply::ok_sent(msg_id))
}

pub async fn history(hub: &Hub, session: &mut Session, chat_id: i64) -> HandlerResult {
    let user_id = session.require_user()?;

    if !hub.store.chats().is_member(chat_id, user_id).await? {
        return Err(Reject::NoChatAccess.into());
    }

    let messages = hub.store.messages().history(chat_id, user_id).await?;
    let events = hub.store.chats().events(chat_id).await?;

    // Resolve event actors to names, once per user.
    let mut names: HashMap<i64, String> = HashMap::new();
    let mut rows = Vec::with_capacity(events.len());
    for event in events {
        let username = match names.get(&event.user_id).cloned() {
            Some(name) => name,
            None => {
                let name = hub
                    .store
                    .users()
                    .username(event.user_id)
                    .await?
                    .unwrap_or_default();
                names.insert(event.user_id, name.clone());
                name
            }
        };
        rows.push(EventRow {
            ts: event.ts,
            username,
            event_type: event.event_type,
        });
    }

    Ok(history_line(&messages, &rows))
}

/// Hide a message from the caller. Only the author may do this, and nobody
/// else is notified.
pub async fn delete(hub: &Hub, session: &mut Session, msg_id: i64) -> HandlerResult {
    let user_id = session.require_user()?;

    if hub.store.messages().sender_of(msg_id).await? != Some(user_id) {
        return Err(Reject::NoRights.into());
    }

    hub.store.messages().delete_for_user(msg_id, user_id).await?;
    Ok(reply::msg_deleted(msg_id))
}

/// Remove a message for every viewer and notify the chat's subscribers.
pub async fn delete_global(hub: &Hub, session: &mut Session, msg_id: i64) -> HandlerResult {
    let user_id = session.require_user()?;

    if hub.store.messages().sender_of(msg_id).await? != Some(user_id) {
        return Err(Reject::NoRights.into());
    }

    hub.store.messages().delete_global(msg_id).await?;

    if let Some(chat_id) = hub.store.messages().chat_of(msg_id).await? {
        fanout::notify_chat(
            &hub.registry,
            chat_id,
            Some(session.conn_id),
            &reply::msg_deleted(msg_id),
        );
    }

    Ok(reply::msg_deleted(msg_id))
}
