//! LIST_CHATS, CREATE_CHAT and LEAVE_CHAT.

use super::{fanout, Session};
use crate::db::PrivateChat;
use crate::error::HandlerResult;
use crate::state::Hub;
use chatter_proto::{chats_line, reply, ChatEntry, Reject};
use tracing::info;

/// List the caller's chats and rebuild this connection's subscription set
/// to exactly the listed chats.
pub async fn list_chats(hub: &Hub, session: &mut Session) -> HandlerResult {
    let user_id = session.require_user()?;

    let summaries = hub.store.chats().list_for_user(user_id).await?;

    let mut entries = Vec::with_capacity(summaries.len());
    for summary in &summaries {
        let members = hub.store.chats().members(summary.chat_id).await?;
        entries.push(ChatEntry {
            chat_id: summary.chat_id,
            is_group: summary.is_group,
            name: summary.name.clone(),
            members,
        });
    }

    let chat_ids: Vec<i64> = summaries.iter().map(|s| s.chat_id).collect();
    hub.registry.resubscribe(session.conn_id, &chat_ids);

    Ok(chats_line(&entries))
}

pub async fn create_private(hub: &Hub, session: &mut Session, peer: i64) -> HandlerResult {
    let user_id = session.require_user()?;

    let chat_id = match hub.store.chats().create_private(user_id, peer).await? {
        PrivateChat::Exists(_) => return Err(Reject::ChatExists.into()),
        PrivateChat::Created(chat_id) => chat_id,
    };
    info!(chat = chat_id, "Private chat created");

    let mut members = vec![user_id, peer];
    members.dedup();
    for member in members {
        fanout::notify_user(&hub.registry, member, reply::NEW_CHAT);
    }

    Ok(chat_id.to_string())
}

pub async fn create_group(
    hub: &Hub,
    session: &mut Session,
    name: &str,
    members: &[i64],
) -> HandlerResult {
    let user_id = session.require_user()?;

    // The creator is always first; duplicate ids collapse.
    let mut roster = vec![user_id];
    for &member in members {
        if !roster.contains(&member) {
            roster.push(member);
        }
    }

    let chat_id = hub.store.chats().create_group(name, &roster).await?;
    info!(chat = chat_id, name = %name, members = roster.len(), "Group chat created");

    for &member in &roster {
        fanout::notify_user(&hub.registry, member, reply::NEW_CHAT);
    }

    Ok(chat_id.to_string())
}

pub async fn leave_chat(hub: &Hub, session: &mut Session, chat_id: i64) -> HandlerResult {
    let user_id = session.require_user()?;

    if !hub.store.chats().is_member(chat_id, user_id).await? {
        return Err(Reject::Generic.into());
    }

    let left_at = hub.store.chats().remove_member(chat_id, user_id).await?;
    let username = hub
        .store
        .users()
        .username(user_id)
        .await?
        .unwrap_or_default();

    fanout::notify_chat(
        &hub.registry,
        chat_id,
        Some(session.conn_id),
        &reply::user_left(chat_id, &username, &left_at),
    );
    hub.registry.unsubscribe(session.conn_id, chat_id);
    info!(conn = %session.conn_id, chat = chat_id, "User left chat");

    Ok(reply::OK_LEFT.to_string())
}
