//! REGISTER, LOGIN and user id lookup.

use super::Session;
use crate::error::HandlerResult;
use crate::state::Hub;
use chatter_proto::{reply, Reject};
use tracing::info;

pub async fn register(hub: &Hub, username: &str, password_hash: &str) -> HandlerResult {
    if hub.store.users().register(username, password_hash).await? {
        info!(user = %username, "User registered");
        Ok(reply::OK_REG.to_string())
    } else {
        Err(Reject::UserExists.into())
    }
}

pub async fn login(
    hub: &Hub,
    session: &mut Session,
    username: &str,
    password_hash: &str,
) -> HandlerResult {
    match hub.store.users().authenticate(username, password_hash).await? {
        Some(user_id) => {
            session.user_id = Some(user_id);
            hub.registry.bind_user(session.conn_id, user_id);
            info!(conn = %session.conn_id, user = %username, "Login");
            Ok(reply::OK_LOGIN.to_string())
        }
        None => Err(Reject::NotCorrect.into()),
    }
}

/// GET_USER_ID works without a session; clients resolve peers before the
/// first login completes.
pub async fn get_user_id(hub: &Hub, username: &str) -> HandlerResult {
    match hub.store.users().id_by_name(username).await? {
        Some(user_id) => Ok(user_id.to_string()),
        None => Err(Reject::NoSuchUser.into()),
    }
}
