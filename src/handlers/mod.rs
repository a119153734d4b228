//! Command dispatch.
//!
//! One dispatcher invocation per framed line: parse, enforce session state,
//! call into the Store and Registry, and produce exactly one reply line.
//! Pushes to other connections go through [`fanout`] and never affect the
//! caller's reply.

mod auth;
mod chats;
pub(crate) mod fanout;
mod messaging;

use crate::error::{HandlerError, HandlerResult};
use crate::state::{ConnId, Hub};
use chatter_proto::{Command, ParseError, Reject};
use tracing::{debug, warn};

/// Per-connection session state, owned by the connection task.
#[derive(Debug)]
pub struct Session {
    conn_id: ConnId,
    /// Set by a successful LOGIN; a failed re-login leaves it untouched.
    user_id: Option<i64>,
}

impl Session {
    pub fn new(conn_id: ConnId) -> Self {
        Self {
            conn_id,
            user_id: None,
        }
    }

    /// The authenticated user, or the not-logged-in rejection.
    fn require_user(&self) -> Result<i64, HandlerError> {
        self.user_id.ok_or(HandlerError::Reject(Reject::NotLogged))
    }
}

/// Handle one framed line and produce the single reply line.
pub async fn dispatch(hub: &Hub, session: &mut Session, line: &str) -> String {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(ParseError::UnknownCommand(verb)) => {
            debug!(conn = %session.conn_id, verb = %verb, "Unknown command");
            return Reject::Unknown.as_line().to_string();
        }
        Err(e) => {
            debug!(conn = %session.conn_id, error = %e, "Malformed command");
            return Reject::Generic.as_line().to_string();
        }
    };

    match route(hub, session, command).await {
        Ok(reply) => reply,
        Err(HandlerError::Reject(reject)) => reject.as_line().to_string(),
        Err(HandlerError::Store(e)) => {
            warn!(conn = %session.conn_id, error = %e, "Store failure while handling command");
            Reject::Generic.as_line().to_string()
        }
    }
}

async fn route(hub: &Hub, session: &mut Session, command: Command) -> HandlerResult {
    match command {
        Command::Register {
            username,
            password_hash,
        } => auth::register(hub, &username, &password_hash).await,
        Command::Login {
            username,
            password_hash,
        } => auth::login(hub, session, &username, &password_hash).await,
        Command::GetUserId { username } => auth::get_user_id(hub, &username).await,
        Command::ListChats => chats::list_chats(hub, session).await,
        Command::CreatePrivate { peer } => chats::create_private(hub, session, peer).await,
        Command::CreateGroup { name, members } => {
            chats::create_group(hub, session, &name, &members).await
        }
        Command::LeaveChat { chat_id } => chats::leave_chat(hub, session, chat_id).await,
        Command::Send { chat_id, text } => messaging::send(hub, session, chat_id, &text).await,
        Command::History { chat_id } => messaging::history(hub, session, chat_id).await,
        Command::Delete { msg_id } => messaging::delete(hub, session, msg_id).await,
        Command::DeleteGlobal { msg_id } => messaging::delete_global(hub, session, msg_id).await,
    }
}
