//! Server reply and push-notification rendering.

/// Successful REGISTER.
pub const OK_REG: &str = "OK REG";
/// Successful LOGIN.
pub const OK_LOGIN: &str = "OK LOGIN";
/// Successful LEAVE_CHAT.
pub const OK_LEFT: &str = "OK LEFT";
/// Pushed to every socket of every member of a freshly created chat.
pub const NEW_CHAT: &str = "NEW_CHAT";

/// Successful SEND, carrying the assigned message id.
pub fn ok_sent(msg_id: i64) -> String {
    format!("OK SENT {msg_id}")
}

/// Reply to DELETE / DELETE_GLOBAL, also pushed to subscribers on a global
/// delete.
pub fn msg_deleted(msg_id: i64) -> String {
    format!("MSG_DELETED {msg_id}")
}

/// Pushed to other subscribers of a chat after a message is stored; a hint
/// to refetch HISTORY.
pub fn new_history(chat_id: i64) -> String {
    format!("NEW_HISTORY {chat_id}")
}

/// Pushed to remaining subscribers when a member leaves. `ts` is in wire
/// format and itself contains a space, so the line has four fields after
/// the verb.
pub fn user_left(chat_id: i64, username: &str, ts: &str) -> String {
    format!("USER_LEFT {chat_id} {username} {ts}")
}

/// Wire-visible rejection tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// REGISTER collides with an existing username.
    UserExists,
    /// LOGIN credentials rejected.
    NotCorrect,
    /// The command requires authentication.
    NotLogged,
    /// A private chat with that peer already exists.
    ChatExists,
    /// SEND/HISTORY on a chat the user is not a member of.
    NoChatAccess,
    /// DELETE/DELETE_GLOBAL on a message the user did not author.
    NoRights,
    /// GET_USER_ID found no such user.
    NoSuchUser,
    /// Command token not recognised.
    Unknown,
    /// Generic failure (store layer, malformed arguments).
    Generic,
}

impl Reject {
    /// The full reply line for this rejection.
    pub fn as_line(self) -> &'static str {
        match self {
            Reject::UserExists => "ERROR USER_EXISTS",
            Reject::NotCorrect => "ERROR NOT_CORRECT",
            Reject::NotLogged => "ERROR NOT_LOGGED",
            Reject::ChatExists => "ERROR CHAT_EXISTS",
            Reject::NoChatAccess => "ERROR NO_CHAT_ACCESS",
            Reject::NoRights => "ERROR NO_RIGHTS",
            Reject::NoSuchUser => "ERROR NO_SUCH_USER",
            Reject::Unknown => "ERROR UNKNOWN",
            Reject::Generic => "ERROR",
        }
    }
}

/// One chat of a CHATS response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub chat_id: i64,
    pub is_group: bool,
    /// Empty for private chats.
    pub name: String,
    pub members: Vec<String>,
}

/// Render the CHATS response line: `;`-separated entries, each
/// `chat_id:is_group:name:member1,member2,...`.
pub fn chats_line(entries: &[ChatEntry]) -> String {
    if entries.is_empty() {
        return "CHATS".to_string();
    }
    let rendered: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "{}:{}:{}:{}",
                entry.chat_id,
                if entry.is_group { 1 } else { 0 },
                entry.name,
                entry.members.join(",")
            )
        })
        .collect();
    format!("CHATS {}", rendered.join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_lines() {
        assert_eq!(Reject::UserExists.as_line(), "ERROR USER_EXISTS");
        assert_eq!(Reject::NotLogged.as_line(), "ERROR NOT_LOGGED");
        assert_eq!(Reject::Generic.as_line(), "ERROR");
    }

    #[test]
    fn push_lines() {
        assert_eq!(ok_sent(12), "OK SENT 12");
        assert_eq!(msg_deleted(12), "MSG_DELETED 12");
        assert_eq!(new_history(3), "NEW_HISTORY 3");
        assert_eq!(
            user_left(3, "bob", "2026-08-01 10:15"),
            "USER_LEFT 3 bob 2026-08-01 10:15"
        );
    }

    #[test]
    fn chats_rendering() {
        let entries = vec![
            ChatEntry {
                chat_id: 1,
                is_group: false,
                name: String::new(),
                members: vec!["alice".into(), "bob".into()],
            },
            ChatEntry {
                chat_id: 2,
                is_group: true,
                name: "team".into(),
                members: vec!["alice".into(), "bob".into(), "carol".into()],
            },
        ];
        assert_eq!(
            chats_line(&entries),
            "CHATS 1:0::alice,bob;2:1:team:alice,bob,carol"
        );
    }

    #[test]
    fn chats_rendering_empty() {
        assert_eq!(chats_line(&[]), "CHATS");
    }
}
