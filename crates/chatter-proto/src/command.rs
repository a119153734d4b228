//! Client command grammar.
//!
//! Commands are space-separated words on a single line. Only the trailing
//! argument of SEND may contain spaces; every other argument is one word.

use thiserror::Error;

/// Longest accepted input line, delimiter excluded.
pub const MAX_LINE_LEN: usize = 8192;

/// One parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `REGISTER <username> <password_hash>`
    Register {
        username: String,
        password_hash: String,
    },
    /// `LOGIN <username> <password_hash>`
    Login {
        username: String,
        password_hash: String,
    },
    /// `LIST_CHATS`
    ListChats,
    /// `CREATE_CHAT 0 <peer_id>`
    CreatePrivate { peer: i64 },
    /// `CREATE_CHAT 1 <name> <member_id>...`
    CreateGroup { name: String, members: Vec<i64> },
    /// `SEND <chat_id> <text...>`
    Send { chat_id: i64, text: String },
    /// `HISTORY <chat_id>`
    History { chat_id: i64 },
    /// `DELETE <msg_id>`: hide the message for the caller only.
    Delete { msg_id: i64 },
    /// `DELETE_GLOBAL <msg_id>`: remove the message for every viewer.
    DeleteGlobal { msg_id: i64 },
    /// `LEAVE_CHAT <chat_id>`
    LeaveChat { chat_id: i64 },
    /// `GET_USER_ID <username>`
    GetUserId { username: String },
}

/// Why a line failed to parse into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The leading word is not a known command.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
    /// A required argument is absent.
    #[error("{0}: missing argument")]
    MissingArgument(&'static str),
    /// An argument that must be numeric is not.
    #[error("{0}: bad numeric argument")]
    BadNumber(&'static str),
}

impl Command {
    /// Parse one framed line (line terminator already stripped).
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line, ""),
        };

        match verb {
            "REGISTER" => {
                let (username, password_hash) = two_words("REGISTER", rest)?;
                Ok(Command::Register {
                    username,
                    password_hash,
                })
            }
            "LOGIN" => {
                let (username, password_hash) = two_words("LOGIN", rest)?;
                Ok(Command::Login {
                    username,
                    password_hash,
                })
            }
            "LIST_CHATS" => Ok(Command::ListChats),
            "CREATE_CHAT" => parse_create_chat(rest),
            "SEND" => {
                // The message text is everything after the chat id; one
                // separating space is consumed, the rest is payload.
                let (chat_id, text) = match rest.split_once(' ') {
                    Some((id, text)) => (id, text),
                    None => (rest, ""),
                };
                Ok(Command::Send {
                    chat_id: number("SEND", chat_id)?,
                    text: text.to_string(),
                })
            }
            "HISTORY" => Ok(Command::History {
                chat_id: number("HISTORY", one_word("HISTORY", rest)?)?,
            }),
            "DELETE" => Ok(Command::Delete {
                msg_id: number("DELETE", one_word("DELETE", rest)?)?,
            }),
            "DELETE_GLOBAL" => Ok(Command::DeleteGlobal {
                msg_id: number("DELETE_GLOBAL", one_word("DELETE_GLOBAL", rest)?)?,
            }),
            "LEAVE_CHAT" => Ok(Command::LeaveChat {
                chat_id: number("LEAVE_CHAT", one_word("LEAVE_CHAT", rest)?)?,
            }),
            "GET_USER_ID" => Ok(Command::GetUserId {
                username: one_word("GET_USER_ID", rest)?.to_string(),
            }),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_create_chat(rest: &str) -> Result<Command, ParseError> {
    let mut words = rest.split_whitespace();
    let kind = words
        .next()
        .ok_or(ParseError::MissingArgument("CREATE_CHAT"))?;

    match kind {
        "0" => {
            let peer = words
                .next()
                .ok_or(ParseError::MissingArgument("CREATE_CHAT"))?;
            Ok(Command::CreatePrivate {
                peer: number("CREATE_CHAT", peer)?,
            })
        }
        "1" => {
            let name = words
                .next()
                .ok_or(ParseError::MissingArgument("CREATE_CHAT"))?
                .to_string();
            let mut members = Vec::new();
            for word in words {
                members.push(number("CREATE_CHAT", word)?);
            }
            Ok(Command::CreateGroup { name, members })
        }
        _ => Err(ParseError::BadNumber("CREATE_CHAT")),
    }
}

fn one_word<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, ParseError> {
    rest.split_whitespace()
        .next()
        .ok_or(ParseError::MissingArgument(command))
}

fn two_words(command: &'static str, rest: &str) -> Result<(String, String), ParseError> {
    let mut words = rest.split_whitespace();
    let first = words
        .next()
        .ok_or(ParseError::MissingArgument(command))?
        .to_string();
    let second = words
        .next()
        .ok_or(ParseError::MissingArgument(command))?
        .to_string();
    Ok((first, second))
}

fn number(command: &'static str, word: &str) -> Result<i64, ParseError> {
    word.parse().map_err(|_| ParseError::BadNumber(command))
}
