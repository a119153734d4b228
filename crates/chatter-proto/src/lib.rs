//! # chatter-proto
//!
//! The wire protocol spoken between chatter clients and the chatterd server:
//! a line-oriented, UTF-8, `\n`-terminated text protocol carried over TLS.
//!
//! This crate owns the protocol surface and nothing else:
//!
//! - [`Command`]: the client command grammar and its parser
//! - [`reply`]: server reply and push-notification rendering
//! - [`history`]: merging of messages and chat events into a HISTORY line
//! - [`time`]: the wire timestamp format
//!
//! There is no I/O here; the server and test clients both build on these
//! pure functions.

pub mod command;
pub mod history;
pub mod reply;
pub mod time;

pub use command::{Command, ParseError, MAX_LINE_LEN};
pub use history::{event_phrase, history_line, EventRow, MessageRow};
pub use reply::{chats_line, ChatEntry, Reject};
pub use time::{format_wire_time, WIRE_TIME_FORMAT};
