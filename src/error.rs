//! Handler-level errors mapped to wire ERROR tokens.

use crate::db::StoreError;
use chatter_proto::Reject;
use thiserror::Error;

/// Errors produced while handling one command. Every variant ends up as a
/// single `ERROR ...` reply line; nothing here aborts the connection.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A protocol-level rejection with a defined wire token.
    #[error("{}", .0.as_line())]
    Reject(Reject),
    /// A store failure; surfaces as the generic `ERROR` line.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<Reject> for HandlerError {
    fn from(reject: Reject) -> Self {
        Self::Reject(reject)
    }
}

/// Result type for command handlers: the single reply line, or the error
/// that becomes one.
pub type HandlerResult = Result<String, HandlerError>;
