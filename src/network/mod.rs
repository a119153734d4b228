//! Network layer.
//!
//! Contains the TLS material loader, the Gateway (TCP listener) and the
//! per-connection handler.

mod connection;
mod gateway;
pub mod tls;

pub use connection::Connection;
pub use gateway::Gateway;
