//! Shared server state.

mod hub;
mod registry;

pub use hub::Hub;
pub use registry::{ConnId, Registry};
