//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod reconnect;

pub use messages::{IrcEvent, ProtocolAction, RelayEnvelope};
