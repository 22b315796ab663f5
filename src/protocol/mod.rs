//! IRC protocol layer.
//!
//! This module contains:
//! - Connection setup, SASL and registration
//! - Translation of raw messages into bridge events
//! - Formatting and CTCP helpers
//! - The per-connection session loop

pub mod connector;
pub mod events;
pub mod format;
pub mod roster;
pub mod sasl;
pub mod session;

// Re-export commonly used types
pub use connector::connect;
pub use session::SessionEnd;
