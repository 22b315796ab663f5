//! Bridge logic between IRC events and Discord webhooks.
//!
//! ## Module Structure
//!
//! - `filter`: Text sanitizing before posting
//! - `orchestrator`: Event router (`Bridge` struct)
//! - `relay`: Unwrapping of messages relayed back from Discord
//! - `router`: Room to webhook route table
//! - `state`: Topic-seen guard

pub mod filter;
pub mod orchestrator;
pub mod relay;
pub mod router;
pub mod state;

// Re-export main types for convenience
pub use orchestrator::Bridge;
