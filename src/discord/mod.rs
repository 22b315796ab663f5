//! Discord delivery through webhooks.
//!
//! This module owns everything on the Discord side of the bridge: webhook
//! targets, the HTTP client that executes them, and the dispatcher that fans
//! relayed messages out without blocking the IRC event loop.

pub mod dispatcher;
pub mod webhook;

pub use dispatcher::{Dispatch, WebhookDispatcher};
pub use webhook::WebhookClient;
