//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors raised while delivering a message to a Discord webhook.
///
/// These never leave the dispatcher: they are logged and dropped.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request to webhook {webhook_id} failed: {source}")]
    Request {
        webhook_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Webhook {webhook_id} rejected message with status {status}: {body}")]
    Rejected {
        webhook_id: String,
        status: reqwest::StatusCode,
        body: String,
    },
}

/// IRC connection errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: irc::error::Error,
    },

    #[error("IRC client error: {0}")]
    Irc(#[from] irc::error::Error),
}

/// Result type alias for connection operations.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;
