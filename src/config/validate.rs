//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Characters a channel name may start with.
const CHANNEL_PREFIXES: &[char] = &['#', '&', '+', '!'];

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Connection
    if config.host.is_empty() {
        errors.push("host is required".to_string());
    }
    if config.port == 0 {
        errors.push("port must be non-zero".to_string());
    }
    if config.nick.is_empty() {
        errors.push("nick is required".to_string());
    }
    if config.sasl && config.password.as_deref().map_or(true, str::is_empty) {
        errors.push("sasl requires a password".to_string());
    }

    // Legacy single route must be complete if any part of it is given
    if config.has_legacy_route()
        && (config.channel.is_none() || config.id.is_none() || config.token.is_none())
    {
        errors.push("channel, id and token must be given together".to_string());
    }

    // Routes
    let routes = config.routes();
    if routes.is_empty() && !config.has_legacy_route() {
        errors.push("no routes configured - set channel/id/token or channels".to_string());
    }
    for (i, route) in routes.iter().enumerate() {
        if !route.name.starts_with(CHANNEL_PREFIXES) {
            errors.push(format!(
                "route {} room '{}' is not a channel name",
                i, route.name
            ));
        }
        if route.id.is_empty() || !route.id.chars().all(|c| c.is_ascii_digit()) {
            errors.push(format!("route {} id '{}' must be numeric", i, route.id));
        } else if route.id.trim_start_matches('0').is_empty() {
            errors.push(format!("route {} id must be non-zero", i));
        }
        if route.token.is_empty() {
            errors.push(format!("route {} token is required", i));
        }
    }

    for room in &config.join {
        if !room.starts_with(CHANNEL_PREFIXES) {
            errors.push(format!("join room '{}' is not a channel name", room));
        }
    }

    if config.relay.as_deref() == Some("") {
        errors.push("relay must not be empty when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
