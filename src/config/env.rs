//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `IRCWEBHOOK_HOST` - IRC server host
//! - `IRCWEBHOOK_PORT` - IRC server port
//! - `IRCWEBHOOK_NICK` - Nick to register with
//! - `IRCWEBHOOK_PASSWORD` - Server or SASL password
//! - `IRCWEBHOOK_TOKEN` - Token of the legacy single webhook
//! - `IRCWEBHOOK_RELAY` - Nick of the Discord relay bot

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "IRCWEBHOOK";

/// Apply environment variable overrides to a config.
///
/// This allows secrets like the webhook token and password to be
/// provided via environment variables instead of the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| env::var(format!("{}_{}", ENV_PREFIX, name)).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(host) = var("HOST") {
        config.host = host;
    }
    if let Some(port) = var("PORT") {
        if let Ok(port) = port.parse() {
            config.port = port;
        }
    }
    if let Some(nick) = var("NICK") {
        config.nick = nick;
    }
    if let Some(password) = var("PASSWORD") {
        config.password = Some(password);
    }
    if let Some(token) = var("TOKEN") {
        config.token = Some(token);
    }
    if let Some(relay) = var("RELAY") {
        config.relay = Some(relay);
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `IRCWEBHOOK_CONFIG` environment variable, otherwise returns "config.json".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "config.json".to_string())
}
