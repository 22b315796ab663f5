//! IRC connection setup and registration.

use irc::client::prelude::Config as IrcConfig;
use irc::client::Client;
use irc::proto::Command;
use tracing::{debug, info};

use crate::bridge::orchestrator::version_string;
use crate::common::error::{ConnectionError, ConnectionResult};
use crate::config::types::Config;

use super::events::EventTranslator;
use super::sasl::SaslPlain;
use super::session::Session;

/// Build the `irc` client configuration.
///
/// `channels` are joined by the client once the MOTD has been received. With
/// SASL the password is used for authentication instead of `PASS`.
pub fn client_config(config: &Config, channels: &[String]) -> IrcConfig {
    IrcConfig {
        nickname: Some(config.nick.clone()),
        alt_nicks: vec![format!("{}_", config.nick), format!("{}__", config.nick)],
        username: Some(config.username().to_string()),
        realname: Some(config.realname().to_string()),
        server: Some(config.host.clone()),
        port: Some(config.port),
        use_tls: Some(config.secure),
        password: if config.sasl {
            None
        } else {
            config.password.clone().filter(|p| !p.is_empty())
        },
        channels: channels.to_vec(),
        version: Some(version_string()),
        ..IrcConfig::default()
    }
}

/// SASL credentials, if SASL is enabled.
fn sasl_credentials(config: &Config) -> Option<SaslPlain> {
    match (&config.password, config.sasl) {
        (Some(password), true) => Some(SaslPlain::new(config.username(), password.clone())),
        _ => None,
    }
}

/// Connect to the server and start registration.
///
/// Returns as soon as the login commands are queued; registration completes
/// while the session runs.
pub async fn connect(config: &Config, channels: &[String]) -> ConnectionResult<Session> {
    info!("Connecting to {}:{}...", config.host, config.port);

    let mut client = Client::from_config(client_config(config, channels))
        .await
        .map_err(|source| ConnectionError::ConnectFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;
    let stream = client.stream()?;

    let sasl = sasl_credentials(config);
    match &sasl {
        Some(_) => {
            debug!("Requesting SASL capability");
            client.send(SaslPlain::request())?;
            client.send(Command::NICK(config.nick.clone()))?;
            client.send(Command::USER(
                config.username().to_string(),
                "0".to_string(),
                config.realname().to_string(),
            ))?;
        }
        None => client.identify()?,
    }

    Ok(Session::new(
        client,
        stream,
        EventTranslator::new(&config.nick),
        sasl,
        config.leave.clone(),
    ))
}
