//! SASL PLAIN authentication during registration.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use irc::proto::{CapSubCommand, Command, Response};
use tracing::{debug, info, warn};

/// Credentials and replies for the SASL PLAIN exchange.
#[derive(Clone)]
pub struct SaslPlain {
    username: String,
    password: String,
}

impl std::fmt::Debug for SaslPlain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslPlain")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SaslPlain {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `CAP REQ sasl`, sent instead of the usual `CAP END` at login.
    pub fn request() -> Command {
        Command::CAP(None, CapSubCommand::REQ, None, Some("sasl".to_string()))
    }

    /// `authzid \0 authcid \0 password`, base64 encoded.
    fn payload(&self) -> String {
        STANDARD.encode(format!(
            "{}\0{}\0{}",
            self.username, self.username, self.password
        ))
    }

    /// The next command to send in response to `command`, if it is part
    /// of the exchange.
    pub fn respond(&self, command: &Command) -> Option<Command> {
        match command {
            Command::CAP(_, CapSubCommand::ACK, first, second) => {
                let caps = second.as_deref().or(first.as_deref()).unwrap_or_default();
                if caps.split_whitespace().any(|cap| cap == "sasl") {
                    debug!("SASL acknowledged, authenticating as {}", self.username);
                    Some(Command::AUTHENTICATE("PLAIN".to_string()))
                } else {
                    None
                }
            }
            Command::CAP(_, CapSubCommand::NAK, _, _) => {
                warn!("Server does not support SASL, continuing without it");
                Some(cap_end())
            }
            Command::AUTHENTICATE(challenge) if challenge == "+" => {
                Some(Command::AUTHENTICATE(self.payload()))
            }
            Command::Response(Response::RPL_SASLSUCCESS, _) => {
                info!("SASL authentication successful.");
                Some(cap_end())
            }
            Command::Response(
                Response::ERR_SASLFAIL
                | Response::ERR_SASLTOOLONG
                | Response::ERR_SASLABORT
                | Response::ERR_SASLALREADY,
                args,
            ) => {
                let reason = args.last().map(String::as_str).unwrap_or_default();
                warn!("SASL authentication failed: {}", reason);
                Some(cap_end())
            }
            _ => None,
        }
    }
}

fn cap_end() -> Command {
    Command::CAP(None, CapSubCommand::END, None, None)
}
