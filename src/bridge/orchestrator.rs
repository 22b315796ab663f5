//! Bridge orchestrator: decides what each IRC event turns into.
//!
//! Every [`IrcEvent`] is either relayed to the webhooks of its room or logged
//! locally. The deciding question is always whether the room has at least one
//! route, plus the topic guard for topic reports. The route table and the
//! guard are owned here and touched by nothing else.

use tracing::{debug, error, info};

use crate::common::{IrcEvent, ProtocolAction, RelayEnvelope};
use crate::config::types::Config;
use crate::discord::Dispatch;

use super::filter::sanitize;
use super::relay::{parse_relayed, RelayMatcher};
use super::router::RouteTable;
use super::state::TopicGuard;

/// The main bridge that routes IRC events to Discord.
pub struct Bridge<D> {
    /// Room -> webhook routes.
    routes: RouteTable,
    /// First-topic suppression per room.
    topics: TopicGuard,
    /// The Discord relay bot, if one is configured.
    relay: Option<RelayMatcher>,
    /// Display name for system announcements.
    system_name: String,
    /// Our current nick.
    nick: String,
    /// Rooms to join: bridged ones first, then log-only ones.
    channels_to_join: Vec<String>,
    dispatcher: D,
}

impl<D: Dispatch> Bridge<D> {
    /// Create a new bridge from configuration.
    pub fn new(config: &Config, dispatcher: D) -> Self {
        let routes = RouteTable::from_mappings(&config.routes());

        let mut channels_to_join = routes.rooms().to_vec();
        for room in &config.join {
            if !channels_to_join.contains(room) {
                channels_to_join.push(room.clone());
            }
        }

        Self {
            routes,
            topics: TopicGuard::new(),
            relay: config
                .relay
                .as_ref()
                .map(|nick| RelayMatcher::new(nick.clone(), config.relay_prefix)),
            system_name: config.system_name.clone(),
            nick: config.nick.clone(),
            channels_to_join,
            dispatcher,
        }
    }

    /// Rooms the IRC client must join.
    pub fn channels_to_join(&self) -> &[String] {
        &self.channels_to_join
    }

    /// Our nick as last seen by the bridge.
    #[cfg(test)]
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Process one event. Returns a reply for the IRC side, if any.
    pub fn handle(&mut self, event: IrcEvent) -> Option<ProtocolAction> {
        match event {
            IrcEvent::Registered { nick } => {
                info!("Registered to server.");
                self.nick = nick;
                // A fresh connection replays every topic again.
                self.topics.reset();
            }

            IrcEvent::Message { nick, target, text } => {
                if self.routes.is_bridged(&target) {
                    let relayed = self
                        .relay
                        .as_ref()
                        .and_then(|relay| parse_relayed(&nick, &text, relay));
                    match relayed {
                        Some(relayed) => self.post(&target, &relayed.author, &relayed.body),
                        None => self.post(&target, &nick, &text),
                    }
                } else if target == self.nick {
                    info!("<{}@PM> {}", nick, text);
                } else {
                    info!("<{}@{}> {}", nick, target, text);
                }
            }

            IrcEvent::Action { nick, target, text } => {
                if self.routes.is_bridged(&target) {
                    self.post(&target, &nick, &format!("*{}*", text));
                } else {
                    info!("Action by {} in {}: {}", nick, target, text);
                }
            }

            IrcEvent::Notice { nick, target, text } => {
                let from = nick.as_deref().unwrap_or("the server");
                if target == self.nick || target == "*" {
                    info!("Notice from {}: {}", from, text);
                } else {
                    info!("Notice from {} to {}: {}", from, target, text);
                }
            }

            IrcEvent::Join { channel, nick } => {
                if nick == self.nick {
                    info!("Joined {}.", channel);
                } else if self.routes.is_bridged(&channel) {
                    self.announce(&channel, &format!("{} joined.", nick));
                } else {
                    info!("{} joined {}.", nick, channel);
                }
            }

            IrcEvent::Part {
                channel,
                nick,
                reason,
            } => {
                if self.routes.is_bridged(&channel) {
                    self.announce(&channel, &departure(&nick, reason.as_deref()));
                } else {
                    match reason {
                        Some(reason) => info!("{} left {}: *{}*", nick, channel, reason),
                        None => info!("{} left {}.", nick, channel),
                    }
                }
            }

            IrcEvent::Quit {
                nick,
                reason,
                channels,
            } => {
                let text = departure(&nick, reason.as_deref());
                if !self.announce_in(&channels, &text) {
                    match reason {
                        Some(reason) => info!("{} quit: \"{}\".", nick, reason),
                        None => info!("{} quit.", nick),
                    }
                }
            }

            IrcEvent::Kick {
                channel,
                nick,
                by,
                reason,
            } => {
                if nick == self.nick {
                    self.topics.forget(&channel);
                }

                if self.routes.is_bridged(&channel) {
                    let text = match &reason {
                        Some(reason) => format!("{} kick {}: *{}*", by, nick, reason),
                        None => format!("{} kicked {}.", by, nick),
                    };
                    self.announce(&channel, &text);
                } else {
                    match reason {
                        Some(reason) => {
                            info!("{} kicked {} from {}: \"{}\".", by, nick, channel, reason)
                        }
                        None => info!("{} kicked {} from {}.", by, nick, channel),
                    }
                }
            }

            IrcEvent::Kill {
                nick,
                reason,
                channels,
            } => {
                if nick == self.nick {
                    match reason {
                        Some(reason) => {
                            info!("You have been killed from the server: \"{}\".", reason)
                        }
                        None => info!("You have been killed from the server."),
                    }
                    return None;
                }

                let text = match &reason {
                    Some(reason) => format!("{} has been killed: *{}*", nick, reason),
                    None => format!("{} has been killed.", nick),
                };
                if !self.announce_in(&channels, &text) {
                    match reason {
                        Some(reason) => {
                            info!("{} has been killed from the server: \"{}\".", nick, reason)
                        }
                        None => info!("{} has been killed from the server.", nick),
                    }
                }
            }

            IrcEvent::NickChange { old, new, channels } => {
                let text = format!("{} is now known as {}.", old, new);
                if old == self.nick {
                    self.nick = new;
                }
                if !self.announce_in(&channels, &text) {
                    info!("{}", text);
                }
            }

            IrcEvent::Mode {
                channel,
                by,
                adding,
                mode,
                argument,
            } => {
                let sign = if adding { '+' } else { '-' };
                if self.routes.is_bridged(&channel) {
                    let on = argument.as_deref().unwrap_or("the channel");
                    self.announce(&channel, &format!("{} sets mode {}{} on {}.", by, sign, mode, on));
                } else {
                    let on = argument.as_deref().unwrap_or(channel.as_str());
                    info!("{} sets mode {}{} on {}.", by, sign, mode, on);
                }
            }

            IrcEvent::Topic {
                channel,
                topic,
                nick,
            } => {
                if self.topics.should_suppress(&channel) {
                    debug!("Initial topic of {} not relayed", channel);
                } else if self.routes.is_bridged(&channel) {
                    self.announce(&channel, &format!("{} changed topic to: *{}*", nick, topic));
                } else {
                    info!("{} changed topic of {} to \"{}\".", nick, channel, topic);
                }
            }

            IrcEvent::CtcpVersion { from, to } => {
                if to == self.nick {
                    return Some(ProtocolAction::CtcpVersionReply {
                        to: from,
                        version: version_string(),
                    });
                }
                info!("{} sent a CTCP VERSION to {}.", from, to);
            }

            IrcEvent::Invite { channel, from } => {
                info!("{} sent an invite to {}.", from, channel);
            }

            IrcEvent::Error { message } => {
                error!("An IRC error occurred: {}", message);
            }
        }

        None
    }

    /// Post `text` to every webhook of `room` under `display_name`.
    fn post(&self, room: &str, display_name: &str, text: &str) {
        let targets = self.routes.resolve(room);
        if targets.is_empty() {
            return;
        }
        self.dispatcher
            .dispatch(targets, RelayEnvelope::new(room, display_name, sanitize(text)));
    }

    /// Post a system announcement to `room`.
    fn announce(&self, room: &str, text: &str) {
        self.post(room, &self.system_name, text);
    }

    /// Announce `text` in every bridged room of `rooms`.
    /// Returns whether any room was bridged.
    fn announce_in(&self, rooms: &[String], text: &str) -> bool {
        let mut any = false;
        for room in rooms.iter().filter(|room| self.routes.is_bridged(room)) {
            self.announce(room, text);
            any = true;
        }
        any
    }
}

/// `"{nick} left."` or `"{nick} left: *{reason}*"`.
fn departure(nick: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{} left: *{}*", nick, reason),
        None => format!("{} left.", nick),
    }
}

/// Identification string sent in reply to CTCP VERSION.
pub fn version_string() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
