//! Translation of raw IRC messages into bridge events.

use std::collections::HashMap;

use irc::proto::{Command, Message, Mode, Prefix, Response};
use tracing::debug;

use crate::common::IrcEvent;

use super::format::{parse_ctcp, strip_formatting, Ctcp};
use super::roster::Roster;

/// Turns `irc` messages into [`IrcEvent`]s.
///
/// Keeps the state needed for that: our own nick, channel membership for
/// quit/kill/nick fan-out, and topics waiting for their setter.
#[derive(Debug)]
pub struct EventTranslator {
    nick: String,
    roster: Roster,
    /// Channel -> topic from `RPL_TOPIC`, until `RPL_TOPICWHOTIME` arrives.
    pending_topics: HashMap<String, String>,
}

impl EventTranslator {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            roster: Roster::new(),
            pending_topics: HashMap::new(),
        }
    }

    /// Our nick as last confirmed by the server.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Translate one message. Most produce zero or one event; a MODE line
    /// produces one per mode letter.
    pub fn translate(&mut self, message: &Message) -> Vec<IrcEvent> {
        let source = source_name(message);

        match &message.command {
            Command::Response(Response::RPL_WELCOME, args) => {
                if let Some(nick) = args.first() {
                    self.nick = nick.clone();
                }
                self.roster.clear();
                self.pending_topics.clear();
                vec![IrcEvent::Registered {
                    nick: self.nick.clone(),
                }]
            }

            Command::Response(Response::RPL_NAMREPLY, args) => {
                // <me> <type> <channel> :<names>
                if let (Some(channel), Some(names)) = (args.get(2), args.get(3)) {
                    self.roster.add_names(channel, names);
                }
                Vec::new()
            }

            Command::Response(Response::RPL_TOPIC, args) => {
                // <me> <channel> :<topic>
                if let (Some(channel), Some(topic)) = (args.get(1), args.get(2)) {
                    self.pending_topics
                        .insert(channel.clone(), strip_formatting(topic).into_owned());
                }
                Vec::new()
            }

            Command::Response(Response::RPL_TOPICWHOTIME, args) => {
                // <me> <channel> <setter> <time>
                let Some(channel) = args.get(1) else {
                    return Vec::new();
                };
                let setter = args.get(2).map(|s| nick_of(s)).unwrap_or(source.as_str());
                self.release_topic(channel, setter)
            }

            Command::Response(Response::RPL_ENDOFNAMES, args) => {
                // A topic without RPL_TOPICWHOTIME is attributed to the server.
                match args.get(1) {
                    Some(channel) => self.release_topic(channel, &source),
                    None => Vec::new(),
                }
            }

            Command::Response(response, args) if is_error(*response) => {
                vec![IrcEvent::Error {
                    message: format!("{:?}: {}", response, args.join(" ")),
                }]
            }

            Command::PRIVMSG(target, text) => {
                let text = strip_formatting(text);
                match parse_ctcp(&text) {
                    Some(Ctcp::Action(action)) => vec![IrcEvent::Action {
                        nick: source,
                        target: target.clone(),
                        text: action.to_string(),
                    }],
                    Some(Ctcp::Version) => vec![IrcEvent::CtcpVersion {
                        from: source,
                        to: target.clone(),
                    }],
                    Some(Ctcp::Other(query)) => {
                        debug!("Ignoring CTCP {} from {}", query, source);
                        Vec::new()
                    }
                    None => vec![IrcEvent::Message {
                        nick: source,
                        target: target.clone(),
                        text: text.to_string(),
                    }],
                }
            }

            Command::NOTICE(target, text) => vec![IrcEvent::Notice {
                nick: message.source_nickname().map(str::to_string),
                target: target.clone(),
                text: strip_formatting(text).into_owned(),
            }],

            Command::JOIN(channel, _, _) => {
                if source == self.nick {
                    self.roster.remove_room(channel);
                }
                self.roster.add(channel, &source);
                vec![IrcEvent::Join {
                    channel: channel.clone(),
                    nick: source,
                }]
            }

            Command::PART(channel, reason) => {
                if source == self.nick {
                    self.roster.remove_room(channel);
                } else {
                    self.roster.remove(channel, &source);
                }
                vec![IrcEvent::Part {
                    channel: channel.clone(),
                    nick: source,
                    reason: reason_of(reason.as_deref()),
                }]
            }

            Command::QUIT(reason) => {
                let channels = self.roster.remove_everywhere(&source);
                vec![IrcEvent::Quit {
                    nick: source,
                    reason: reason_of(reason.as_deref()),
                    channels,
                }]
            }

            Command::KICK(channels, nicks, reason) => {
                let reason = reason_of(reason.as_deref());
                let mut events = Vec::new();
                for channel in channels.split(',') {
                    for nick in nicks.split(',') {
                        if nick == self.nick {
                            self.roster.remove_room(channel);
                        } else {
                            self.roster.remove(channel, nick);
                        }
                        events.push(IrcEvent::Kick {
                            channel: channel.to_string(),
                            nick: nick.to_string(),
                            by: source.clone(),
                            reason: reason.clone(),
                        });
                    }
                }
                events
            }

            Command::KILL(nick, reason) => {
                let channels = if *nick == self.nick {
                    self.roster.clear();
                    Vec::new()
                } else {
                    self.roster.remove_everywhere(nick)
                };
                vec![IrcEvent::Kill {
                    nick: nick.clone(),
                    reason: reason_of(Some(reason.as_str())),
                    channels,
                }]
            }

            Command::NICK(new) => {
                if source == self.nick {
                    self.nick = new.clone();
                }
                let channels = self.roster.rename(&source, new);
                vec![IrcEvent::NickChange {
                    old: source,
                    new: new.clone(),
                    channels,
                }]
            }

            Command::ChannelMODE(channel, modes) => modes
                .iter()
                .filter_map(|mode| {
                    let (adding, mode, argument) = match mode {
                        Mode::Plus(mode, argument) => (true, mode, argument),
                        Mode::Minus(mode, argument) => (false, mode, argument),
                        _ => return None,
                    };
                    Some(IrcEvent::Mode {
                        channel: channel.clone(),
                        by: source.clone(),
                        adding,
                        mode: mode.to_string(),
                        argument: argument.clone(),
                    })
                })
                .collect(),

            Command::TOPIC(channel, Some(topic)) => vec![IrcEvent::Topic {
                channel: channel.clone(),
                topic: strip_formatting(topic).into_owned(),
                nick: source,
            }],

            Command::INVITE(_, channel) => vec![IrcEvent::Invite {
                channel: channel.clone(),
                from: source,
            }],

            Command::ERROR(message) => vec![IrcEvent::Error {
                message: message.clone(),
            }],

            _ => Vec::new(),
        }
    }

    fn release_topic(&mut self, channel: &str, setter: &str) -> Vec<IrcEvent> {
        match self.pending_topics.remove(channel) {
            Some(topic) => vec![IrcEvent::Topic {
                channel: channel.to_string(),
                topic,
                nick: setter.to_string(),
            }],
            None => Vec::new(),
        }
    }
}

/// Nick or server name the message came from, empty if it has no prefix.
fn source_name(message: &Message) -> String {
    match &message.prefix {
        Some(Prefix::Nickname(nick, _, _)) => nick.clone(),
        Some(Prefix::ServerName(server)) => server.clone(),
        None => String::new(),
    }
}

/// Error numerics. SASL replies (9xx) are handled during login.
fn is_error(response: Response) -> bool {
    (400..600).contains(&(response as u16))
}

/// `nick` from `nick!user@host`.
fn nick_of(mask: &str) -> &str {
    mask.split('!').next().unwrap_or(mask)
}

/// Formatting-free reason, `None` when absent or blank.
fn reason_of(reason: Option<&str>) -> Option<String> {
    let reason = strip_formatting(reason?);
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}
