//! Canonical message types flowing between the IRC side and the bridge.
//!
//! `IrcEvent` is the single closed set of events the bridge reacts to. The
//! protocol layer produces them, the [`Bridge`](crate::bridge::Bridge)
//! consumes them one at a time.

/// An event observed on the IRC connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcEvent {
    /// Registration with the server completed under `nick`.
    Registered { nick: String },
    /// A PRIVMSG to a channel or to us.
    Message {
        nick: String,
        target: String,
        text: String,
    },
    /// A CTCP ACTION (`/me`).
    Action {
        nick: String,
        target: String,
        text: String,
    },
    /// A NOTICE. `nick` is `None` for server notices.
    Notice {
        nick: Option<String>,
        target: String,
        text: String,
    },
    Join {
        channel: String,
        nick: String,
    },
    Part {
        channel: String,
        nick: String,
        reason: Option<String>,
    },
    /// A QUIT, with the channels the nick was seen in.
    Quit {
        nick: String,
        reason: Option<String>,
        channels: Vec<String>,
    },
    Kick {
        channel: String,
        nick: String,
        by: String,
        reason: Option<String>,
    },
    /// A KILL, with the channels the nick was seen in.
    Kill {
        nick: String,
        reason: Option<String>,
        channels: Vec<String>,
    },
    /// A NICK change, with the channels the nick was seen in.
    NickChange {
        old: String,
        new: String,
        channels: Vec<String>,
    },
    /// A single channel mode change (one event per mode letter).
    Mode {
        channel: String,
        by: String,
        adding: bool,
        mode: String,
        argument: Option<String>,
    },
    /// A topic report, either replayed on join or changed live.
    Topic {
        channel: String,
        topic: String,
        nick: String,
    },
    /// A CTCP VERSION query.
    CtcpVersion { from: String, to: String },
    Invite { channel: String, from: String },
    /// An `ERROR` line or other protocol-level failure reported by the server.
    Error { message: String },
}

/// A message ready to be posted to every target of `room`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEnvelope {
    pub room: String,
    /// Webhook username, at most [`MAX_DISPLAY_NAME_LEN`] characters.
    pub display_name: String,
    pub text: String,
}

/// Discord rejects webhook usernames longer than this.
pub const MAX_DISPLAY_NAME_LEN: usize = 32;

impl RelayEnvelope {
    /// Build an envelope, truncating the display name to the Discord limit.
    pub fn new(room: impl Into<String>, display_name: &str, text: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            display_name: display_name.chars().take(MAX_DISPLAY_NAME_LEN).collect(),
            text: text.into(),
        }
    }
}

/// Something the bridge asks the IRC side to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolAction {
    /// Answer a CTCP VERSION query from `to`.
    CtcpVersionReply { to: String, version: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_truncated() {
        let long = "a".repeat(40);
        let envelope = RelayEnvelope::new("#a", &long, "hi");
        assert_eq!(envelope.display_name.chars().count(), MAX_DISPLAY_NAME_LEN);
    }

    #[test]
    fn test_display_name_truncation_respects_chars() {
        let name = "é".repeat(33);
        let envelope = RelayEnvelope::new("#a", &name, "hi");
        assert_eq!(envelope.display_name, "é".repeat(32));
    }

    #[test]
    fn test_short_display_name_untouched() {
        let envelope = RelayEnvelope::new("#a", "bob", "hi");
        assert_eq!(envelope.display_name, "bob");
        assert_eq!(envelope.room, "#a");
    }
}
