//! Unwrapping of messages relayed back from Discord.
//!
//! Another bridge bot may forward Discord messages into the IRC channel as
//! `<author> text` (optionally prefixed with `[DISCORD] `). Posting those
//! under the relay bot's nick would hide the real author, so they are
//! unwrapped and re-attributed.

use std::sync::LazyLock;

use fancy_regex::Regex;

static RELAYED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[DISCORD\] )?<([^>]+)> (.*)").expect("relay pattern is valid")
});

/// Suffix marking an author as coming through the relay bot.
pub const RELAY_SUFFIX: &str = " [Relay]";

/// Which nick is the relay bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMatcher {
    nick: String,
    prefix_match: bool,
}

impl RelayMatcher {
    /// Match the nick exactly, or any nick starting with it if `prefix_match`.
    pub fn new(nick: impl Into<String>, prefix_match: bool) -> Self {
        Self {
            nick: nick.into(),
            prefix_match,
        }
    }

    pub fn matches(&self, speaker: &str) -> bool {
        if self.prefix_match {
            speaker.starts_with(&self.nick)
        } else {
            speaker == self.nick
        }
    }
}

/// A message with its original author restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relayed {
    /// Original author with [`RELAY_SUFFIX`] appended.
    pub author: String,
    pub body: String,
}

/// Extract the original author and body if `speaker` is the relay bot.
///
/// Returns `None` when the speaker isn't the relay bot or the text doesn't
/// have the relayed shape; the caller then uses speaker and text as-is.
pub fn parse_relayed(speaker: &str, text: &str, relay: &RelayMatcher) -> Option<Relayed> {
    if !relay.matches(speaker) {
        return None;
    }

    let captures = RELAYED.captures(text).ok()??;
    let author = captures.get(1)?.as_str();
    let body = captures.get(2)?.as_str();

    Some(Relayed {
        author: format!("{}{}", author, RELAY_SUFFIX),
        body: body.to_string(),
    })
}
