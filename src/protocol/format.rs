//! IRC text formatting and CTCP framing.
//!
//! # IRC Format Codes
//! - 0x02 (^B): Bold
//! - 0x03 (^C): Color (followed by optional foreground,background)
//! - 0x0F (^O): Reset all formatting
//! - 0x11 (^Q): Monospace
//! - 0x16 (^V): Reverse
//! - 0x1D (^]): Italic
//! - 0x1E (^^): Strikethrough
//! - 0x1F (^_): Underline

use std::borrow::Cow;
use std::sync::LazyLock;

use fancy_regex::Regex;

static FORMATTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x03(?:\d{1,2}(?:,\d{1,2})?)?|[\x02\x0F\x11\x16\x1D\x1E\x1F]")
        .expect("formatting pattern is valid")
});

/// CTCP delimiter.
const CTCP_DELIM: char = '\x01';

/// Remove color and formatting codes.
pub fn strip_formatting(text: &str) -> Cow<'_, str> {
    FORMATTING.replace_all(text, "")
}

/// A CTCP request embedded in a PRIVMSG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ctcp<'a> {
    /// `/me` text.
    Action(&'a str),
    Version,
    /// Any other query, by command name.
    Other(&'a str),
}

/// Parse `text` as a CTCP request, `None` if it is plain text.
///
/// The closing delimiter is optional, as some clients omit it.
pub fn parse_ctcp(text: &str) -> Option<Ctcp<'_>> {
    let inner = text.strip_prefix(CTCP_DELIM)?;
    let inner = inner.strip_suffix(CTCP_DELIM).unwrap_or(inner);

    let (command, args) = inner.split_once(' ').unwrap_or((inner, ""));
    match command {
        "ACTION" => Some(Ctcp::Action(args)),
        "VERSION" => Some(Ctcp::Version),
        _ => Some(Ctcp::Other(command)),
    }
}

/// Wrap a CTCP reply in delimiters.
pub fn ctcp_reply(command: &str, args: &str) -> String {
    format!("{}{} {}{}", CTCP_DELIM, command, args, CTCP_DELIM)
}
