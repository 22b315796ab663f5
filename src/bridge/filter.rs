//! Text sanitizing for IRC text posted to Discord.
//!
//! Neutralizes mass mentions, invite links and link previews. This is an
//! anti-abuse filter, not escaping: Discord markdown passes through untouched.

use std::sync::LazyLock;

use fancy_regex::Regex;

/// Zero-width space, invisible but enough to break Discord's parsing.
pub const ZWSP: char = '\u{200B}';

static MASS_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(everyone|here)").expect("mention pattern is valid"));

static INVITE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"discord\.gg").expect("invite pattern is valid"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<?(https?://[^\s>]+)>?").expect("url pattern is valid"));

/// Make IRC text safe to post through a webhook.
///
/// - `@everyone` and `@here` get a zero-width space after the `@`.
/// - `discord.gg` gets a zero-width space before `.gg`.
/// - URLs are wrapped in exactly one pair of `<>` to suppress embeds.
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize(text: &str) -> String {
    let text = MASS_MENTION.replace_all(text, format!("@{}$1", ZWSP).as_str());
    let text = INVITE_LINK.replace_all(&text, format!("discord{}.gg", ZWSP).as_str());
    URL.replace_all(&text, "<$1>").into_owned()
}
