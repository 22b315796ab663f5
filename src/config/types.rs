//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
///
/// Routes can be given in the legacy single-room shape (`channel`, `id`,
/// `token`), as a `channels` list, or both; [`Config::routes`] merges them.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub nick: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sasl: bool,
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Legacy single route: IRC room.
    #[serde(default)]
    pub channel: Option<String>,
    /// Legacy single route: webhook id.
    #[serde(default)]
    pub id: Option<String>,
    /// Legacy single route: webhook token.
    #[serde(default)]
    pub token: Option<String>,

    /// Multi-route list.
    #[serde(default)]
    pub channels: Vec<ChannelMapping>,

    /// Rooms to join without bridging them.
    #[serde(default)]
    pub join: Vec<String>,

    /// Nick of a bot relaying Discord messages back into IRC.
    #[serde(default)]
    pub relay: Option<String>,
    /// Treat any nick starting with `relay` as the relay bot.
    #[serde(default)]
    pub relay_prefix: bool,

    /// Display name used for join/part/mode/topic announcements.
    #[serde(default = "default_system_name")]
    pub system_name: String,
    /// Departure message sent with QUIT on shutdown.
    #[serde(default = "default_leave")]
    pub leave: String,
    /// Base URL of the Discord API.
    #[serde(default = "default_webhook_api")]
    pub webhook_api: String,
}

/// Maps an IRC room to one Discord webhook.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChannelMapping {
    /// IRC room, e.g. `#rust`.
    pub name: String,
    /// Webhook id. Strings are accepted since snowflakes overflow JSON doubles.
    pub id: String,
    /// Webhook token.
    pub token: String,
}

fn default_port() -> u16 {
    6697
}

fn default_secure() -> bool {
    true
}

fn default_system_name() -> String {
    "ChanServ".to_string()
}

fn default_leave() -> String {
    "Leaving".to_string()
}

fn default_webhook_api() -> String {
    "https://discord.com/api".to_string()
}

impl Config {
    /// All configured routes, the legacy one first, in file order.
    ///
    /// A partially filled legacy shape is ignored here; validation reports it.
    pub fn routes(&self) -> Vec<ChannelMapping> {
        let legacy = match (&self.channel, &self.id, &self.token) {
            (Some(name), Some(id), Some(token)) => Some(ChannelMapping {
                name: name.clone(),
                id: id.clone(),
                token: token.clone(),
            }),
            _ => None,
        };

        legacy.into_iter().chain(self.channels.iter().cloned()).collect()
    }

    /// Login name, defaulting to the nick.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    /// Real name, defaulting to the nick.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }

    /// Whether any part of the legacy single-route shape is present.
    pub fn has_legacy_route(&self) -> bool {
        self.channel.is_some() || self.id.is_some() || self.token.is_some()
    }
}

#[cfg(test)]
pub(crate) fn make_test_config() -> Config {
    Config {
        host: "irc.example.net".to_string(),
        port: 6697,
        nick: "bridge".to_string(),
        username: None,
        realname: None,
        password: None,
        sasl: false,
        secure: true,
        channel: Some("#a".to_string()),
        id: Some("123".to_string()),
        token: Some("secret".to_string()),
        channels: Vec::new(),
        join: Vec::new(),
        relay: None,
        relay_prefix: false,
        system_name: default_system_name(),
        leave: default_leave(),
        webhook_api: default_webhook_api(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_route_comes_first() {
        let mut config = make_test_config();
        config.channels.push(ChannelMapping {
            name: "#b".to_string(),
            id: "456".to_string(),
            token: "t2".to_string(),
        });

        let routes = config.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].name, "#a");
        assert_eq!(routes[1].name, "#b");
    }

    #[test]
    fn test_incomplete_legacy_route_ignored() {
        let mut config = make_test_config();
        config.token = None;
        assert!(config.routes().is_empty());
        assert!(config.has_legacy_route());
    }

    #[test]
    fn test_identity_defaults_to_nick() {
        let mut config = make_test_config();
        assert_eq!(config.username(), "bridge");
        assert_eq!(config.realname(), "bridge");

        config.realname = Some("IRC Bridge".to_string());
        assert_eq!(config.realname(), "IRC Bridge");
    }
}
