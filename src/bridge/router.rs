//! Channel route table: IRC room to Discord webhooks.
//!
//! Built once from configuration and read-only afterwards. Rooms are matched
//! case-sensitively, exactly as the server spells them.

use std::collections::HashMap;

use crate::config::types::ChannelMapping;
use crate::discord::webhook::WebhookTarget;

/// Maps each bridged room to its ordered list of webhook targets.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Room -> targets, in configuration order.
    targets: HashMap<String, Vec<WebhookTarget>>,
    /// Rooms in order of first appearance.
    rooms: Vec<String>,
}

impl RouteTable {
    /// Build a table from route mappings.
    ///
    /// Several mappings for one room accumulate into a single fan-out list.
    pub fn from_mappings<'a>(mappings: impl IntoIterator<Item = &'a ChannelMapping>) -> Self {
        let mut table = Self::default();
        for mapping in mappings {
            table.insert(&mapping.name, WebhookTarget::new(&mapping.id, &mapping.token));
        }
        table
    }

    fn insert(&mut self, room: &str, target: WebhookTarget) {
        match self.targets.get_mut(room) {
            Some(targets) => targets.push(target),
            None => {
                self.rooms.push(room.to_string());
                self.targets.insert(room.to_string(), vec![target]);
            }
        }
    }

    /// Targets for `room`, empty if the room isn't bridged.
    pub fn resolve(&self, room: &str) -> &[WebhookTarget] {
        self.targets.get(room).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `room` has at least one target.
    pub fn is_bridged(&self, room: &str) -> bool {
        !self.resolve(room).is_empty()
    }

    /// Bridged rooms in configuration order.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }
}
