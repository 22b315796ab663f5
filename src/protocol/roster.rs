//! Channel membership as seen from the connection.

use std::collections::{BTreeMap, HashSet};

/// Status prefixes a server may put in front of nicks in `RPL_NAMREPLY`.
const STATUS_PREFIXES: &[char] = &['~', '&', '@', '%', '+'];

/// Who is in which room.
///
/// Rooms are kept sorted so multi-room events list them deterministically.
#[derive(Debug, Default)]
pub struct Roster {
    rooms: BTreeMap<String, HashSet<String>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, room: &str, nick: &str) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(nick.to_string());
    }

    /// Add the space-separated nick list of an `RPL_NAMREPLY`.
    pub fn add_names(&mut self, room: &str, names: &str) {
        for name in names.split_whitespace() {
            let nick = name.trim_start_matches(STATUS_PREFIXES);
            if !nick.is_empty() {
                self.add(room, nick);
            }
        }
    }

    pub fn remove(&mut self, room: &str, nick: &str) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(nick);
        }
    }

    /// Drop everything known about `room`, e.g. after we left it.
    pub fn remove_room(&mut self, room: &str) {
        self.rooms.remove(room);
    }

    /// Remove `nick` from every room and return the rooms it was in.
    pub fn remove_everywhere(&mut self, nick: &str) -> Vec<String> {
        self.rooms
            .iter_mut()
            .filter_map(|(room, members)| members.remove(nick).then(|| room.clone()))
            .collect()
    }

    /// Rename `old` to `new` everywhere and return the rooms affected.
    pub fn rename(&mut self, old: &str, new: &str) -> Vec<String> {
        self.rooms
            .iter_mut()
            .filter_map(|(room, members)| {
                if members.remove(old) {
                    members.insert(new.to_string());
                    Some(room.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    #[cfg(test)]
    pub fn contains(&self, room: &str, nick: &str) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(nick))
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}
