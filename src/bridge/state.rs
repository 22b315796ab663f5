//! Topic-seen guard.
//!
//! Servers replay the current topic right after a join. Without this guard
//! every (re)connect would announce "changed topic" on Discord, so the first
//! topic report per room is swallowed and only later ones are relayed.

use std::collections::HashSet;

/// Rooms whose topic has already been reported since joining.
#[derive(Debug, Default)]
pub struct TopicGuard {
    seen: HashSet<String>,
}

impl TopicGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` on the first report for `room` (and marks it seen),
    /// `false` on every later one.
    pub fn should_suppress(&mut self, room: &str) -> bool {
        self.seen.insert(room.to_string())
    }

    /// Forget `room`, so the topic replay on the next join is suppressed again.
    pub fn forget(&mut self, room: &str) {
        self.seen.remove(room);
    }

    /// Forget every room. Used when a new connection registers.
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}
