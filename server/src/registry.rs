//! Connection-keyed player state table.
//!
//! The registry holds exactly one entry per live connection. It performs no
//! validation of positions; whatever coordinates a client reports are stored.

use shared::{ConnectionId, PlayerState};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    players: HashMap<ConnectionId, PlayerState>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
        }
    }

    /// Inserts the spawn state for `id` and returns it.
    ///
    /// An existing entry under the same id is replaced, keeping keys unique.
    pub fn spawn(&mut self, id: ConnectionId) -> PlayerState {
        let player = PlayerState::spawn();
        self.players.insert(id, player);
        player
    }

    /// Overwrites the position of `id`, leaving the radius untouched.
    ///
    /// Returns false without mutating anything when `id` is unknown.
    pub fn apply_movement(&mut self, id: ConnectionId, x: f64, y: f64) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.x = x;
                player.y = y;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<PlayerState> {
        self.players.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.players.contains_key(id)
    }

    /// Copy of the whole table, as sent in `currentPlayers`.
    pub fn snapshot(&self) -> HashMap<ConnectionId, PlayerState> {
        self.players.clone()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn id(raw: u64) -> ConnectionId {
        ConnectionId::new(raw)
    }

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_spawn_inserts_default_state() {
        let mut registry = Registry::new();

        let player = registry.spawn(id(1));

        assert_eq!(player, PlayerState::new(0.0, 0.0, 20.0));
        assert_eq!(registry.get(&id(1)), Some(&player));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_spawn_same_id_keeps_one_entry() {
        let mut registry = Registry::new();
        registry.spawn(id(1));
        registry.apply_movement(id(1), 3.0, 4.0);

        registry.spawn(id(1));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id(1)), Some(&PlayerState::spawn()));
    }

    #[test]
    fn test_apply_movement_updates_position_only() {
        let mut registry = Registry::new();
        registry.spawn(id(1));

        assert!(registry.apply_movement(id(1), 5.0, 10.0));

        let player = registry.get(&id(1)).unwrap();
        assert_approx_eq!(player.x, 5.0);
        assert_approx_eq!(player.y, 10.0);
        assert_approx_eq!(player.radius, 20.0);
    }

    #[test]
    fn test_apply_movement_stores_values_unclamped() {
        let mut registry = Registry::new();
        registry.spawn(id(1));

        assert!(registry.apply_movement(id(1), -1.0e12, f64::MAX));

        let player = registry.get(&id(1)).unwrap();
        assert_eq!(player.x, -1.0e12);
        assert_eq!(player.y, f64::MAX);
    }

    #[test]
    fn test_apply_movement_unknown_id() {
        let mut registry = Registry::new();
        registry.spawn(id(1));

        assert!(!registry.apply_movement(id(2), 5.0, 10.0));

        assert!(!registry.contains(&id(2)));
        assert_eq!(registry.get(&id(1)), Some(&PlayerState::spawn()));
    }

    #[test]
    fn test_remove() {
        let mut registry = Registry::new();
        registry.spawn(id(1));
        registry.spawn(id(2));

        assert_eq!(registry.remove(&id(1)), Some(PlayerState::spawn()));
        assert!(!registry.contains(&id(1)));
        assert!(registry.contains(&id(2)));
        assert_eq!(registry.remove(&id(1)), None);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut registry = Registry::new();
        registry.spawn(id(1));
        registry.spawn(id(2));

        let snapshot = registry.snapshot();
        registry.apply_movement(id(1), 9.0, 9.0);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(&id(1)), Some(&PlayerState::spawn()));
    }
}
