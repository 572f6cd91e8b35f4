//! Client-side mirror of the server registry.

use shared::{ClientMessage, ConnectionId, Movement, PlayerState, ServerMessage};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct World {
    players: HashMap<ConnectionId, PlayerState>,
    local_id: Option<ConnectionId>,
}

impl World {
    /// `local_id` is the id the server announced during the handshake, if any.
    pub fn new(local_id: Option<ConnectionId>) -> Self {
        Self {
            players: HashMap::new(),
            local_id,
        }
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::CurrentPlayers(players) => {
                self.players = players;
            }
            ServerMessage::NewPlayer { id, player_data } => {
                self.players.insert(id, player_data);
            }
            ServerMessage::PlayerMoved { id, x, y } => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.x = x;
                    player.y = y;
                }
            }
            ServerMessage::PlayerDisconnected(id) => {
                self.players.remove(&id);
            }
        }
    }

    /// Moves the local player by the given offset and returns the update to send.
    ///
    /// The server never echoes our own movement back, so the local copy is
    /// updated here. Returns `None` while we have no player yet.
    pub fn move_local(&mut self, dx: f64, dy: f64) -> Option<ClientMessage> {
        let id = self.local_id?;
        let player = self.players.get_mut(&id)?;

        player.x += dx;
        player.y += dy;

        Some(ClientMessage::PlayerMovement(Movement {
            x: player.x,
            y: player.y,
        }))
    }

    pub fn local_player(&self) -> Option<&PlayerState> {
        self.local_id.and_then(|id| self.players.get(&id))
    }

    pub fn player(&self, id: &ConnectionId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Players ordered by id, so drawing order is stable between frames.
    pub fn sorted_players(&self) -> Vec<(ConnectionId, PlayerState)> {
        let mut players: Vec<_> = self.players.iter().map(|(id, p)| (*id, *p)).collect();
        players.sort_by_key(|(id, _)| *id);
        players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
