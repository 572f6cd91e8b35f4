//! Session registry and broadcaster.
//!
//! [`SessionHub`] owns the player registry and the client table and reacts to
//! the three connection events. It is driven from a single task, so every
//! handler runs to completion before the next one starts and no locking is
//! needed.

use crate::client_manager::{ClientManager, Outbox};
use crate::registry::Registry;
use log::{debug, info};
use shared::{ClientMessage, ConnectionId, Movement, PlayerState, ServerMessage};
use std::net::SocketAddr;

#[derive(Debug, Default)]
pub struct SessionHub {
    registry: Registry,
    clients: ClientManager,
}

impl SessionHub {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            clients: ClientManager::new(),
        }
    }

    /// Registers a new connection and spawns its player.
    ///
    /// The new client receives the full registry, itself included. Every
    /// other client is told about the new player.
    pub fn on_connect(&mut self, id: ConnectionId, addr: SocketAddr, outbox: Outbox) -> PlayerState {
        let player = self.registry.spawn(id);
        self.clients.add_client(id, addr, outbox);
        info!("New client connected: {} ({})", id, addr);

        self.clients
            .send_to(id, &ServerMessage::CurrentPlayers(self.registry.snapshot()));
        self.clients.broadcast(
            &ServerMessage::NewPlayer {
                id,
                player_data: player,
            },
            Some(id),
        );

        player
    }

    /// Applies a reported position and relays it to everyone but the mover.
    ///
    /// A movement for an id that is no longer registered (it raced with the
    /// disconnect) is dropped. Returns whether the update was applied.
    pub fn on_movement(&mut self, id: ConnectionId, movement: Movement) -> bool {
        if !self.registry.apply_movement(id, movement.x, movement.y) {
            debug!("Ignoring movement from unknown client {}", id);
            return false;
        }

        self.clients.broadcast(
            &ServerMessage::PlayerMoved {
                id,
                x: movement.x,
                y: movement.y,
            },
            Some(id),
        );
        true
    }

    /// Forgets a connection and tells the remaining clients.
    pub fn on_disconnect(&mut self, id: ConnectionId) {
        self.registry.remove(&id);
        self.clients.remove_client(&id);
        info!("Client disconnected: {}", id);

        self.clients
            .broadcast(&ServerMessage::PlayerDisconnected(id), None);
    }

    /// Routes a decoded client message to its handler.
    pub fn handle(&mut self, id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::PlayerMovement(movement) => {
                self.on_movement(id, movement);
            }
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn player(&self, id: &ConnectionId) -> Option<&PlayerState> {
        self.registry.get(id)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
