//! Outbound handles of the connected clients
//!
//! This module tracks every live connection together with the channel feeding
//! its socket writer. It provides:
//! - Registration and removal of connections by id
//! - Direct sends to a single client
//! - Broadcasts to every client, optionally excluding one
//!
//! Sends are fire-and-forget: a client whose writer has already gone away is
//! skipped, and its disconnect event will clean up the entry shortly after.

use log::debug;
use shared::{ConnectionId, ServerMessage};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;

/// Channel feeding one connection's socket writer.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// A connected client and the handle used to reach it
#[derive(Debug)]
pub struct Client {
    /// Identifier assigned by the transport
    pub id: ConnectionId,
    /// Remote address, kept for logging
    pub addr: SocketAddr,
    /// When the connection was registered
    pub connected_at: Instant,
    outbox: Outbox,
}

impl Client {
    pub fn new(id: ConnectionId, addr: SocketAddr, outbox: Outbox) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            outbox,
        }
    }

    /// Queues a message for this client.
    ///
    /// Returns false if the connection's writer has already shut down.
    pub fn send(&self, message: &ServerMessage) -> bool {
        self.outbox.send(message.clone()).is_ok()
    }
}

/// Manages the set of connected clients
///
/// Keys are the same connection ids used by the registry, so a broadcast
/// reaches exactly the players other clients can see.
#[derive(Debug, Default)]
pub struct ClientManager {
    clients: HashMap<ConnectionId, Client>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a connection, replacing any previous handle under the same id.
    pub fn add_client(&mut self, id: ConnectionId, addr: SocketAddr, outbox: Outbox) {
        self.clients.insert(id, Client::new(id, addr, outbox));
    }

    /// Removes a client. Returns true if it was present.
    pub fn remove_client(&mut self, id: &ConnectionId) -> bool {
        match self.clients.remove(id) {
            Some(client) => {
                debug!(
                    "Client {} from {} removed after {:?}",
                    client.id,
                    client.addr,
                    client.connected_at.elapsed()
                );
                true
            }
            None => false,
        }
    }

    /// Sends a message to one client. Returns true if it was queued.
    pub fn send_to(&self, id: ConnectionId, message: &ServerMessage) -> bool {
        match self.clients.get(&id) {
            Some(client) => {
                let queued = client.send(message);
                if !queued {
                    debug!("Client {} is gone, dropping message", id);
                }
                queued
            }
            None => false,
        }
    }

    /// Sends a message to every client except `exclude`.
    ///
    /// Returns the number of clients the message was queued for.
    pub fn broadcast(&self, message: &ServerMessage, exclude: Option<ConnectionId>) -> usize {
        let mut delivered = 0;

        for (id, client) in &self.clients {
            if Some(*id) == exclude {
                continue;
            }

            if client.send(message) {
                delivered += 1;
            } else {
                debug!("Client {} is gone, skipping broadcast", id);
            }
        }

        delivered
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.clients.contains_key(id)
    }

    pub fn client_ids(&self) -> Vec<ConnectionId> {
        self.clients.keys().copied().collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
