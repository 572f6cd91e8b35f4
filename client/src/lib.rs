//! # Relay Viewer Library
//!
//! Client-side pieces of the position relay viewer: a local mirror of the
//! server registry, keyboard handling, the WebSocket connection and drawing.
//!
//! ## How the viewer stays in sync
//!
//! The viewer never simulates anything. It learns its own connection id from
//! the handshake, receives the full registry once as `currentPlayers`, and
//! afterwards only applies `newPlayer`, `playerMoved` and
//! `playerDisconnected` as they arrive. The local player is moved directly
//! from keyboard input because the server does not echo a client's own
//! movement back to it.
//!
//! ## Module Organization
//!
//! - `world`: mirror of the registry and local movement
//! - `input`: keyboard sampling and movement offsets
//! - `network`: WebSocket connection on a background runtime
//! - `rendering`: macroquad drawing of players and status
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Connection;
//! use client::world::World;
//!
//! let mut connection = Connection::open("ws://127.0.0.1:3000")?;
//! let mut world = World::new(connection.id());
//!
//! while let Some(message) = connection.try_recv() {
//!     world.apply(message);
//! }
//! if let Some(update) = world.move_local(5.0, 0.0) {
//!     connection.send(update);
//! }
//! # Ok::<(), client::network::ClientError>(())
//! ```

pub mod input;
pub mod network;
pub mod rendering;
pub mod world;
