//! # Position Relay Server Library
//!
//! This library implements a realtime position-broadcast relay. Clients open a
//! WebSocket connection, are given a player with position state, and every
//! movement they report is fanned out to all other connected clients.
//!
//! ## Core Responsibilities
//!
//! ### Session Registry
//! A table keyed by connection id holds one [`shared::PlayerState`] per live
//! connection. Players spawn at `(0, 0)` with radius 20 and only their `x`
//! and `y` ever change afterwards.
//!
//! ### Broadcasting
//! Three events drive all traffic:
//! - **connect**: the newcomer receives `currentPlayers`, everybody else `newPlayer`
//! - **movement**: everybody except the mover receives `playerMoved`
//! - **disconnect**: everybody remaining receives `playerDisconnected`
//!
//! The relay is deliberately not authoritative. Reported coordinates are stored
//! and relayed without bounds checks, interpolation or conflict resolution.
//!
//! ## Architecture Design
//!
//! ### Single-Task Event Loop
//! Each connection runs in its own task, but those tasks never touch session
//! state. They decode frames and forward [`network::NetworkEvent`]s over a
//! channel to one event loop that owns the [`session::SessionHub`]. Handlers
//! therefore run to completion one at a time and no locks are involved.
//!
//! ### Fire-and-Forget Delivery
//! Every connection has an unbounded outbound channel drained by a writer
//! task. Sends never block the event loop and are not acknowledged; a client
//! that has gone away is simply skipped until its disconnect event arrives.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! The connection id → player state table.
//!
//! ### Client Manager Module (`client_manager`)
//! Outbound handles per connection, direct sends and broadcasts with an
//! optional exclusion.
//!
//! ### Session Module (`session`)
//! The connect / movement / disconnect handlers tying the two together.
//!
//! ### Network Module (`network`)
//! TCP accept loop, WebSocket handshake, frame decoding and the event loop.
//!
//! ### Config Module (`config`)
//! Listen host and port from the command line or the `HOST` / `PORT`
//! environment variables.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("127.0.0.1:3000".parse()?).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod error;
pub mod network;
pub mod registry;
pub mod session;

pub use config::ServerConfig;
pub use error::ServerError;
pub use network::Server;
pub use session::SessionHub;
