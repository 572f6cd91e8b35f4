//! WebSocket connection to the relay, run on a private tokio runtime
//!
//! The render loop is synchronous per frame, so it never awaits network I/O.
//! A background task owns the socket and exchanges decoded messages with the
//! render loop over unbounded channels.

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{decode, encode, ClientMessage, ConnectionId, ServerMessage, CONNECTION_ID_HEADER};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to start network runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

pub struct Connection {
    id: Option<ConnectionId>,
    inbound: mpsc::UnboundedReceiver<ServerMessage>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    connected: Arc<AtomicBool>,
    // Declared last so the channels close before the runtime is torn down.
    _runtime: Runtime,
}

impl Connection {
    /// Connects to `url` (for example `ws://127.0.0.1:3000`), blocking until the handshake completes.
    pub fn open(url: &str) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let (socket, response) = runtime.block_on(connect_async(url))?;

        let id = response
            .headers()
            .get(CONNECTION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<ConnectionId>().ok());

        match id {
            Some(id) => info!("Connected! Client ID: {}", id),
            None => warn!("Server did not announce a connection id, joining as spectator"),
        }

        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));

        runtime.spawn(pump(socket, inbound_tx, outbound_rx, Arc::clone(&connected)));

        Ok(Connection {
            id,
            inbound,
            outbound,
            connected,
            _runtime: runtime,
        })
    }

    pub fn id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Next message from the server, without blocking.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.inbound.try_recv().ok()
    }

    /// Queues a message for the server. Returns false once the connection is gone.
    pub fn send(&self, message: ClientMessage) -> bool {
        self.outbound.send(message).is_ok()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

async fn pump(
    socket: Socket,
    inbound: mpsc::UnboundedSender<ServerMessage>,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    connected: Arc<AtomicBool>,
) {
    let (mut sink, mut frames) = socket.split();

    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode::<ServerMessage>(&text) {
                    Ok(message) => {
                        if inbound.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring message from server: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("Server closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("Error receiving from server: {}", e);
                    break;
                }
            },

            message = outbound.recv() => match message {
                Some(message) => match encode(&message) {
                    Ok(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            error!("Error sending to server: {}", e);
                            break;
                        }
                    }
                    Err(e) => error!("Failed to encode message: {}", e),
                },
                None => {
                    let _ = sink.close().await;
                    break;
                }
            },
        }
    }

    connected.store(false, Ordering::Release);
}
