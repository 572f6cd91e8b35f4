//! Server network layer handling WebSocket connections and the event loop

use crate::client_manager::Outbox;
use crate::error::ServerError;
use crate::session::SessionHub;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{decode, encode, ClientMessage, ConnectionId, ServerMessage, CONNECTION_ID_HEADER};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

/// Events sent from connection tasks to the event loop
#[derive(Debug)]
pub enum NetworkEvent {
    Connected {
        id: ConnectionId,
        addr: SocketAddr,
        outbox: Outbox,
    },
    Message {
        id: ConnectionId,
        message: ClientMessage,
    },
    Disconnected {
        id: ConnectionId,
    },
}

/// Hands out connection ids in accept order, starting at 1
#[derive(Debug)]
pub struct ConnectionIdAllocator {
    next: u64,
}

impl ConnectionIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> ConnectionId {
        let id = ConnectionId::new(self.next);
        self.next += 1;
        id
    }
}

impl Default for ConnectionIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay server: a TCP listener plus the session state it drives
pub struct Server {
    listener: TcpListener,
    hub: SessionHub,
}

impl Server {
    pub async fn bind(addr: SocketAddr) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Server {
            listener,
            hub: SessionHub::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs until the process is stopped.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop and the event loop until `shutdown` completes.
    ///
    /// All session state is touched from this one task; connection tasks only
    /// talk to it through the event channel.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let Server { listener, mut hub } = self;
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        info!("Server listening on {}", listener.local_addr()?);
        let accept_task = tokio::spawn(accept_loop(listener, event_tx));

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    match event {
                        Some(event) => dispatch(&mut hub, event),
                        None => {
                            error!("Event channel closed, stopping server");
                            break;
                        }
                    }
                },
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    break;
                }
            }
        }

        accept_task.abort();
        Ok(())
    }
}

/// Applies one network event to the session state
pub fn dispatch(hub: &mut SessionHub, event: NetworkEvent) {
    match event {
        NetworkEvent::Connected { id, addr, outbox } => {
            hub.on_connect(id, addr, outbox);
        }
        NetworkEvent::Message { id, message } => hub.handle(id, message),
        NetworkEvent::Disconnected { id } => hub.on_disconnect(id),
    }
}

/// Accepts TCP connections and spawns a task per connection
async fn accept_loop(listener: TcpListener, events: mpsc::UnboundedSender<NetworkEvent>) {
    let mut ids = ConnectionIdAllocator::new();

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let id = ids.allocate();
                tokio::spawn(handle_connection(stream, addr, id, events.clone()));
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

/// Drives one WebSocket connection from handshake to close
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    id: ConnectionId,
    events: mpsc::UnboundedSender<NetworkEvent>,
) {
    let announce_id = move |_: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        response
            .headers_mut()
            .insert(CONNECTION_ID_HEADER, HeaderValue::from(id.get()));
        Ok(response)
    };

    let socket = match accept_hdr_async(stream, announce_id).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (mut sink, mut frames) = socket.split();
    let (outbox, mut outbound) = mpsc::unbounded_channel::<ServerMessage>();

    if events
        .send(NetworkEvent::Connected { id, addr, outbox })
        .is_err()
    {
        return;
    }

    // Ends once the session drops this client's outbox or the socket fails.
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let text = match encode(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode message for client {}: {}", id, e);
                    continue;
                }
            };

            if let Err(e) = sink.send(Message::Text(text)).await {
                debug!("Failed to send to client {}: {}", id, e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(Message::Text(text)) => match decode::<ClientMessage>(&text) {
                Ok(message) => {
                    if events.send(NetworkEvent::Message { id, message }).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Dropping malformed message from client {}: {}", id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Connection to client {} failed: {}", id, e);
                break;
            }
        }
    }

    let _ = events.send(NetworkEvent::Disconnected { id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Movement, PlayerState};
    use tokio_test::assert_ok;

    fn local() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn test_allocator_starts_at_one_and_never_repeats() {
        let mut ids = ConnectionIdAllocator::new();

        let first = ids.allocate();
        let second = ids.allocate();
        let third = ids.allocate();

        assert_eq!(first, ConnectionId::new(1));
        assert_eq!(second, ConnectionId::new(2));
        assert_eq!(third, ConnectionId::new(3));
    }

    #[test]
    fn test_dispatch_drives_hub() {
        let mut hub = SessionHub::new();
        let (outbox, mut inbox) = mpsc::unbounded_channel();
        let id = ConnectionId::new(1);

        dispatch(
            &mut hub,
            NetworkEvent::Connected {
                id,
                addr: "127.0.0.1:5000".parse().unwrap(),
                outbox,
            },
        );
        dispatch(
            &mut hub,
            NetworkEvent::Message {
                id,
                message: ClientMessage::PlayerMovement(Movement { x: 2.0, y: 3.0 }),
            },
        );

        assert_eq!(hub.player(&id), Some(&PlayerState::new(2.0, 3.0, 20.0)));
        assert!(matches!(
            inbox.try_recv(),
            Ok(ServerMessage::CurrentPlayers(_))
        ));
        assert!(inbox.try_recv().is_err());

        dispatch(&mut hub, NetworkEvent::Disconnected { id });
        assert!(hub.player(&id).is_none());
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = assert_ok!(Server::bind(local()).await);
        let addr = assert_ok!(server.local_addr());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let first = assert_ok!(Server::bind(local()).await);
        let taken = assert_ok!(first.local_addr());

        match Server::bind(taken).await {
            Err(ServerError::Bind { addr, .. }) => assert_eq!(addr, taken),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Second bind on {} should fail", taken),
        }
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let server = assert_ok!(Server::bind(local()).await);
        let result = server.run_until(async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_handshake_announces_connection_id() {
        let server = assert_ok!(Server::bind(local()).await);
        let addr = assert_ok!(server.local_addr());
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = stop_rx.await;
        }));

        let url = format!("ws://{}", addr);
        let (_socket, response) = assert_ok!(tokio_tungstenite::connect_async(url).await);

        let header = response
            .headers()
            .get(CONNECTION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        assert_eq!(header.as_deref(), Some("1"));

        let _ = stop_tx.send(());
        assert!(handle.await.unwrap().is_ok());
    }
}
