use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid listen host {0:?}, expected an IP address")]
    InvalidHost(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
