//! Command-line and environment configuration for the relay server.

use crate::error::ServerError;
use clap::Parser;
use shared::DEFAULT_PORT;
use std::net::{IpAddr, SocketAddr};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Realtime position broadcast relay")]
pub struct ServerConfig {
    /// IP address to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ServerConfig {
    /// Resolves the listen address. The host must be an IP literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ServerError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}
