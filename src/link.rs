// Persistent TCP link to the remote controller
//
// The controller expects newline-terminated text tokens. The link owns the
// socket; a failed write tears the connection down so the caller reconnects
// before the next send.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::{BACKOFF_MAX, BACKOFF_MIN};
use crate::messages::ControlVector;

/// Error types for controller communication
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[from] std::io::Error),

    #[error("not connected")]
    NotConnected,
}

/// TCP client for the controller endpoint
pub struct ControllerLink {
    addr: String,
    stream: Option<TcpStream>,
    backoff: Duration,
}

impl ControllerLink {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            stream: None,
            backoff: BACKOFF_MIN,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Single connection attempt
    pub async fn connect(&mut self) -> Result<(), LinkError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .and_then(|s| {
                // Tokens are a handful of bytes; don't let Nagle hold them
                s.set_nodelay(true)?;
                Ok(s)
            })
            .map_err(|source| LinkError::Connect {
                addr: self.addr.clone(),
                source,
            })?;

        info!("Connected to controller at {}", self.addr);
        self.stream = Some(stream);
        self.backoff = BACKOFF_MIN;
        Ok(())
    }

    /// Retry connecting with bounded exponential backoff until it sticks
    pub async fn ensure_connected(&mut self) {
        while !self.is_connected() {
            if let Err(e) = self.connect().await {
                warn!("{}; retrying in {:?}", e, self.backoff);
                tokio::time::sleep(self.backoff).await;
                self.backoff = (self.backoff * 2).min(BACKOFF_MAX);
            }
        }
    }

    /// Write one vector token to the controller
    pub async fn send(&mut self, vector: &ControlVector) -> Result<(), LinkError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(LinkError::NotConnected);
        };

        let token = vector.to_token();
        debug!("tx {}", token.trim_end());

        if let Err(e) = stream.write_all(token.as_bytes()).await {
            // Drop the dead socket; next send goes through a reconnect
            self.stream = None;
            return Err(LinkError::Send(e));
        }
        Ok(())
    }
}
