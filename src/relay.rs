//! Relay client for sending averaged descriptors to the sign-up server.
//!
//! The transport is a plain WebSocket carrying UTF-8 text payloads. The
//! outbound payload is the averaged descriptor serialized as a JSON array
//! of floats; the server answers every message with a labeled echo, which
//! is returned to the caller for display and session logging. There is no
//! protocol beyond that and no retry policy: a failed send is terminal for
//! that send only.

use crate::core::Descriptor;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for the server's echo before giving up.
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay host (default: 127.0.0.1)
    pub host: String,
    /// Relay port
    pub port: u16,
}

impl RelayConfig {
    /// Create a new relay configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the WebSocket endpoint URL.
    ///
    /// TLS termination sits in front of the server, so the client speaks
    /// plain `ws` to it.
    pub fn url(&self) -> String {
        format!("ws://{}:{}/ws", self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8443,
        }
    }
}

/// Relay client error types.
#[derive(Debug)]
pub enum RelayError {
    /// Configuration error
    Config(String),
    /// Connection or socket error
    Network(String),
    /// Payload could not be serialized or the reply was malformed
    Protocol(String),
    /// The server closed the connection
    Closed,
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Config(msg) => write!(f, "relay config error: {msg}"),
            RelayError::Network(msg) => write!(f, "relay network error: {msg}"),
            RelayError::Protocol(msg) => write!(f, "relay protocol error: {msg}"),
            RelayError::Closed => write!(f, "relay connection closed by server"),
        }
    }
}

impl std::error::Error for RelayError {}

/// Generate a client id from the hostname plus a short unique suffix.
fn generate_client_id() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "enroll-{}-{}",
        hostname,
        &uuid::Uuid::new_v4().to_string()[..8]
    )
}

/// WebSocket relay client.
pub struct RelayClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    client_id: String,
}

impl RelayClient {
    /// Connect to the relay endpoint.
    pub async fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let url = config.url();
        let (stream, _response) = connect_async(&url)
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        let client_id = generate_client_id();
        tracing::info!("relay connected to {url} as {client_id}");

        Ok(Self { stream, client_id })
    }

    /// Send a text payload and wait for the server's echo.
    pub async fn send_text(&mut self, text: &str) -> Result<String, RelayError> {
        self.stream
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        loop {
            let next = tokio::time::timeout(REPLY_TIMEOUT, self.stream.next())
                .await
                .map_err(|_| RelayError::Network("timed out waiting for relay reply".to_string()))?;

            match next {
                None => return Err(RelayError::Closed),
                Some(Err(e)) => return Err(RelayError::Network(e.to_string())),
                Some(Ok(Message::Text(reply))) => return Ok(reply),
                Some(Ok(Message::Close(_))) => return Err(RelayError::Closed),
                Some(Ok(_)) => continue,
            }
        }
    }

    /// Send an averaged descriptor as a JSON array of floats.
    pub async fn send_descriptor(&mut self, descriptor: &Descriptor) -> Result<String, RelayError> {
        let payload = serde_json::to_string(descriptor.values())
            .map_err(|e| RelayError::Protocol(e.to_string()))?;
        self.send_text(&payload).await
    }

    /// Close the connection.
    pub async fn close(mut self) -> Result<(), RelayError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| RelayError::Network(e.to_string()))
    }

    /// Get the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// Blocking relay client for use in synchronous contexts.
pub struct BlockingRelayClient {
    inner: RelayClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingRelayClient {
    /// Connect to the relay endpoint.
    pub fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create runtime: {e}")))?;

        let inner = runtime.block_on(RelayClient::connect(config))?;

        Ok(Self { inner, runtime })
    }

    /// Send a text payload and wait for the server's echo.
    pub fn send_text(&mut self, text: &str) -> Result<String, RelayError> {
        self.runtime.block_on(self.inner.send_text(text))
    }

    /// Send an averaged descriptor as a JSON array of floats.
    pub fn send_descriptor(&mut self, descriptor: &Descriptor) -> Result<String, RelayError> {
        self.runtime.block_on(self.inner.send_descriptor(descriptor))
    }

    /// Close the connection.
    pub fn close(self) -> Result<(), RelayError> {
        self.runtime.block_on(self.inner.close())
    }

    /// Get the client id.
    pub fn client_id(&self) -> &str {
        self.inner.client_id()
    }
}
