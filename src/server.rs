//! Sign-up server: static pages plus the relay WebSocket endpoint.
//!
//! This module provides the thin server half of the enrollment flow:
//! - Serves the sign-up pages from a static directory (`/`, `/login.html`,
//!   `/signUp.html`, `/signUpMobile.html`, ...)
//! - Serves recognition model files under `/models`
//! - Echoes every text message on `/ws` back to the sender, prefixed with
//!   a fixed label
//!
//! TLS termination is expected in front of the server; it binds plain
//! HTTP/WS on the configured port.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Label prepended to every echoed relay message.
pub const ECHO_PREFIX: &str = "server received: ";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Directory holding the sign-up pages
    pub static_path: PathBuf,
    /// Directory holding the recognition model files
    pub models_path: PathBuf,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(port: u16, static_path: PathBuf, models_path: PathBuf) -> Self {
        Self {
            port,
            static_path,
            models_path,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8443,
            static_path: PathBuf::from("public"),
            models_path: PathBuf::from("models"),
        }
    }
}

/// Shared server state
pub struct ServerState {
    /// Currently connected relay clients
    connections: AtomicU64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub relay_clients: u64,
}

/// GET /health
async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        relay_clients: state.connections.load(Ordering::Relaxed),
    })
}

/// GET /ws — relay endpoint upgrade.
async fn ws_handler(
    State(state): State<Arc<ServerState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_relay_client(socket, state))
}

/// Echo every received text frame back with the fixed label prefix.
async fn handle_relay_client(mut socket: WebSocket, state: Arc<ServerState>) {
    state.connections.fetch_add(1, Ordering::Relaxed);
    tracing::info!("relay client connected");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                tracing::info!(len = text.len(), "relay message received");
                let reply = format!("{ECHO_PREFIX}{text}");
                if socket.send(Message::Text(reply)).await.is_err() {
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!("ignoring binary relay frame");
            }
            Message::Close(_) => {
                break;
            }
            // Ping/pong handled by axum
            _ => {}
        }
    }

    state.connections.fetch_sub(1, Ordering::Relaxed);
    tracing::info!("relay client disconnected");
}

/// Run the sign-up server.
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState {
        connections: AtomicU64::new(0),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .nest_service("/models", ServeDir::new(&config.models_path))
        .fallback_service(ServeDir::new(&config.static_path))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("sign-up server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("server shutdown signal received");
            })
            .await
        {
            tracing::error!("server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_port() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8443);
        assert_eq!(config.static_path, PathBuf::from("public"));
    }

    #[test]
    fn test_echo_prefix_is_stable() {
        // Clients strip this exact prefix when displaying echoes.
        assert_eq!(ECHO_PREFIX, "server received: ");
    }
}
