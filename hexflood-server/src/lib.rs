//! HEXFLOOD Server - Relay and HTTP API
//!
//! This crate provides the networked backend:
//! - Challenge lobby and authoritative game rooms (relay)
//! - JSON websocket protocol
//! - Status and board endpoints
//! - Static file serving for the web client

pub mod protocol;
pub mod relay;
mod routes;
mod state;

use axum::{routing::get, Router};
use hexflood_core::GameConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use protocol::{ClientMessage, ServerMessage};
pub use relay::{ConnId, Outbox, Relay, RelayError};
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    /// Board settings for new games
    pub game: GameConfig,
    /// Fixed relay seed; random when absent
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8002,
            static_dir: "static".to_string(),
            game: GameConfig::default(),
            seed: None,
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Seeded board generation
        .route("/api/board", get(routes::board::get_board))
        // Relay protocol
        .route("/api/ws", get(routes::ws::ws_handler))
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive())
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    config.game.validate()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::with_seed(config.game.clone(), config.seed));
    let router = create_router(&config, state);

    tracing::info!("HEXFLOOD Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!(
        "New games: {}x{} board, {} colors",
        config.game.size,
        config.game.size,
        config.game.palette.len()
    );
    tracing::info!("Static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
