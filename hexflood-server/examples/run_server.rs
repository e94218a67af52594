//! Example to run the HEXFLOOD relay standalone
//!
//! Run with: cargo run -p hexflood-server --example run_server

use hexflood_core::GameConfig;
use hexflood_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig {
        port: 8002,
        static_dir: "static".to_string(),
        game: GameConfig::new(12, 0).with_colors(6)?,
        seed: None,
    };

    println!("Starting HEXFLOOD relay on port {}", config.port);
    println!("Static files from: {}", config.static_dir);
    println!("Websocket at ws://localhost:{}/api/ws", config.port);

    run_server(config).await
}
