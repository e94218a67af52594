//! Server command - start the relay server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to hexflood-server crate)
//! - Level 4: configuration validation

use std::path::Path;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexflood_core::{GameConfig, DEFAULT_BOARD_SIZE};
use hexflood_server::{run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8002")]
    pub port: u16,

    /// Directory containing static files for the web client
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Board edge length for new games
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    pub size: usize,

    /// Number of palette colors for new games
    #[arg(long, default_value = "6")]
    pub colors: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// This function reads like a table of contents:
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServerArgs, seed: Option<u64>) -> Result<()> {
    let config = configure_server(&args, seed)?;

    tracing::info!("Starting HEXFLOOD relay on port {}", config.port);

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs, seed: Option<u64>) -> Result<ServerConfig> {
    validate_static_dir(&args.static_dir)?;

    let game = GameConfig::new(args.size, 0)
        .with_colors(args.colors)
        .context("Invalid palette size")?;
    game.validate().context("Invalid board settings")?;

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.to_string_lossy().to_string(),
        game,
        seed,
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    // Create tokio runtime for async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Validate that static directory exists
fn validate_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but may not serve files.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServerArgs {
        ServerArgs {
            port: 8002,
            static_dir: PathBuf::from("test_static"),
            size: 9,
            colors: 5,
        }
    }

    #[test]
    fn test_configure_server_defaults() {
        let config = configure_server(&args(), Some(3)).unwrap();
        assert_eq!(config.port, 8002);
        assert_eq!(config.static_dir, "test_static");
        assert_eq!(config.game.size, 9);
        assert_eq!(config.game.palette.len(), 5);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_configure_server_rejects_bad_board() {
        let mut bad = args();
        bad.size = 1;
        assert!(configure_server(&bad, None).is_err());

        let mut bad = args();
        bad.colors = 1;
        assert!(configure_server(&bad, None).is_err());
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(Path::new("/nonexistent/path"));
        assert!(result.is_ok());
    }
}
