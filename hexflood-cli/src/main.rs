//! HEXFLOOD CLI - Command-line interface
//!
//! Commands:
//! - serve: Run the relay server
//! - play: Hot-seat game in the terminal
//! - simulate: Batch games between computer players

mod play;
mod server;
mod simulate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexflood")]
#[command(about = "HEXFLOOD two-player hex territory game")]
struct Cli {
    /// Seed for boards, challenge codes and AI choices
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Serve(server::ServerArgs),
    /// Play a hot-seat game in the terminal
    Play(play::PlayArgs),
    /// Play many games between computer players
    Simulate(simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args, cli.seed),
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Simulate(args) => simulate::run(args, cli.seed),
    }
}
