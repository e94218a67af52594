//! HEXFLOOD Core - Rules engine
//!
//! This crate provides the core game logic for HEXFLOOD:
//! - Hex geometry (axial coordinates, pixel projection)
//! - Seeded board generation
//! - Territory capture by flood fill
//! - Game state, turn order, scoring and serialization
//! - Local sessions with undo/redo and recovery snapshots
//! - Simple computer players

pub mod hex;
pub mod board;
pub mod error;
pub mod generator;
pub mod territory;
pub mod turn;
pub mod game;
pub mod config;
pub mod history;
pub mod events;
pub mod session;
pub mod recovery;
pub mod ai;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use hex::{axial_round, Hex, Layout, DIRECTIONS};
pub use board::{
    check_board_size, Board, Color, Palette, PlayerSlot, Tile, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE,
    MIN_BOARD_SIZE,
};
pub use error::{ConfigError, InvalidMove, StateError};
pub use generator::{generate, Lcg};
pub use territory::{capture_set, TerritoryResolver};
pub use turn::TurnController;
pub use game::{GameState, MoveOutcome, Player, PlayerId, Score, Winner};
pub use config::GameConfig;
pub use history::{MoveHistory, MoveRecord, DEFAULT_HISTORY_CAPACITY};
pub use events::{ChannelObserver, ConnectionStatus, EventLog, GameEvent, GameObserver, NullObserver};
pub use session::{LocalSession, MoveResponse, StateMirror};
pub use recovery::{
    clear_recovery, load_recovery, save_recovery, BlobStore, FileStore, MemoryStore,
    RecoverySnapshot,
};
pub use ai::{choose_color, play_game, AiPlayer, Strategy};
