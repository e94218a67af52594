//! Error types for board setup, move validation and state transfer

use crate::board::{Color, PlayerSlot};
use serde::{Deserialize, Serialize};

/// Invalid board or palette at game creation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board size must be at least 2, got {0}")]
    BoardTooSmall(usize),

    #[error("board size must be at most 256, got {0}")]
    BoardTooLarge(usize),

    #[error("palette needs at least 2 colors, got {0}")]
    PaletteTooSmall(usize),

    #[error("palette supports at most 255 colors, got {0}")]
    PaletteTooLarge(usize),

    #[error("board row {row} has {len} tiles, expected {size}")]
    RaggedBoard { row: usize, len: usize, size: usize },

    #[error("player ids must be distinct and non-empty")]
    InvalidPlayers,

    #[error("player {0:?} owns no tile")]
    NoTerritory(PlayerSlot),

    #[error("color {0:?} is not in the palette")]
    ColorOutsidePalette(Color),
}

/// Reason a move was refused
///
/// Returned as a value; the `Display` text is what clients show to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum InvalidMove {
    #[error("game over")]
    GameOver,

    #[error("unknown color")]
    UnknownColor,

    #[error("not your turn")]
    NotYourTurn,

    #[error("color just used")]
    ColorJustUsed,

    #[error("no captures and not a re-confirm")]
    NoCaptures,

    #[error("not a participant")]
    NotAParticipant,
}

/// Failure to accept a serialized state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("stale state: version {incoming} is not newer than {current}")]
    Stale { incoming: u64, current: u64 },

    #[error("malformed state: {0}")]
    Deserialization(String),

    #[error("state could not be encoded: {0}")]
    Serialization(String),
}
