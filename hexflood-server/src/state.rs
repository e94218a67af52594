//! Server state management
//!
//! Shared state handed to every handler: the relay that owns all live
//! games, plus the board settings used by the board endpoint.

use crate::relay::Relay;
use hexflood_core::GameConfig;

/// Server-wide shared state
pub struct ServerState {
    pub relay: Relay,
    /// Defaults for new games and for `/api/board`
    pub game: GameConfig,
}

impl ServerState {
    pub fn new(game: GameConfig) -> Self {
        Self::with_seed(game, None)
    }

    /// Fixed relay seed for reproducible codes and boards
    pub fn with_seed(game: GameConfig, seed: Option<u64>) -> Self {
        Self {
            relay: Relay::new(game.clone(), seed),
            game,
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
