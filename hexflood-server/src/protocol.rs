//! Relay wire protocol
//!
//! JSON objects tagged by `type`, one per websocket text frame.

use hexflood_core::{Color, GameState, Hex, InvalidMove, MoveResponse, PlayerId, Score, Winner};
use serde::{Deserialize, Serialize};

/// Client to relay
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateChallenge {
        player_name: String,
    },
    JoinChallenge {
        code: String,
        player_name: String,
    },
    PlaceMove {
        game_id: String,
        player_id: PlayerId,
        color: Color,
    },
}

/// Relay to client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ChallengeCreated {
        code: String,
    },
    GameStart {
        game_id: String,
        /// Id the receiving client plays as
        player_id: PlayerId,
        state: Box<GameState>,
    },
    GameUpdate {
        game_id: String,
        state: Box<GameState>,
        captured: Vec<Hex>,
    },
    MoveResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<Box<GameState>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<InvalidMove>,
    },
    GameOver {
        game_id: String,
        winner: Winner,
        scores: Vec<Score>,
    },
    OpponentDisconnected {
        game_id: String,
    },
    Error {
        reason: String,
    },
}

impl ServerMessage {
    pub fn error(reason: impl ToString) -> Self {
        ServerMessage::Error {
            reason: reason.to_string(),
        }
    }

    /// `GameOver` for a finished state
    pub fn game_over(game_id: &str, state: &GameState) -> Option<Self> {
        state.winner().map(|winner| ServerMessage::GameOver {
            game_id: game_id.to_string(),
            winner: winner.clone(),
            scores: state.scores(),
        })
    }
}

impl From<MoveResponse> for ServerMessage {
    fn from(response: MoveResponse) -> Self {
        ServerMessage::MoveResult {
            success: response.success,
            state: response.new_state.map(Box::new),
            reason: response.reason,
        }
    }
}
