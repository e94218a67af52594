//! Sessions: local authority and networked mirror
//!
//! `LocalSession` owns the authoritative state for same-process play and
//! records every move for undo. `StateMirror` is the read-only copy a
//! networked client keeps of the relay's state.

use crate::board::Color;
use crate::config::GameConfig;
use crate::error::{InvalidMove, StateError};
use crate::events::{ConnectionStatus, GameEvent, GameObserver};
use crate::game::{GameState, Player, PlayerId};
use crate::hex::Hex;
use crate::history::MoveHistory;
use crate::recovery::RecoverySnapshot;
use serde::{Deserialize, Serialize};

/// Reply to a move request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub success: bool,
    #[serde(default)]
    pub captured: Vec<Hex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_state: Option<GameState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidMove>,
}

impl MoveResponse {
    fn rejected(reason: InvalidMove) -> Self {
        Self {
            success: false,
            captured: Vec::new(),
            new_state: None,
            reason: Some(reason),
        }
    }
}

// ============================================================================
// LOCAL SESSION
// ============================================================================

/// Same-process game with undo/redo
pub struct LocalSession<O> {
    state: GameState,
    history: MoveHistory,
    observer: O,
}

impl<O: GameObserver> LocalSession<O> {
    /// Create a game and announce the opening state
    pub fn start(
        config: &GameConfig,
        players: [Player; 2],
        observer: O,
    ) -> anyhow::Result<Self> {
        let state = GameState::new(config, players)?;
        let base = state.to_json()?;
        let mut session = Self {
            state,
            history: MoveHistory::new(config.history_capacity, base),
            observer,
        };

        tracing::info!(
            "Local game started: {}x{} board, seed {}, {} colors",
            config.size,
            config.size,
            config.seed,
            config.palette.len()
        );
        session.emit_state();
        Ok(session)
    }

    /// Continue from a recovery snapshot
    pub fn resume(snapshot: &RecoverySnapshot, observer: O) -> Result<Self, StateError> {
        let (state, history) = snapshot.restore()?;
        tracing::info!(
            "Resuming game at move {} (snapshot from {})",
            state.turn_number(),
            snapshot.timestamp
        );
        let mut session = Self {
            state,
            history,
            observer,
        };
        session.emit_state();
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Validate and apply a move, recording it for undo
    pub fn request_move(&mut self, player: &PlayerId, color: Color) -> MoveResponse {
        let outcome = match self.state.apply_move(player, color) {
            Ok(outcome) => outcome,
            Err(reason) => {
                tracing::debug!("Rejected move by {}: {}", player, reason);
                self.observer.on_event(&GameEvent::MoveRejected { reason });
                return MoveResponse::rejected(reason);
            }
        };

        match self.state.to_json() {
            Ok(snapshot) => {
                self.history.add_move(
                    outcome.player.clone(),
                    outcome.color,
                    outcome.captured.clone(),
                    snapshot,
                );
            }
            Err(e) => tracing::warn!("Move not recorded for undo: {}", e),
        }

        self.emit_state();
        if let Some(event) = GameEvent::game_over(&self.state) {
            self.observer.on_event(&event);
        }

        MoveResponse {
            success: true,
            captured: outcome.captured,
            new_state: Some(self.state.clone()),
            reason: None,
        }
    }

    /// Concede the game; `Ok(false)` if it had already ended
    pub fn forfeit(&mut self, player: &PlayerId) -> Result<bool, InvalidMove> {
        let changed = self.state.forfeit(player)?;
        if changed {
            self.emit_state();
            if let Some(event) = GameEvent::game_over(&self.state) {
                self.observer.on_event(&event);
            }
        }
        Ok(changed)
    }

    /// Restore the state before the latest recorded move.
    ///
    /// The restored state carries its old version number; local only.
    pub fn undo(&mut self) -> Result<bool, StateError> {
        let restored = match self.history.undo() {
            Some(raw) => GameState::from_json(raw),
            None => return Ok(false),
        };
        match restored {
            Ok(state) => {
                self.state = state;
                self.emit_state();
                Ok(true)
            }
            Err(e) => {
                self.history.redo();
                Err(e)
            }
        }
    }

    /// Re-apply the latest undone move
    pub fn redo(&mut self) -> Result<bool, StateError> {
        let restored = match self.history.redo() {
            Some(record) => GameState::from_json(&record.snapshot),
            None => return Ok(false),
        };
        match restored {
            Ok(state) => {
                self.state = state;
                self.emit_state();
                Ok(true)
            }
            Err(e) => {
                self.history.undo();
                Err(e)
            }
        }
    }

    pub fn recovery_snapshot(&self) -> Result<RecoverySnapshot, StateError> {
        RecoverySnapshot::capture(&self.state, &self.history)
    }

    fn emit_state(&mut self) {
        self.observer.on_event(&GameEvent::state_changed(&self.state));
    }
}

impl<O: GameObserver + Default> LocalSession<O> {
    /// Two named players with ids `one` and `two`, default observer
    pub fn hot_seat(config: &GameConfig, names: [&str; 2]) -> anyhow::Result<Self> {
        let players = [Player::new("one", names[0]), Player::new("two", names[1])];
        Self::start(config, players, O::default())
    }
}

// ============================================================================
// STATE MIRROR
// ============================================================================

/// Client copy of a relay-owned game
pub struct StateMirror<O> {
    state: Option<GameState>,
    status: ConnectionStatus,
    observer: O,
}

impl<O: GameObserver> StateMirror<O> {
    pub fn new(observer: O) -> Self {
        Self {
            state: None,
            status: ConnectionStatus::Disconnected,
            observer,
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Accept a pushed JSON state.
    ///
    /// Returns `Ok(false)` for stale pushes, which are dropped quietly.
    pub fn receive(&mut self, raw: &str) -> Result<bool, StateError> {
        let candidate = match &self.state {
            None => GameState::from_json(raw)?,
            Some(current) => match current.check_incoming(raw) {
                Ok(state) => state,
                Err(StateError::Stale { incoming, current }) => {
                    tracing::debug!("Ignoring stale state v{} (have v{})", incoming, current);
                    return Ok(false);
                }
                Err(e) => return Err(e),
            },
        };
        self.accept(candidate);
        Ok(true)
    }

    /// Accept an already decoded state; `false` if it is stale or malformed
    pub fn receive_state(&mut self, candidate: GameState) -> bool {
        let newer = match &self.state {
            None => true,
            Some(current) => current.validate_incoming_state(&candidate),
        };
        if !newer {
            tracing::debug!("Ignoring stale state v{}", candidate.version());
            return false;
        }
        self.accept(candidate);
        true
    }

    /// Surface a refusal relayed from the authority
    pub fn reject(&mut self, reason: InvalidMove) {
        self.observer.on_event(&GameEvent::MoveRejected { reason });
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        if self.status != status {
            self.status = status;
            self.observer
                .on_event(&GameEvent::ConnectionChanged { status });
        }
    }

    /// Forget the mirrored game before joining another
    pub fn reset(&mut self) {
        self.state = None;
    }

    fn accept(&mut self, state: GameState) {
        self.observer.on_event(&GameEvent::state_changed(&state));
        if let Some(event) = GameEvent::game_over(&state) {
            self.observer.on_event(&event);
        }
        self.state = Some(state);
    }
}
