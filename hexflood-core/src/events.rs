//! Outbound game events and observers
//!
//! The rules engine never calls into presentation code. Sessions push a
//! `GameEvent` to a single `GameObserver` after every state change.

use crate::error::InvalidMove;
use crate::game::{GameState, Score, Winner};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Link state reported by the transport layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Everything a session can tell the outside world
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    StateChanged { state: Box<GameState> },
    MoveRejected { reason: InvalidMove },
    GameOver { winner: Winner, scores: Vec<Score> },
    ConnectionChanged { status: ConnectionStatus },
}

impl GameEvent {
    pub fn state_changed(state: &GameState) -> Self {
        GameEvent::StateChanged {
            state: Box::new(state.clone()),
        }
    }

    /// `GameOver` for a finished state, `None` while it is running
    pub fn game_over(state: &GameState) -> Option<Self> {
        state.winner().map(|winner| GameEvent::GameOver {
            winner: winner.clone(),
            scores: state.scores(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::StateChanged { .. } => "state_changed",
            GameEvent::MoveRejected { .. } => "move_rejected",
            GameEvent::GameOver { .. } => "game_over",
            GameEvent::ConnectionChanged { .. } => "connection_changed",
        }
    }
}

/// Receiver of session events
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Records events in order
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Names of recorded events, oldest first
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(GameEvent::name).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl GameObserver for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

/// Forwards events over a channel to another thread
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    tx: Sender<GameEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<GameEvent>) -> Self {
        Self { tx }
    }
}

impl GameObserver for ChannelObserver {
    fn on_event(&mut self, event: &GameEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("Event receiver dropped, discarding {}", event.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{short_game_state, scenario_state};
    use std::sync::mpsc;

    #[test]
    fn test_event_log_records_in_order() {
        let state = scenario_state();
        let mut log = EventLog::new();
        log.on_event(&GameEvent::state_changed(&state));
        log.on_event(&GameEvent::MoveRejected {
            reason: InvalidMove::NotYourTurn,
        });
        assert_eq!(log.names(), vec!["state_changed", "move_rejected"]);
        assert_eq!(
            log.last(),
            Some(&GameEvent::MoveRejected {
                reason: InvalidMove::NotYourTurn
            })
        );
    }

    #[test]
    fn test_game_over_only_for_finished_state() {
        let mut state = short_game_state();
        assert!(GameEvent::game_over(&state).is_none());
        state.apply_move(&"alice".into(), crate::board::Color(0)).unwrap();
        state.apply_move(&"bob".into(), crate::board::Color(1)).unwrap();
        match GameEvent::game_over(&state) {
            Some(GameEvent::GameOver { winner, scores }) => {
                assert_eq!(winner, Winner::Draw);
                assert_eq!(scores.len(), 2);
            }
            other => panic!("expected game over, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = mpsc::channel();
        let mut observer = ChannelObserver::new(tx);
        observer.on_event(&GameEvent::ConnectionChanged {
            status: ConnectionStatus::Connected,
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            GameEvent::ConnectionChanged {
                status: ConnectionStatus::Connected
            }
        );

        // A dropped receiver is not an error for the sender side
        drop(rx);
        observer.on_event(&GameEvent::ConnectionChanged {
            status: ConnectionStatus::Disconnected,
        });
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(GameEvent::MoveRejected {
            reason: InvalidMove::ColorJustUsed,
        })
        .unwrap();
        assert_eq!(json["type"], "move_rejected");
        assert_eq!(json["reason"], "color_just_used");
    }
}
