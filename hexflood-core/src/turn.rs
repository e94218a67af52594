//! Turn state machine
//!
//! Two states (player one to move, player two to move) plus a terminal
//! flag. The only transition is `advance`, taken after an applied move;
//! `finish` is a sink.

use crate::board::PlayerSlot;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnController {
    turn: PlayerSlot,
    over: bool,
}

impl Default for TurnController {
    fn default() -> Self {
        Self {
            turn: PlayerSlot::One,
            over: false,
        }
    }
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Player to move; meaningless once the game is over
    pub fn current(&self) -> PlayerSlot {
        self.turn
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Whether `slot` may move right now
    pub fn is_turn_of(&self, slot: PlayerSlot) -> bool {
        !self.over && self.turn == slot
    }

    /// Hand the turn to the other player. No-op once over.
    pub fn advance(&mut self) -> PlayerSlot {
        if !self.over {
            self.turn = self.turn.opponent();
        }
        self.turn
    }

    /// Enter the terminal state
    pub fn finish(&mut self) {
        self.over = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternates() {
        let mut turn = TurnController::new();
        assert_eq!(turn.current(), PlayerSlot::One);
        assert_eq!(turn.advance(), PlayerSlot::Two);
        assert!(turn.is_turn_of(PlayerSlot::Two));
        assert!(!turn.is_turn_of(PlayerSlot::One));
        assert_eq!(turn.advance(), PlayerSlot::One);
    }

    #[test]
    fn test_finish_is_terminal() {
        let mut turn = TurnController::new();
        turn.advance();
        turn.finish();
        assert!(turn.is_over());
        assert_eq!(turn.advance(), PlayerSlot::Two);
        assert!(!turn.is_turn_of(PlayerSlot::Two));
        turn.finish();
        assert!(turn.is_over());
    }
}
