//! Computer players
//!
//! Two simple color pickers used for batch simulation and as stand-in
//! opponents. Both only ever return legal colors.

use crate::board::Color;
use crate::game::GameState;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// STRATEGY
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniformly random legal color
    Random,
    /// Largest immediate capture, random among ties
    Greedy,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Random, Strategy::Greedy];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown strategy '{}' (expected random or greedy)", s))
    }
}

// ============================================================================
// AI PLAYER
// ============================================================================

pub struct AiPlayer {
    pub strategy: Strategy,
    rng: ChaCha8Rng,
}

impl AiPlayer {
    pub fn new(strategy: Strategy) -> Self {
        Self::with_seed(strategy, 42)
    }

    pub fn with_seed(strategy: Strategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Color for the player to move, `None` once the game is over
    pub fn choose_color(&mut self, state: &GameState) -> Option<Color> {
        choose_color(self.strategy, state, &mut self.rng)
    }
}

/// Pick a legal color for the player to move
pub fn choose_color<R: Rng>(strategy: Strategy, state: &GameState, rng: &mut R) -> Option<Color> {
    if state.is_over() {
        return None;
    }
    let mover = state.current_player();
    let legal = state.legal_colors(&mover.id);

    match strategy {
        Strategy::Random => legal.choose(rng).copied(),
        Strategy::Greedy => {
            let slot = state.current_slot();
            let scored: Vec<(Color, usize)> = legal
                .into_iter()
                .map(|color| (color, state.preview_capture(slot, color).len()))
                .collect();
            let best = scored.iter().map(|&(_, n)| n).max()?;
            let ties: Vec<Color> = scored
                .into_iter()
                .filter(|&(_, n)| n == best)
                .map(|(color, _)| color)
                .collect();
            ties.choose(rng).copied()
        }
    }
}

/// Play `initial` to the end (or `max_turns`) with one AI per slot.
///
/// Returns the final state and the colors played in order.
pub fn play_game(
    initial: GameState,
    players: &mut [AiPlayer; 2],
    max_turns: u32,
) -> (GameState, Vec<Color>) {
    let mut state = initial;
    let mut colors = Vec::new();

    while !state.is_over() && state.turn_number() < max_turns {
        let slot = state.current_slot();
        let Some(color) = players[slot.index()].choose_color(&state) else {
            break;
        };
        let mover = state.current_player().id.clone();
        match state.apply_move(&mover, color) {
            Ok(_) => colors.push(color),
            Err(reason) => {
                tracing::warn!("AI picked an illegal color {}: {}", color.0, reason);
                break;
            }
        }
    }

    (state, colors)
}

// ============================================================================
// TESTS
// ============================================================================
