//! Capture resolution
//!
//! Breadth-first flood fill over unowned tiles of the chosen color that touch
//! a player's territory. Uses an explicit queue, so board size never limits
//! stack depth.

use crate::board::{Board, Color, PlayerSlot};
use crate::hex::{Hex, DIRECTIONS};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Computes capture sets; the direction order only affects discovery order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerritoryResolver {
    order: [usize; 6],
}

impl Default for TerritoryResolver {
    fn default() -> Self {
        Self {
            order: [0, 1, 2, 3, 4, 5],
        }
    }
}

impl TerritoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver enumerating neighbors in a custom order.
    ///
    /// Returns `None` unless `order` is a permutation of `0..6`.
    pub fn with_direction_order(order: [usize; 6]) -> Option<Self> {
        let mut seen = [false; 6];
        for &dir in &order {
            if dir >= DIRECTIONS.len() || seen[dir] {
                return None;
            }
            seen[dir] = true;
        }
        Some(Self { order })
    }

    fn neighbors(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        self.order.iter().map(move |&dir| hex.neighbor(dir))
    }

    /// Unowned tiles of `color` connected to `slot`'s territory, in
    /// discovery order.
    pub fn capture_set(&self, board: &Board, slot: PlayerSlot, color: Color) -> Vec<Hex> {
        let mut visited: FxHashSet<Hex> = FxHashSet::default();
        let mut queue: VecDeque<Hex> = VecDeque::new();
        let mut captured = Vec::new();

        // Frontier: capturable neighbors of the current territory
        for tile in board.owned_by(slot) {
            for next in self.neighbors(tile.hex) {
                if is_capturable(board, next, color) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        while let Some(hex) = queue.pop_front() {
            captured.push(hex);
            for next in self.neighbors(hex) {
                if is_capturable(board, next, color) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        captured
    }
}

/// Capture set with the default direction order
pub fn capture_set(board: &Board, slot: PlayerSlot, color: Color) -> Vec<Hex> {
    TerritoryResolver::default().capture_set(board, slot, color)
}

fn is_capturable(board: &Board, hex: Hex, color: Color) -> bool {
    board
        .get(hex)
        .is_some_and(|tile| tile.owner.is_none() && tile.color == color)
}
