//! Hand-built boards shared by unit tests

use crate::board::{Board, Color, Palette, PlayerSlot};
use crate::game::{GameState, Player};
use crate::hex::Hex;

pub(crate) const A: Color = Color(0);
pub(crate) const B: Color = Color(1);

fn players() -> [Player; 2] {
    [Player::new("alice", "Alice"), Player::new("bob", "Bob")]
}

fn claim(board: &mut Board, hex: Hex, slot: PlayerSlot) {
    board.set_owner(hex, Some(slot));
}

/// 3x3, two colors. Player one at (0,2) on A, player two at (2,0) on B;
/// everything else B except (0,1) and (1,2).
pub(crate) fn scenario_board() -> Board {
    let mut board = Board::from_colors(&[
        vec![B, A, A],
        vec![B, B, A],
        vec![B, B, B],
    ])
    .unwrap();
    claim(&mut board, Hex::new(0, 2), PlayerSlot::One);
    claim(&mut board, Hex::new(2, 0), PlayerSlot::Two);
    board
}

pub(crate) fn scenario_state() -> GameState {
    GameState::from_board(scenario_board(), Palette::with_size(2).unwrap(), players()).unwrap()
}

/// 3x3, three colors, ends after three capturing moves
pub(crate) fn race_state() -> GameState {
    let c = |i: u8| Color(i);
    let mut board = Board::from_colors(&[
        vec![c(2), c(2), c(0)],
        vec![c(0), c(1), c(2)],
        vec![c(1), c(0), c(0)],
    ])
    .unwrap();
    claim(&mut board, Hex::new(0, 2), PlayerSlot::One);
    claim(&mut board, Hex::new(2, 0), PlayerSlot::Two);
    GameState::from_board(board, Palette::with_size(3).unwrap(), players()).unwrap()
}

/// 2x2, three colors, ends in a draw after two moves
pub(crate) fn short_game_state() -> GameState {
    let mut board = Board::from_colors(&[
        vec![Color(0), Color(1)],
        vec![Color(2), Color(1)],
    ])
    .unwrap();
    claim(&mut board, Hex::new(0, 1), PlayerSlot::One);
    claim(&mut board, Hex::new(1, 0), PlayerSlot::Two);
    GameState::from_board(board, Palette::with_size(3).unwrap(), players()).unwrap()
}

/// All 720 orderings of the six directions
pub(crate) fn all_direction_orders() -> Vec<[usize; 6]> {
    fn permute(prefix: &mut Vec<usize>, out: &mut Vec<[usize; 6]>) {
        if prefix.len() == 6 {
            let mut order = [0; 6];
            order.copy_from_slice(prefix);
            out.push(order);
            return;
        }
        for dir in 0..6 {
            if !prefix.contains(&dir) {
                prefix.push(dir);
                permute(prefix, out);
                prefix.pop();
            }
        }
    }

    let mut out = Vec::with_capacity(720);
    permute(&mut Vec::with_capacity(6), &mut out);
    out
}
