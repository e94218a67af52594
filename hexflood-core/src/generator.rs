//! Seeded board generation
//!
//! Clients and the relay rebuild the same board from `(size, seed, palette)`,
//! so the generator must be bit-for-bit reproducible. It uses its own 32-bit
//! linear congruential generator instead of `rand`'s generators, whose output
//! streams are not guaranteed stable across crate versions.

use crate::board::{Board, Color, Palette, PlayerSlot};
use crate::error::ConfigError;
use rand::RngCore;

// ============================================================================
// LINEAR CONGRUENTIAL GENERATOR
// ============================================================================

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

/// 32-bit LCG (`x' = a*x + c mod 2^32`) yielding the upper 16 bits per draw
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seed once; the 64-bit seed is folded to 32 bits
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ (seed >> 32)) as u32,
        }
    }

    /// Advance once and return a 16-bit draw
    pub fn next_draw(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state >> 16
    }

    /// Draw a color index from the palette
    fn next_color(&mut self, palette: &Palette) -> Color {
        Color((self.next_draw() % palette.len() as u32) as u8)
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        let high = self.next_draw();
        let low = self.next_draw();
        (high << 16) | low
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Generate a colored board with both starting corners owned.
///
/// One draw per tile in row-major `(q, r)` order, then player one's start
/// color, then player two's start color redrawn until it differs.
pub fn generate(size: usize, seed: u64, palette: &Palette) -> Result<Board, ConfigError> {
    palette.validate()?;
    let mut board = Board::filled(size, Color(0))?;
    let mut rng = Lcg::new(seed);

    for tile in board.tiles_mut() {
        tile.color = rng.next_color(palette);
    }

    let first = rng.next_color(palette);
    let mut second = rng.next_color(palette);
    while second == first {
        second = rng.next_color(palette);
    }

    for (slot, color) in [(PlayerSlot::One, first), (PlayerSlot::Two, second)] {
        let hex = board.start_hex(slot);
        board.set_color(hex, color);
        board.set_owner(hex, Some(slot));
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Hex;

    fn colors_of(board: &Board) -> Vec<u8> {
        board.tiles().map(|t| t.color.0).collect()
    }

    #[test]
    fn test_lcg_sequence() {
        let mut rng = Lcg::new(42);
        let draws: Vec<u32> = (0..5).map(|_| rng.next_draw()).collect();
        assert_eq!(draws, vec![16537, 5775, 37832, 14585, 24619]);
    }

    #[test]
    fn test_lcg_as_rng_core() {
        use rand::Rng;
        let mut a = Lcg::new(9);
        let mut b = Lcg::new(9);
        let xs: Vec<u64> = (0..4).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let palette = Palette::default();
        let a = generate(10, 1234, &palette).unwrap();
        let b = generate(10, 1234, &palette).unwrap();
        assert_eq!(a, b);

        let c = generate(10, 1235, &palette).unwrap();
        assert_ne!(colors_of(&a), colors_of(&c));
    }

    #[test]
    fn test_generation_pinned_colors() {
        // Independent processes must agree; pin the exact output
        let board = generate(4, 42, &Palette::default()).unwrap();
        assert_eq!(
            colors_of(&board),
            vec![1, 3, 2, 2, 1, 1, 3, 5, 2, 0, 1, 4, 3, 2, 0, 1]
        );
    }

    #[test]
    fn test_starting_corners() {
        let board = generate(6, 99, &Palette::default()).unwrap();
        let one = board.get(Hex::new(0, 5)).unwrap();
        let two = board.get(Hex::new(5, 0)).unwrap();
        assert_eq!(one.owner, Some(PlayerSlot::One));
        assert_eq!(two.owner, Some(PlayerSlot::Two));
        assert_ne!(one.color, two.color);
        assert_eq!(board.tiles().filter(|t| t.owner.is_some()).count(), 2);
    }

    #[test]
    fn test_two_color_palette_distinct_starts() {
        let palette = Palette::with_size(2).unwrap();
        for seed in 0..50 {
            let board = generate(3, seed, &palette).unwrap();
            let one = board.get(board.start_hex(PlayerSlot::One)).unwrap().color;
            let two = board.get(board.start_hex(PlayerSlot::Two)).unwrap().color;
            assert_ne!(one, two, "seed {}", seed);
        }
    }

    #[test]
    fn test_invalid_configuration() {
        let palette = Palette::default();
        assert!(matches!(
            generate(1, 0, &palette),
            Err(ConfigError::BoardTooSmall(1))
        ));
        assert!(matches!(
            generate(0, 0, &palette),
            Err(ConfigError::BoardTooSmall(0))
        ));
        assert!(matches!(
            generate(100_000, 0, &palette),
            Err(ConfigError::BoardTooLarge(100_000))
        ));
    }
}
