//! Board, tiles and color palette

use crate::error::ConfigError;
use crate::hex::Hex;
use serde::{Deserialize, Serialize};

/// Smallest playable board edge
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest board edge; keeps tile counts small and coordinates within `i32`
pub const MAX_BOARD_SIZE: usize = 256;

/// Check a board edge against both bounds
pub fn check_board_size(size: usize) -> Result<(), ConfigError> {
    if size < MIN_BOARD_SIZE {
        return Err(ConfigError::BoardTooSmall(size));
    }
    if size > MAX_BOARD_SIZE {
        return Err(ConfigError::BoardTooLarge(size));
    }
    Ok(())
}

/// Default board edge length
pub const DEFAULT_BOARD_SIZE: usize = 12;

// ============================================================================
// COLORS
// ============================================================================

/// Index into the game's palette
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u8);

impl Color {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordered set of named colors
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    names: Vec<String>,
}

impl Palette {
    /// Build a palette from color names
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette = Self {
            names: names.into_iter().map(Into::into).collect(),
        };
        palette.validate()?;
        Ok(palette)
    }

    /// First `count` colors of the standard palette, then numbered colors
    pub fn with_size(count: usize) -> Result<Self, ConfigError> {
        if count > u8::MAX as usize {
            return Err(ConfigError::PaletteTooLarge(count));
        }
        let names = (0..count).map(|i| match STANDARD_COLORS.get(i) {
            Some(name) => (*name).to_string(),
            None => format!("color-{}", i),
        });
        Self::new(names)
    }

    /// Check palette size against what the rules need
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.names.len() < 2 {
            return Err(ConfigError::PaletteTooSmall(self.names.len()));
        }
        if self.names.len() > u8::MAX as usize {
            return Err(ConfigError::PaletteTooLarge(self.names.len()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, color: Color) -> bool {
        color.index() < self.names.len()
    }

    pub fn name(&self, color: Color) -> Option<&str> {
        self.names.get(color.index()).map(String::as_str)
    }

    /// Look a color up by name (case-insensitive) or by index
    pub fn parse(&self, input: &str) -> Option<Color> {
        let input = input.trim();
        if let Some(pos) = self.names.iter().position(|n| n.eq_ignore_ascii_case(input)) {
            return Some(Color(pos as u8));
        }
        input
            .parse::<u8>()
            .ok()
            .map(Color)
            .filter(|c| self.contains(*c))
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        (0..self.names.len()).map(|i| Color(i as u8))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            names: STANDARD_COLORS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

const STANDARD_COLORS: [&str; 6] = ["red", "orange", "yellow", "green", "blue", "purple"];

// ============================================================================
// PLAYERS ON THE BOARD
// ============================================================================

/// Turn-order position of a player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    One = 0,
    Two = 1,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn opponent(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// TILES AND BOARD
// ============================================================================

/// A single board cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub hex: Hex,
    pub color: Color,
    pub owner: Option<PlayerSlot>,
}

/// Rectangular `size x size` board, row-major by `(q, r)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    tiles: Vec<Tile>,
}

impl Board {
    /// Board where every tile has `color` and no owner
    pub fn filled(size: usize, color: Color) -> Result<Self, ConfigError> {
        check_board_size(size)?;
        let tiles = (0..size)
            .flat_map(|q| (0..size).map(move |r| Hex::new(q as i32, r as i32)))
            .map(|hex| Tile {
                hex,
                color,
                owner: None,
            })
            .collect();
        Ok(Self { size, tiles })
    }

    /// Build a board from an explicit row-major color grid: `rows[q][r]`
    pub fn from_colors(rows: &[Vec<Color>]) -> Result<Self, ConfigError> {
        let size = rows.len();
        let mut board = Self::filled(size, Color(0))?;
        for (q, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(ConfigError::RaggedBoard { row: q, len: row.len(), size });
            }
            for (r, &color) in row.iter().enumerate() {
                board.tiles[q * size + r].color = color;
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn index_of(&self, hex: Hex) -> Option<usize> {
        if hex.is_in_bounds(self.size) {
            Some(hex.q as usize * self.size + hex.r as usize)
        } else {
            None
        }
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.index_of(hex).map(|i| &self.tiles[i])
    }

    pub(crate) fn get_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        self.index_of(hex).map(move |i| &mut self.tiles[i])
    }

    /// Iterate tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> + '_ {
        self.tiles.iter_mut()
    }

    /// Tiles owned by a player, in row-major order
    pub fn owned_by(&self, slot: PlayerSlot) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().filter(move |t| t.owner == Some(slot))
    }

    pub fn count_owned(&self, slot: PlayerSlot) -> usize {
        self.owned_by(slot).count()
    }

    /// True when no tile is left unowned
    pub fn is_saturated(&self) -> bool {
        self.tiles.iter().all(|t| t.owner.is_some())
    }

    /// Set a tile's color; used by generation and fixtures
    pub fn set_color(&mut self, hex: Hex, color: Color) -> bool {
        match self.get_mut(hex) {
            Some(tile) => {
                tile.color = color;
                true
            }
            None => false,
        }
    }

    /// Set a tile's owner; used by generation and fixtures
    pub fn set_owner(&mut self, hex: Hex, owner: Option<PlayerSlot>) -> bool {
        match self.get_mut(hex) {
            Some(tile) => {
                tile.owner = owner;
                true
            }
            None => false,
        }
    }

    /// Starting corner for a player: one at `(0, size-1)`, two at `(size-1, 0)`
    pub fn start_hex(&self, slot: PlayerSlot) -> Hex {
        let last = self.size as i32 - 1;
        match slot {
            PlayerSlot::One => Hex::new(0, last),
            PlayerSlot::Two => Hex::new(last, 0),
        }
    }

    /// Tiles stored where their coordinates say they are
    pub(crate) fn is_consistent(&self) -> bool {
        check_board_size(self.size).is_ok()
            && self.size.checked_mul(self.size) == Some(self.tiles.len())
            && self
                .tiles
                .iter()
                .enumerate()
                .all(|(i, t)| self.index_of(t.hex) == Some(i))
    }
}
