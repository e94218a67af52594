//! Hex grid geometry with axial coordinates
//!
//! Boards are rectangular axial grids: both `q` and `r` run over `0..size`.
//! Pixel projection uses pointy-top hexes.

use serde::{Deserialize, Serialize};

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
///
/// Traversal order of the flood fill follows this table.
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
];

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, in `DIRECTIONS` order
    pub fn neighbors(&self) -> [Hex; 6] {
        DIRECTIONS.map(|(dq, dr)| Hex::new(self.q + dq, self.r + dr))
    }

    /// Check if this hex lies on a `size x size` board
    pub fn is_in_bounds(&self, size: usize) -> bool {
        let size = size as i64;
        let (q, r) = (i64::from(self.q), i64::from(self.r));
        (0..size).contains(&q) && (0..size).contains(&r)
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        (dq + dr + ds) / 2
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Round fractional axial coordinates to the nearest hex.
///
/// Works in cube space (`x = q`, `z = r`, `y = -x - z`): every component is
/// rounded, then the one with the largest rounding error is recomputed from
/// the other two so that `x + y + z == 0` still holds.
pub fn axial_round(q: f64, r: f64) -> Hex {
    let x = q;
    let z = r;
    let y = -x - z;

    let mut rx = x.round();
    let mut ry = y.round();
    let mut rz = z.round();

    let x_diff = (rx - x).abs();
    let y_diff = (ry - y).abs();
    let z_diff = (rz - z).abs();

    if x_diff > y_diff && x_diff > z_diff {
        rx = -ry - rz;
    } else if y_diff > z_diff {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }
    debug_assert!((rx + ry + rz).abs() < f64::EPSILON);

    Hex::new(rx as i32, rz as i32)
}

/// Pointy-top pixel projection
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Hex radius in pixels (center to corner)
    pub radius: f64,
    /// Pixel position of hex (0, 0)
    pub origin: (f64, f64),
}

impl Layout {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            origin: (0.0, 0.0),
        }
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    /// Center of a hex in pixel space
    pub fn to_pixel(&self, hex: Hex) -> (f64, f64) {
        let q = f64::from(hex.q);
        let r = f64::from(hex.r);
        let x = self.radius * (SQRT_3 * q + SQRT_3 / 2.0 * r);
        let y = self.radius * (1.5 * r);
        (x + self.origin.0, y + self.origin.1)
    }

    /// Hex containing a pixel position
    pub fn from_pixel(&self, x: f64, y: f64) -> Hex {
        let px = (x - self.origin.0) / self.radius;
        let py = (y - self.origin.1) / self.radius;
        let q = SQRT_3 / 3.0 * px - py / 3.0;
        let r = 2.0 / 3.0 * py;
        axial_round(q, r)
    }
}
