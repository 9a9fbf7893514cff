//! Hex sector geometry with axial coordinates

use serde::{Deserialize, Serialize};

/// Sector radius used by a standard mission (distance from center to edge)
pub const SECTOR_RADIUS: i32 = 4;

/// Axial hex coordinates
///
/// Ordering is ascending `(q, r)`; every deterministic scan over the sector
/// relies on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    /// Sector center
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Check if this hex lies inside a sector of the given radius
    pub fn in_radius(&self, radius: i32) -> bool {
        self.q.abs() <= radius && self.r.abs() <= radius && (self.q + self.r).abs() <= radius
    }

    /// Distance from center (0,0)
    pub fn distance_to_center(&self) -> i32 {
        self.distance_to(Hex::ORIGIN)
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbor positions in direction order, present in a sector or not
    pub fn ring(&self) -> [Hex; 6] {
        std::array::from_fn(|d| self.neighbor(d))
    }

    /// The six corners of a sector of the given radius
    pub fn corners(radius: i32) -> [Hex; 6] {
        [
            Hex::new(radius, 0),
            Hex::new(0, radius),
            Hex::new(-radius, radius),
            Hex::new(-radius, 0),
            Hex::new(0, -radius),
            Hex::new(radius, -radius),
        ]
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr)
///
/// The order is fixed: neighbor enumeration and every "first neighbor wins"
/// tie-break follow it.
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Number of tiles in a hexagonal sector of the given radius
pub const fn sector_size(radius: i32) -> usize {
    (3 * radius * radius + 3 * radius + 1) as usize
}
