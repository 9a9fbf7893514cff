//! Sector grid - tiles, weighted value generation and reveal propagation

use std::ops::Index;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::board::{sector_size, Hex};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Value of the start tile; every mission begins on a known, modest tile
pub const START_TILE_VALUE: i32 = 10;

/// Rare veins (2.5%)
const RARE_CUTOFF: f64 = 0.025;
const RARE_VALUES: [i32; 2] = [45, 50];

/// Rich veins (5%)
const RICH_CUTOFF: f64 = 0.075;
const RICH_VALUE: i32 = 40;

/// High-tier standard (10%)
const HIGH_CUTOFF: f64 = 0.175;
const HIGH_VALUE: i32 = 35;

/// Standard tiles: sum of uniforms, centered and spread around 15
const STANDARD_SAMPLES: usize = 3;
const STANDARD_SPREAD: f64 = 14.0;
const STANDARD_CENTER: f64 = 15.0;
const STANDARD_MIN: i32 = 5;
const STANDARD_MAX: i32 = 30;
const VALUE_STEP: f64 = 5.0;

// ============================================================================
// TILE
// ============================================================================

/// A single sector tile
///
/// `true_value` never changes after creation, `revealed` only goes from false
/// to true and `mined_count` only grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub coord: Hex,
    true_value: i32,
    revealed: bool,
    mined_count: u32,
}

impl Tile {
    fn new(coord: Hex, true_value: i32) -> Self {
        Self {
            coord,
            true_value,
            revealed: false,
            mined_count: 0,
        }
    }

    pub fn true_value(&self) -> i32 {
        self.true_value
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn mined_count(&self) -> u32 {
        self.mined_count
    }
}

// ============================================================================
// GRID
// ============================================================================

/// Hexagonal sector of tiles keyed by axial coordinate
#[derive(Clone, Debug)]
pub struct Grid {
    radius: i32,
    tiles: FxHashMap<Hex, Tile>,
    /// Coordinates in ascending (q, r) order
    order: Vec<Hex>,
}

impl Grid {
    /// Generate a sector of the given radius with freshly drawn tile values
    pub fn generate<R: Rng>(radius: i32, rng: &mut R) -> Self {
        Self::from_fn(radius, |_| tile_value(rng))
    }

    /// Build a sector whose tile values come from `value_of`, called in
    /// ascending (q, r) order
    pub fn from_fn(radius: i32, mut value_of: impl FnMut(Hex) -> i32) -> Self {
        assert!(radius >= 0, "Sector radius must be >= 0");

        let mut tiles = FxHashMap::default();
        tiles.reserve(sector_size(radius));
        let mut order = Vec::with_capacity(sector_size(radius));

        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                let coord = Hex::new(q, r);
                tiles.insert(coord, Tile::new(coord, value_of(coord)));
                order.push(coord);
            }
        }

        Self { radius, tiles, order }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains_key(&hex)
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    /// Coordinates in ascending (q, r) order
    pub fn coords(&self) -> &[Hex] {
        &self.order
    }

    /// Tiles in ascending (q, r) order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.order.iter().map(move |hex| &self.tiles[hex])
    }

    /// Neighbors of `hex` present in the sector, in direction order
    pub fn neighbors(&self, hex: Hex) -> Vec<Hex> {
        hex.ring()
            .into_iter()
            .filter(|n| self.tiles.contains_key(n))
            .collect()
    }

    /// Reveal `pos` and its neighbors, returning how many tiles were newly revealed
    pub fn reveal(&mut self, pos: Hex) -> usize {
        let mut newly_revealed = 0;
        for hex in std::iter::once(pos).chain(pos.ring()) {
            if let Some(tile) = self.tiles.get_mut(&hex) {
                if !tile.revealed {
                    tile.revealed = true;
                    newly_revealed += 1;
                }
            }
        }
        newly_revealed
    }

    /// Number of revealed tiles
    pub fn revealed_count(&self) -> usize {
        self.tiles.values().filter(|t| t.revealed).count()
    }

    /// Total mining actions across all tiles
    pub fn total_mined(&self) -> u32 {
        self.tiles.values().map(|t| t.mined_count).sum()
    }

    /// Record `times` mining actions on `pos` and return the ore extracted
    pub(crate) fn mine(&mut self, pos: Hex, times: u32) -> i64 {
        let tile = self.tile_mut(pos);
        tile.mined_count += times;
        tile.true_value as i64 * times as i64
    }

    /// Fix a tile's value while the sector is still being created
    fn set_value(&mut self, pos: Hex, value: i32) {
        self.tile_mut(pos).true_value = value;
    }

    fn tile_mut(&mut self, pos: Hex) -> &mut Tile {
        let radius = self.radius;
        self.tiles
            .get_mut(&pos)
            .unwrap_or_else(|| invalid_coordinate(pos, radius))
    }
}

impl Index<Hex> for Grid {
    type Output = Tile;

    /// Panics if `hex` is outside the sector
    fn index(&self, hex: Hex) -> &Tile {
        self.tiles
            .get(&hex)
            .unwrap_or_else(|| invalid_coordinate(hex, self.radius))
    }
}

#[cold]
fn invalid_coordinate(hex: Hex, radius: i32) -> ! {
    panic!("invalid coordinate {hex}: outside sector of radius {radius}")
}

// ============================================================================
// GENERATION
// ============================================================================

/// Generate a sector grid of the given radius
pub fn generate_grid<R: Rng>(radius: i32, rng: &mut R) -> Grid {
    Grid::generate(radius, rng)
}

/// Create a mission sector: a fresh grid plus a start corner
///
/// The start tile gets [`START_TILE_VALUE`] and is revealed together with its
/// neighbors.
pub fn create_sector<R: Rng>(radius: i32, rng: &mut R) -> (Grid, Hex) {
    let mut grid = Grid::generate(radius, rng);
    let corners = Hex::corners(radius);
    let start = corners[rng.gen_range(0..corners.len())];

    grid.set_value(start, START_TILE_VALUE);
    grid.reveal(start);

    (grid, start)
}

/// Draw a tile value from the tiered distribution
pub fn tile_value<R: Rng>(rng: &mut R) -> i32 {
    let roll: f64 = rng.gen();

    if roll < RARE_CUTOFF {
        return RARE_VALUES[rng.gen_range(0..RARE_VALUES.len())];
    }
    if roll < RICH_CUTOFF {
        return RICH_VALUE;
    }
    if roll < HIGH_CUTOFF {
        return HIGH_VALUE;
    }

    standard_value(rng)
}

fn standard_value<R: Rng>(rng: &mut R) -> i32 {
    let sum: f64 = (0..STANDARD_SAMPLES).map(|_| rng.gen::<f64>()).sum();
    let centered = sum - STANDARD_SAMPLES as f64 / 2.0;
    let raw = centered * STANDARD_SPREAD + STANDARD_CENTER;
    let rounded = ((raw / VALUE_STEP).round() * VALUE_STEP) as i32;
    rounded.clamp(STANDARD_MIN, STANDARD_MAX)
}
