//! Configuration types for batch simulation
//!
//! Level 4 - Utilities and configuration

use xplore_core::{MISSION_TURNS, SECTOR_RADIUS};

/// Missions per batch
pub const DEFAULT_RUNS: usize = 100;

/// Trials between progress reports and cancel checks
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Batch simulation configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of independent missions
    pub runs: usize,
    /// Turns per mission
    pub turn_budget: u32,
    /// Sector radius
    pub radius: i32,
    /// Trials per chunk; progress and cancellation happen between chunks
    pub chunk_size: usize,
    /// Base seed for reproducibility (None = fresh entropy per batch)
    pub seed: Option<u64>,
    /// Whether to run trials within a chunk in parallel
    pub parallel: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            turn_budget: MISSION_TURNS,
            radius: SECTOR_RADIUS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            seed: None,
            parallel: true,
        }
    }
}

impl SimConfig {
    /// Create config with specified run count
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_turn_budget(mut self, turn_budget: u32) -> Self {
        self.turn_budget = turn_budget;
        self
    }

    pub fn with_radius(mut self, radius: i32) -> Self {
        self.radius = radius;
        self
    }

    /// Set chunk size (clamped to at least one trial)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run every trial on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Seed for this batch, drawing one from entropy when unset
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Seed of the trial at `index`
    pub fn trial_seed(base_seed: u64, index: usize) -> u64 {
        base_seed.wrapping_add(index as u64)
    }
}
