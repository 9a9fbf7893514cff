//! XPLORE Core - Sector model and mission engine
//!
//! This crate provides the core logic for XPLORE:
//! - Sector geometry (hex grid with axial coordinates)
//! - Tile values, reveal and mining bookkeeping
//! - Rule-based strategies and the built-in presets
//! - Policy evaluation (one decision per turn, with a rule trace)
//! - Turn-by-turn mission simulation
//! - Epsilon-greedy baseline agent
//! - Strategy persistence

pub mod board;
pub mod grid;
pub mod strategy;
pub mod policy;
pub mod mission;
pub mod baseline;
pub mod store;

// Re-exports for convenient access
pub use board::{Hex, DIRECTIONS, SECTOR_RADIUS, sector_size};
pub use grid::{Grid, Tile, create_sector, generate_grid, START_TILE_VALUE};
pub use strategy::{
    Action, Condition, NamedStrategy, Operator, Rule, RuleSpec, Strategy, StrategyError,
    preset, presets, PRESETS,
};
pub use policy::{decide, decide_at, Decision, RuleTrace, TurnAction};
pub use mission::{
    run_mission, MissionError, MissionOutcome, MissionState, MissionStatus, TurnRecord,
    MISSION_TURNS,
};
pub use baseline::{BaselineRun, EpsilonGreedy};
pub use store::{JsonFileStore, MemoryStore, StoreError, StrategyStore};
