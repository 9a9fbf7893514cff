//! XPLORE Sim - Strategy evaluation through repeated missions
//!
//! This crate provides batch simulation infrastructure:
//! - Seeded single-mission runs
//! - Monte Carlo batches with progress and cancellation
//! - Benchmarks across every stored strategy
//! - Mission summaries against the epsilon-greedy baseline
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_benchmark (orchestration)
//! - Level 2: run_monte_carlo, summarize_mission (phases)
//! - Level 3: MissionRunner::play, chunk execution (steps)
//! - Level 4: utilities, configuration

mod benchmark;
mod config;
mod mission_runner;
mod monte_carlo;
mod summary;

pub use benchmark::{run_benchmark, run_benchmark_with, BenchmarkEntry, BenchmarkReport};
pub use config::{SimConfig, DEFAULT_CHUNK_SIZE, DEFAULT_RUNS};
pub use mission_runner::{MissionRunner, TrialResult};
pub use monte_carlo::{
    run_monte_carlo, run_monte_carlo_with, MonteCarloResult, Progress, RunControl, ScoreStats,
    ScoreTier, TierCounts, ELITE_SCORE,
};
pub use summary::{summarize_mission, MissionSummary, SummaryConfig, BASELINE_RUNS};
