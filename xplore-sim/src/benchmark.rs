//! Benchmark comparator - every strategy against the same sector sequence
//!
//! Level 1 - Orchestration

use serde::Serialize;
use xplore_core::NamedStrategy;

use crate::config::SimConfig;
use crate::monte_carlo::{simulate_seeded, MonteCarloResult, Progress, RunControl};

/// One strategy's line in a benchmark
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenchmarkEntry {
    /// Store key of the strategy
    pub key: String,
    /// Display name
    pub name: String,
    pub mean: i64,
    pub min: i64,
    pub max: i64,
    /// False for strategies with no rules, which are not simulated
    pub defined: bool,
    /// Missions that finished
    pub completed: usize,
    pub failed_trials: usize,
}

impl BenchmarkEntry {
    /// Placeholder for a strategy with no rules
    pub fn undefined(strategy: &NamedStrategy) -> Self {
        Self {
            key: strategy.key.clone(),
            name: strategy.name.clone(),
            mean: 0,
            min: 0,
            max: 0,
            defined: false,
            completed: 0,
            failed_trials: 0,
        }
    }

    fn from_result(strategy: &NamedStrategy, result: &MonteCarloResult) -> Self {
        Self {
            key: strategy.key.clone(),
            name: strategy.name.clone(),
            mean: result.stats.mean,
            min: result.stats.min,
            max: result.stats.max,
            defined: true,
            completed: result.completed(),
            failed_trials: result.failed_trials,
        }
    }
}

/// Result of a benchmark
#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkReport {
    /// Base seed shared by every strategy
    pub seed: u64,
    /// Missions per strategy
    pub runs: usize,
    /// One entry per finished strategy, in input order
    pub entries: Vec<BenchmarkEntry>,
    pub cancelled: bool,
}

impl BenchmarkReport {
    /// Defined entry with the highest mean (first on ties)
    pub fn best(&self) -> Option<&BenchmarkEntry> {
        self.entries
            .iter()
            .filter(|e| e.defined)
            .fold(None, |best: Option<&BenchmarkEntry>, e| match best {
                Some(b) if b.mean >= e.mean => Some(b),
                _ => Some(e),
            })
    }

    /// Get the entry for a specific store key
    pub fn entry(&self, key: &str) -> Option<&BenchmarkEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Benchmark every strategy with the same configuration
pub fn run_benchmark(strategies: &[NamedStrategy], config: &SimConfig) -> BenchmarkReport {
    run_benchmark_with(strategies, config, &RunControl::new(), |_| {})
}

/// Benchmark with progress over the whole run and cooperative cancellation
///
/// Progress counts `strategies × runs` missions; strategies with no rules
/// count as done immediately. A strategy cut short by cancellation is left
/// out of the report.
pub fn run_benchmark_with(
    strategies: &[NamedStrategy],
    config: &SimConfig,
    control: &RunControl,
    mut on_progress: impl FnMut(Progress),
) -> BenchmarkReport {
    let seed = config.resolve_seed();
    let total = strategies.len() * config.runs;
    let mut report = BenchmarkReport {
        seed,
        runs: config.runs,
        entries: Vec::with_capacity(strategies.len()),
        cancelled: false,
    };

    tracing::info!(strategies = strategies.len(), runs = config.runs, seed, "starting benchmark");

    for (i, strategy) in strategies.iter().enumerate() {
        if control.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let done_before = i * config.runs;
        if strategy.strategy.is_empty() {
            tracing::debug!(key = %strategy.key, "skipping strategy with no rules");
            report.entries.push(BenchmarkEntry::undefined(strategy));
            on_progress(Progress::new(done_before + config.runs, total));
            continue;
        }

        let result = simulate_seeded(&strategy.strategy, config, seed, control, |done| {
            on_progress(Progress::new(done_before + done, total))
        });
        if result.cancelled {
            report.cancelled = true;
            break;
        }

        tracing::debug!(key = %strategy.key, mean = result.stats.mean, "strategy benchmarked");
        report.entries.push(BenchmarkEntry::from_result(strategy, &result));
    }

    report
}
