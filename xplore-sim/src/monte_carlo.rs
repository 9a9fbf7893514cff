//! Monte Carlo harness - many independent missions for one strategy
//!
//! Level 2 - Phase-level implementation

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use xplore_core::Strategy;

use crate::config::SimConfig;
use crate::mission_runner::{MissionRunner, TrialResult};

/// Average score at or above which a strategy counts as elite
pub const ELITE_SCORE: i64 = 500;

// ============================================================================
// CONTROL & PROGRESS
// ============================================================================

/// Cooperative cancellation flag shared between a batch and its caller
#[derive(Clone, Debug, Default)]
pub struct RunControl {
    stop_requested: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running batch to stop at the next chunk boundary
    pub fn cancel(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Clear a previous cancellation so the control can be reused
    pub fn reset(&self) {
        self.stop_requested.store(false, Ordering::Release);
    }
}

/// Progress report emitted between chunks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded percentage in 0..=100
    pub percent: u32,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Score bands used to classify single missions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScoreTier {
    /// 700 and above
    Diamond,
    /// 500 to 699
    Rich,
    /// 300 to 499
    Copper,
    /// Below 300
    Standard,
}

impl ScoreTier {
    pub const ALL: [ScoreTier; 4] = [
        ScoreTier::Diamond,
        ScoreTier::Rich,
        ScoreTier::Copper,
        ScoreTier::Standard,
    ];

    pub fn of(score: i64) -> Self {
        match score {
            s if s >= 700 => ScoreTier::Diamond,
            s if s >= 500 => ScoreTier::Rich,
            s if s >= 300 => ScoreTier::Copper,
            _ => ScoreTier::Standard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Diamond => "Diamond (700+)",
            ScoreTier::Rich => "Rich (500-699)",
            ScoreTier::Copper => "Copper (300-499)",
            ScoreTier::Standard => "Standard (<300)",
        }
    }
}

/// Number of missions in each score tier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub diamond: u32,
    pub rich: u32,
    pub copper: u32,
    pub standard: u32,
}

impl TierCounts {
    pub fn record(&mut self, score: i64) {
        match ScoreTier::of(score) {
            ScoreTier::Diamond => self.diamond += 1,
            ScoreTier::Rich => self.rich += 1,
            ScoreTier::Copper => self.copper += 1,
            ScoreTier::Standard => self.standard += 1,
        }
    }

    pub fn get(&self, tier: ScoreTier) -> u32 {
        match tier {
            ScoreTier::Diamond => self.diamond,
            ScoreTier::Rich => self.rich,
            ScoreTier::Copper => self.copper,
            ScoreTier::Standard => self.standard,
        }
    }

    pub fn total(&self) -> u32 {
        self.diamond + self.rich + self.copper + self.standard
    }
}

/// Summary statistics over mission scores
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreStats {
    /// Mean score rounded half up
    pub mean: i64,
    pub min: i64,
    pub max: i64,
}

impl ScoreStats {
    /// All zeros for an empty slice
    pub fn from_scores(scores: &[i64]) -> Self {
        let (Some(&min), Some(&max)) = (scores.iter().min(), scores.iter().max()) else {
            return Self::default();
        };
        let sum: i64 = scores.iter().sum();
        Self {
            mean: rounded_mean(sum, scores.len()),
            min,
            max,
        }
    }

    pub fn is_elite(&self) -> bool {
        self.mean >= ELITE_SCORE
    }
}

/// `sum / count` rounded half up
pub(crate) fn rounded_mean(sum: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let count = count as i64;
    (2 * sum + count).div_euclid(2 * count)
}

/// Result of a Monte Carlo batch
#[derive(Clone, Debug, Serialize)]
pub struct MonteCarloResult {
    /// Base seed; trial `i` used `seed + i`
    pub seed: u64,
    /// Trials asked for
    pub requested: usize,
    /// Successful trials ordered by index
    pub trials: Vec<TrialResult>,
    /// Trials that panicked and were skipped
    pub failed_trials: usize,
    /// Stopped early through a `RunControl`
    pub cancelled: bool,
    pub stats: ScoreStats,
    pub tiers: TierCounts,
}

impl MonteCarloResult {
    fn from_batch(seed: u64, requested: usize, batch: Batch) -> Self {
        let scores: Vec<i64> = batch.trials.iter().map(|t| t.score).collect();
        let mut tiers = TierCounts::default();
        for &score in &scores {
            tiers.record(score);
        }

        Self {
            seed,
            requested,
            stats: ScoreStats::from_scores(&scores),
            tiers,
            trials: batch.trials,
            failed_trials: batch.failed,
            cancelled: batch.cancelled,
        }
    }

    /// Successful trials
    pub fn completed(&self) -> usize {
        self.trials.len()
    }

    pub fn scores(&self) -> impl Iterator<Item = i64> + '_ {
        self.trials.iter().map(|t| t.score)
    }
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Simulate `config.runs` missions for one strategy
pub fn run_monte_carlo(strategy: &Strategy, config: &SimConfig) -> MonteCarloResult {
    run_monte_carlo_with(strategy, config, &RunControl::new(), |_| {})
}

/// Simulate with progress reporting and cooperative cancellation
///
/// `on_progress` is called after every chunk. Cancellation is checked before
/// and after each chunk; a chunk that finishes after cancellation is dropped.
pub fn run_monte_carlo_with(
    strategy: &Strategy,
    config: &SimConfig,
    control: &RunControl,
    mut on_progress: impl FnMut(Progress),
) -> MonteCarloResult {
    let seed = config.resolve_seed();
    simulate_seeded(strategy, config, seed, control, |done| {
        on_progress(Progress::new(done, config.runs))
    })
}

/// Simulate from a fixed base seed; `on_chunk` receives trials attempted so far
pub(crate) fn simulate_seeded(
    strategy: &Strategy,
    config: &SimConfig,
    seed: u64,
    control: &RunControl,
    on_chunk: impl FnMut(usize),
) -> MonteCarloResult {
    tracing::debug!(
        runs = config.runs,
        seed,
        parallel = config.parallel,
        "starting monte carlo batch"
    );

    let runner = MissionRunner::new(config);
    let batch = execute_chunks(config, seed, control, on_chunk, |index, trial_seed| {
        runner.play(strategy, index, trial_seed)
    });

    if batch.cancelled {
        tracing::info!(
            completed = batch.trials.len(),
            requested = config.runs,
            "monte carlo batch cancelled"
        );
    }

    MonteCarloResult::from_batch(seed, config.runs, batch)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Trials gathered from finished chunks
struct Batch {
    trials: Vec<TrialResult>,
    failed: usize,
    cancelled: bool,
}

/// Outcome of one trial: the result, or the panic message
type TrialOutcome = Result<TrialResult, String>;

/// Run trials chunk by chunk, checking the cancel flag between chunks
fn execute_chunks<F>(
    config: &SimConfig,
    base_seed: u64,
    control: &RunControl,
    mut on_chunk: impl FnMut(usize),
    play: F,
) -> Batch
where
    F: Fn(usize, u64) -> TrialResult + Sync,
{
    let chunk_size = config.chunk_size.max(1);
    let mut batch = Batch {
        trials: Vec::with_capacity(config.runs),
        failed: 0,
        cancelled: false,
    };

    let mut next = 0;
    while next < config.runs {
        if control.is_cancelled() {
            batch.cancelled = true;
            break;
        }

        let range = next..(next + chunk_size).min(config.runs);
        let outcomes = if config.parallel {
            execute_chunk_parallel(range.clone(), base_seed, &play)
        } else {
            execute_chunk(range.clone(), base_seed, &play)
        };

        if control.is_cancelled() {
            batch.cancelled = true;
            break;
        }

        for (index, outcome) in range.clone().zip(outcomes) {
            match outcome {
                Ok(trial) => batch.trials.push(trial),
                Err(message) => {
                    tracing::warn!(trial = index, "trial failed: {}", message);
                    batch.failed += 1;
                }
            }
        }

        next = range.end;
        on_chunk(next);
    }

    batch
}

/// Execute a chunk sequentially
fn execute_chunk<F>(range: Range<usize>, base_seed: u64, play: &F) -> Vec<TrialOutcome>
where
    F: Fn(usize, u64) -> TrialResult + Sync,
{
    range
        .map(|index| play_isolated(play, index, base_seed))
        .collect()
}

/// Execute a chunk in parallel using rayon
fn execute_chunk_parallel<F>(range: Range<usize>, base_seed: u64, play: &F) -> Vec<TrialOutcome>
where
    F: Fn(usize, u64) -> TrialResult + Sync,
{
    range
        .into_par_iter()
        .map(|index| play_isolated(play, index, base_seed))
        .collect()
}

/// Play one trial, turning a panic into an error
fn play_isolated<F>(play: &F, index: usize, base_seed: u64) -> TrialOutcome
where
    F: Fn(usize, u64) -> TrialResult + Sync,
{
    let seed = SimConfig::trial_seed(base_seed, index);
    panic::catch_unwind(AssertUnwindSafe(|| play(index, seed))).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xplore_core::{preset, Action, Hex, Rule};

    fn always_mine() -> Strategy {
        Strategy::new(vec![Rule::always("m", Action::MineCurrent)])
    }

    fn fake_trial(index: usize, seed: u64) -> TrialResult {
        TrialResult {
            index,
            seed,
            start: Hex::ORIGIN,
            score: index as i64 * 10,
            moves: 0,
            mines: 20,
        }
    }

    #[test]
    fn test_always_mine_every_trial_scores_200() {
        let config = SimConfig::new(30).with_seed(42);
        let result = run_monte_carlo(&always_mine(), &config);

        assert_eq!(result.completed(), 30);
        assert!(result.scores().all(|s| s == 200));
        assert_eq!(result.stats, ScoreStats { mean: 200, min: 200, max: 200 });
        assert_eq!(result.tiers.standard, 30);
        assert_eq!(result.failed_trials, 0);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_mean_within_bounds() {
        let config = SimConfig::new(50).with_seed(7);
        for key in ["recon", "value_hunter", "homebody"] {
            let strategy = preset(key).unwrap().strategy;
            let result = run_monte_carlo(&strategy, &config);
            assert!(result.stats.min <= result.stats.mean);
            assert!(result.stats.mean <= result.stats.max);
            assert_eq!(result.tiers.total(), 50);
        }
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let strategy = preset("recon").unwrap().strategy;
        let parallel = run_monte_carlo(&strategy, &SimConfig::new(40).with_seed(3));
        let sequential = run_monte_carlo(&strategy, &SimConfig::new(40).with_seed(3).sequential());
        assert_eq!(parallel.trials, sequential.trials);
        assert_eq!(parallel.stats, sequential.stats);
        assert!(parallel.trials.iter().enumerate().all(|(i, t)| t.index == i));
    }

    #[test]
    fn test_zero_runs() {
        let result = run_monte_carlo(&always_mine(), &SimConfig::new(0).with_seed(1));
        assert_eq!(result.completed(), 0);
        assert_eq!(result.stats, ScoreStats::default());
    }

    #[test]
    fn test_progress_reported_per_chunk() {
        let config = SimConfig::new(12).with_seed(1).with_chunk_size(5);
        let mut reports = Vec::new();
        run_monte_carlo_with(&always_mine(), &config, &RunControl::new(), |p| reports.push(p));

        let completed: Vec<usize> = reports.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![5, 10, 12]);
        assert_eq!(reports[0].percent, 42);
        assert_eq!(reports[2].percent, 100);
    }

    #[test]
    fn test_cancel_before_start() {
        let control = RunControl::new();
        control.cancel();
        let result = run_monte_carlo_with(&always_mine(), &SimConfig::new(20).with_seed(1), &control, |_| {});
        assert_eq!(result.completed(), 0);
        assert!(result.cancelled);
    }

    #[test]
    fn test_cancel_between_chunks_keeps_finished_chunks() {
        let control = RunControl::new();
        let handle = control.clone();
        let config = SimConfig::new(20).with_seed(1).with_chunk_size(5);
        let result = run_monte_carlo_with(&always_mine(), &config, &control, |p| {
            if p.completed >= 10 {
                handle.cancel();
            }
        });
        assert_eq!(result.completed(), 10);
        assert!(result.cancelled);

        control.reset();
        assert!(!control.is_cancelled());
    }

    #[test]
    fn test_cancel_mid_chunk_discards_that_chunk() {
        for config in [
            SimConfig::new(20).with_chunk_size(5),
            SimConfig::new(20).with_chunk_size(5).sequential(),
        ] {
            let control = RunControl::new();
            let mut reported = Vec::new();
            let batch = execute_chunks(&config, 0, &control, |done| reported.push(done), |index, seed| {
                if index == 7 {
                    control.cancel();
                }
                fake_trial(index, seed)
            });

            assert!(batch.cancelled);
            assert_eq!(batch.trials.len(), 5);
            assert!(batch.trials.iter().all(|t| t.index < 5));
            assert_eq!(reported, vec![5]);
        }
    }

    #[test]
    fn test_panicking_trial_is_counted() {
        let config = SimConfig::new(10).with_chunk_size(4);
        let batch = execute_chunks(&config, 0, &RunControl::new(), |_| {}, |index, seed| {
            if index == 6 {
                panic!("bad sector");
            }
            fake_trial(index, seed)
        });
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.trials.len(), 9);
        assert!(batch.trials.iter().all(|t| t.index != 6));
        assert!(!batch.cancelled);
    }

    #[test]
    fn test_trial_seeds_offset_from_base() {
        let config = SimConfig::new(3).sequential();
        let batch = execute_chunks(&config, 100, &RunControl::new(), |_| {}, fake_trial);
        let seeds: Vec<u64> = batch.trials.iter().map(|t| t.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);
    }

    #[test]
    fn test_score_tiers() {
        assert_eq!(ScoreTier::of(700), ScoreTier::Diamond);
        assert_eq!(ScoreTier::of(699), ScoreTier::Rich);
        assert_eq!(ScoreTier::of(500), ScoreTier::Rich);
        assert_eq!(ScoreTier::of(300), ScoreTier::Copper);
        assert_eq!(ScoreTier::of(299), ScoreTier::Standard);
    }

    #[test]
    fn test_rounded_mean_half_up() {
        assert_eq!(rounded_mean(5, 2), 3);
        assert_eq!(rounded_mean(4, 3), 1);
        assert_eq!(rounded_mean(0, 0), 0);
        let stats = ScoreStats::from_scores(&[100, 201]);
        assert_eq!(stats, ScoreStats { mean: 151, min: 100, max: 201 });
        assert!(!stats.is_elite());
    }
}
