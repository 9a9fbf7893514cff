//! Benchmark command - compare every stored strategy
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_all(), report_results()
//! - Level 3: print_text_results(), score_bar()
//! - Level 4: shared helpers in `output`

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;

use xplore_core::NamedStrategy;
use xplore_sim::{run_benchmark_with, BenchmarkReport, RunControl, SimConfig, DEFAULT_RUNS, ELITE_SCORE};

use crate::output::{advance, load_strategies, print_json, progress_bar};

/// Score that fills a whole bar in the text chart
const BAR_SCALE: i64 = 800;
const BAR_WIDTH: usize = 30;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Missions per strategy
    #[arg(long, default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Load every stored strategy
/// 2. Simulate each against the same sector sequence
/// 3. Report the comparison
pub fn run(args: BenchmarkArgs, store: &Path, seed: Option<u64>) -> Result<()> {
    let strategies = load_strategies(store)?;
    let mut config = SimConfig::new(args.runs);
    config.seed = seed;

    tracing::info!(
        "Starting benchmark: {} strategies, {} missions each",
        strategies.len(),
        args.runs
    );

    let (report, elapsed) = run_all(&strategies, &config, args.json);
    tracing::info!("Benchmark finished in {:.2}s", elapsed.as_secs_f64());

    report_results(&report, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_all(strategies: &[NamedStrategy], config: &SimConfig, quiet: bool) -> (BenchmarkReport, Duration) {
    let bar = progress_bar(strategies.len() * config.runs, "Benchmarking", quiet);
    let start = Instant::now();
    let report = run_benchmark_with(strategies, config, &RunControl::new(), |p| advance(&bar, p));
    bar.finish_and_clear();
    (report, start.elapsed())
}

fn report_results(report: &BenchmarkReport, json: bool) -> Result<()> {
    if json {
        print_json(report)
    } else {
        print_text_results(report);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_text_results(report: &BenchmarkReport) {
    println!("\n=== Strategy Benchmark ({} missions each, seed {}) ===", report.runs, report.seed);
    println!("{:<20} {:>6} {:>6} {:>6}  ", "Strategy", "Avg", "Min", "Max");
    println!("{}", "-".repeat(42 + BAR_WIDTH));

    for entry in &report.entries {
        if !entry.defined {
            println!("{:<20} {:>6}", entry.name, "-");
            continue;
        }
        let marker = if entry.mean >= ELITE_SCORE { "*" } else { " " };
        println!(
            "{:<20} {:>6} {:>6} {:>6}  {}{}",
            entry.name,
            entry.mean,
            entry.min,
            entry.max,
            score_bar(entry.mean),
            marker
        );
    }

    if let Some(best) = report.best() {
        println!("\nTop strategy: {} (average {})", best.name, best.mean);
    }
}

/// Fixed-width bar proportional to the score, capped at full width
fn score_bar(score: i64) -> String {
    let filled = (score.clamp(0, BAR_SCALE) as usize * BAR_WIDTH) / BAR_SCALE as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
