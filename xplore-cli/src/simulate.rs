//! Simulate command - Monte Carlo batch for one stored strategy
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_batch(), report_results()
//! - Level 3: print_text_results(), print_json_results()
//! - Level 4: shared helpers in `output`

use std::path::Path;

use anyhow::Result;
use clap::Args;

use xplore_core::NamedStrategy;
use xplore_sim::{run_monte_carlo_with, MonteCarloResult, RunControl, ScoreTier, SimConfig, DEFAULT_RUNS};

use crate::output::{advance, load_strategy, print_json, progress_bar};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Store key of the strategy to simulate
    #[arg(long, default_value = "recon")]
    pub preset: String,

    /// Number of missions
    #[arg(long, default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    /// Run every mission on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SimulateArgs {
    fn sim_config(&self, seed: Option<u64>) -> SimConfig {
        let mut config = SimConfig::new(self.runs);
        config.seed = seed;
        if self.sequential {
            config = config.sequential();
        }
        config
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
pub fn run(args: SimulateArgs, store: &Path, seed: Option<u64>) -> Result<()> {
    let strategy = load_strategy(store, &args.preset)?;
    let config = args.sim_config(seed);

    if strategy.strategy.is_empty() {
        tracing::warn!("Strategy '{}' has no rules; every turn will mine", strategy.name);
    }
    tracing::info!("Simulating {} ({} missions)", strategy.name, config.runs);

    let result = run_batch(&strategy, &config, args.json);
    report_results(&strategy, &result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_batch(strategy: &NamedStrategy, config: &SimConfig, quiet: bool) -> MonteCarloResult {
    let bar = progress_bar(config.runs, &strategy.name, quiet);
    let result = run_monte_carlo_with(&strategy.strategy, config, &RunControl::new(), |p| advance(&bar, p));
    bar.finish_and_clear();

    if result.failed_trials > 0 {
        tracing::warn!("{} missions failed and were skipped", result.failed_trials);
    }
    result
}

fn report_results(strategy: &NamedStrategy, result: &MonteCarloResult, json: bool) -> Result<()> {
    if json {
        print_json_results(strategy, result)
    } else {
        print_text_results(strategy, result);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_json_results(strategy: &NamedStrategy, result: &MonteCarloResult) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        key: &'a str,
        name: &'a str,
        #[serde(flatten)]
        result: &'a MonteCarloResult,
    }

    print_json(&JsonOutput {
        key: &strategy.key,
        name: &strategy.name,
        result,
    })
}

fn print_text_results(strategy: &NamedStrategy, result: &MonteCarloResult) {
    let completed = result.completed();

    println!("\n=== {} ===", strategy.name);
    println!("Missions:  {} (seed {})", completed, result.seed);
    println!("Average:   {}", result.stats.mean);
    println!("Best:      {}", result.stats.max);
    println!("Worst:     {}", result.stats.min);

    println!("\nDistribution:");
    for tier in ScoreTier::ALL {
        let count = result.tiers.get(tier);
        let pct = if completed > 0 {
            count as f32 / completed as f32 * 100.0
        } else {
            0.0
        };
        println!("  {:<18} {:>4} ({:.1}%)", tier.label(), count, pct);
    }

    if result.stats.is_elite() {
        println!("\nElite performance: average of 500 or more.");
    }
    if result.failed_trials > 0 {
        println!("Failed missions: {}", result.failed_trials);
    }
}
