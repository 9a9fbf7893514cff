//! XPLORE CLI - Command-line interface
//!
//! Commands:
//! - simulate: Monte Carlo batch for one stored strategy
//! - benchmark: Compare every stored strategy on the same sectors
//! - play: One autopilot mission with a turn log and baseline summary
//! - presets: List, reset or save stored strategies

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod benchmark;
mod output;
mod play;
mod presets;
mod simulate;

/// Default strategy store, next to where the command runs
const DEFAULT_STORE: &str = "xplore_presets.json";

#[derive(Parser)]
#[command(name = "xplore")]
#[command(about = "XPLORE explore/exploit strategy simulator")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Strategy store JSON file
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_STORE)]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Monte Carlo batch for one strategy
    Simulate(simulate::SimulateArgs),
    /// Benchmark every stored strategy
    Benchmark(benchmark::BenchmarkArgs),
    /// Play a single autopilot mission
    Play(play::PlayArgs),
    /// Manage stored strategies
    Presets(presets::PresetsArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    output::install_panic_hook();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate::run(args, &cli.store, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, &cli.store, cli.seed),
        Commands::Play(args) => play::run(args, &cli.store, cli.seed),
        Commands::Presets(args) => presets::run(args, &cli.store),
    }
}
