//! Shared command helpers - store access, progress bars, JSON output
//!
//! Level 4 - Utilities

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use xplore_core::{JsonFileStore, NamedStrategy, StrategyStore};
use xplore_sim::Progress;

/// Load every strategy from the store file
pub fn load_strategies(store: &Path) -> Result<Vec<NamedStrategy>> {
    JsonFileStore::new(store)
        .load_all()
        .with_context(|| format!("Failed to load strategies from {}", store.display()))
}

/// Load one strategy by store key
pub fn load_strategy(store: &Path, key: &str) -> Result<NamedStrategy> {
    let strategies = load_strategies(store)?;
    let known: Vec<String> = strategies.iter().map(|s| s.key.clone()).collect();
    strategies
        .into_iter()
        .find(|s| s.key == key)
        .with_context(|| format!("Unknown strategy '{}' (available: {})", key, known.join(", ")))
}

/// Progress bar over `total` missions, hidden when `hidden` is set
pub fn progress_bar(total: usize, label: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar
}

/// Move a progress bar to a harness report
pub fn advance(bar: &ProgressBar, progress: Progress) {
    bar.set_length(progress.total as u64);
    bar.set_position(progress.completed as u64);
}

/// Send panic reports to the debug log instead of stderr
///
/// Failed trials already get one warning line from the harness. The
/// default hook would print a second report across the progress bar.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(target: "xplore::panic", "{}", info);
    }));
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
