//! Presets command - list, reset or save stored strategies

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use xplore_core::{strategy::preset_info, JsonFileStore, NamedStrategy, Strategy, StrategyStore};

use crate::output::print_json;

#[derive(Args)]
pub struct PresetsArgs {
    /// Restore the built-in presets, dropping saved changes
    #[arg(long, conflicts_with = "save")]
    pub reset: bool,

    /// Save a strategy under this key (rules read from --rules)
    #[arg(long, value_name = "KEY", requires = "rules")]
    pub save: Option<String>,

    /// JSON file holding a rule array
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Output the store as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run presets command
pub fn run(args: PresetsArgs, store_path: &Path) -> Result<()> {
    let mut store = JsonFileStore::new(store_path);

    if args.reset {
        store
            .reset()
            .with_context(|| format!("Failed to reset {}", store_path.display()))?;
        tracing::info!("Restored built-in presets");
    }

    if let (Some(key), Some(rules)) = (&args.save, &args.rules) {
        let strategy = load_rules(rules)?;
        store
            .save(key, &strategy)
            .with_context(|| format!("Failed to save strategy '{}'", key))?;
        tracing::info!("Saved {} rules under '{}'", strategy.len(), key);
    }

    let strategies = store
        .load_all()
        .with_context(|| format!("Failed to load strategies from {}", store_path.display()))?;

    if args.json {
        print_json(&strategies)
    } else {
        print_text(&strategies);
        Ok(())
    }
}

fn load_rules(path: &Path) -> Result<Strategy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules: {}", path.display()))?;
    Strategy::from_json(&content).with_context(|| format!("Invalid rules in {}", path.display()))
}

fn print_text(strategies: &[NamedStrategy]) {
    for named in strategies {
        println!("\n{} ({})", named.name, named.key);
        if let Some(info) = preset_info(&named.key) {
            println!("  {}", info.description);
        }
        if named.strategy.is_empty() {
            println!("  (no rules)");
        }
        for (i, rule) in named.strategy.rules().iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, rule.id, rule);
        }
    }
}
