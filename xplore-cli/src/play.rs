//! Play command - one autopilot mission with a turn-by-turn log
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_mission(), report_results()
//! - Level 3: print_turn(), print_summary()
//! - Level 4: shared helpers in `output`

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use xplore_core::{
    create_sector, Hex, MissionOutcome, MissionState, NamedStrategy, TurnAction, TurnRecord,
    MISSION_TURNS, SECTOR_RADIUS,
};
use xplore_sim::{summarize_mission, MissionSummary, SummaryConfig};

use crate::output::{create_rng, load_strategy, print_json};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Store key of the strategy to play
    #[arg(long, default_value = "recon")]
    pub preset: String,

    /// Show every rule's evaluation on each turn
    #[arg(long)]
    pub trace: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything one played mission produced
#[derive(Serialize)]
struct PlayedMission {
    key: String,
    name: String,
    start: Hex,
    turns: Vec<TurnRecord>,
    outcome: MissionOutcome,
    revealed: usize,
    summary: MissionSummary,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load the strategy and generate a sector
/// 2. Let the strategy play every turn
/// 3. Compare against the baseline agent and report
pub fn run(args: PlayArgs, store: &Path, seed: Option<u64>) -> Result<()> {
    let strategy = load_strategy(store, &args.preset)?;
    tracing::info!("Playing {} for {} turns", strategy.name, MISSION_TURNS);

    let played = play_mission(&strategy, seed);
    report_results(&played, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_mission(strategy: &NamedStrategy, seed: Option<u64>) -> PlayedMission {
    let mut rng = create_rng(seed);
    let (grid, start) = create_sector(SECTOR_RADIUS, &mut rng);

    let mut mission = MissionState::new(grid, start, MISSION_TURNS);
    let turns = mission.run_to_end(&strategy.strategy);
    let summary = summarize_mission(&mission, &SummaryConfig::default(), &mut rng);

    PlayedMission {
        key: strategy.key.clone(),
        name: strategy.name.clone(),
        start,
        turns,
        outcome: mission.outcome(),
        revealed: mission.grid().revealed_count(),
        summary,
    }
}

fn report_results(played: &PlayedMission, args: &PlayArgs) -> Result<()> {
    if args.json {
        return print_json(played);
    }

    println!("\n=== Mission: {} ===", played.name);
    println!("Start: {}", played.start);
    for record in &played.turns {
        print_turn(record, args.trace);
    }
    print_summary(played);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_turn(record: &TurnRecord, trace: bool) {
    let decision = &record.decision;
    let rule = decision
        .chosen_rule
        .and_then(|i| decision.trace.get(i))
        .map(|t| t.rule_id.as_str())
        .unwrap_or("default");

    match decision.action {
        TurnAction::Mine => println!(
            "Turn {:>2} {}: MINE +{} [{}]",
            record.turn, record.position, record.yield_gained, rule
        ),
        TurnAction::Move(target) => println!(
            "Turn {:>2} {}: MOVE -> {} ({} revealed) [{}]",
            record.turn, record.position, target, record.newly_revealed, rule
        ),
    }

    if trace {
        for step in &decision.trace {
            let mark = match (step.chosen, step.met) {
                (true, _) => ">",
                (false, true) => "+",
                (false, false) => " ",
            };
            println!("        {} {}", mark, step.rule_id);
        }
    }
}

fn print_summary(played: &PlayedMission) {
    let s = &played.summary;

    println!("\n=== Summary ===");
    println!("Ore extracted: {}", played.outcome.total_yield);
    println!(
        "Moves: {}  Mines: {}  Avg yield per mine: {}",
        s.player_moves, s.player_mines, s.player_avg_yield
    );
    println!("Tiles revealed: {}", played.revealed);
    println!(
        "Baseline (epsilon-greedy): {} ore, {} moves, {} mines, {} per mine",
        s.baseline_score, s.baseline_moves, s.baseline_mines, s.baseline_avg_mined_value
    );
    println!("Difference: {:+}  Performance: {}%", s.score_diff, s.performance);
}
