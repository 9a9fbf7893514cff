//! Integration tests for the XPLORE strategy simulator
//!
//! Tests the full stack: sector generation, policy decisions, missions,
//! batch simulation, benchmarks and the strategy store

use xplore_core::{
    create_sector, decide, generate_grid, preset, presets, run_mission, sector_size, Action,
    Condition, Grid, Hex, JsonFileStore, MemoryStore, MissionError, MissionState, MissionStatus,
    NamedStrategy, Operator, Rule, Strategy, StrategyError, StrategyStore, TurnAction,
    MISSION_TURNS, SECTOR_RADIUS,
};
use xplore_sim::{
    run_benchmark, run_monte_carlo, run_monte_carlo_with, summarize_mission, RunControl,
    SimConfig, SummaryConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn always_mine() -> Strategy {
    Strategy::new(vec![Rule::always("mine", Action::MineCurrent)])
}

/// Corner start at (4,0) worth 10, a 40 vein two steps in at (2,0)
fn vein_sector() -> Grid {
    Grid::from_fn(SECTOR_RADIUS, |hex| match (hex.q, hex.r) {
        (4, 0) => 10,
        (2, 0) => 40,
        _ => 15,
    })
}

// ============================================================================
// SECTOR & POLICY
// ============================================================================

#[test]
fn test_generated_sector_shape() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let grid = generate_grid(SECTOR_RADIUS, &mut rng);
    assert_eq!(grid.len(), sector_size(SECTOR_RADIUS));
    assert_eq!(grid.len(), 61);

    for tile in grid.tiles() {
        let v = tile.true_value();
        let jackpot = matches!(v, 35 | 40 | 45 | 50);
        let standard = (5..=30).contains(&v) && v % 5 == 0;
        assert!(jackpot || standard, "unexpected value {v}");
    }
}

#[test]
fn test_decide_is_pure() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let (grid, start) = create_sector(SECTOR_RADIUS, &mut rng);
    let mission = MissionState::new(grid, start, MISSION_TURNS);
    let recon = preset("recon").unwrap().strategy;

    let before = mission.grid().revealed_count();
    let a = decide(&mission, &recon);
    let b = decide(&mission, &recon);
    assert_eq!(a, b);
    assert_eq!(mission.grid().revealed_count(), before);
    assert_eq!(mission.turns_left(), MISSION_TURNS);
}

#[test]
fn test_value_hunter_walks_to_revealed_vein() {
    let mut mission = MissionState::new(vein_sector(), Hex::new(4, 0), MISSION_TURNS);
    let hunter = preset("value_hunter").unwrap().strategy;

    // Turn 1: nothing 40+ known yet, so seek the frontier
    let first = mission.step(&hunter).unwrap();
    assert_eq!(first.decision.chosen_rule, Some(1));
    assert!(first.decision.is_move());

    let log = mission.run_to_end(&hunter);
    assert_eq!(log.len() as u32 + 1, MISSION_TURNS);
    assert_eq!(mission.status(), MissionStatus::Finished);
    assert!(mission.total_yield() > 0);
}

// ============================================================================
// MISSIONS
// ============================================================================

#[test]
fn test_manual_controls() {
    let mut mission = MissionState::new(vein_sector(), Hex::new(4, 0), 5);

    assert_eq!(
        mission.move_to(Hex::new(2, 0)),
        Err(MissionError::NotAdjacent {
            from: Hex::new(4, 0),
            to: Hex::new(2, 0)
        })
    );
    assert_eq!(
        mission.move_to(Hex::new(9, 9)),
        Err(MissionError::InvalidCoordinate(Hex::new(9, 9)))
    );

    mission.move_to(Hex::new(3, 0)).unwrap();
    mission.move_to(Hex::new(2, 0)).unwrap();
    assert_eq!(mission.mine_all(), Ok(120));
    assert_eq!(mission.mine(), Err(MissionError::Finished));
    assert_eq!(mission.outcome().total_yield, 120);
}

#[test]
fn test_run_mission_always_mine() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let (grid, start) = create_sector(SECTOR_RADIUS, &mut rng);
    let outcome = run_mission(&always_mine(), grid, start, MISSION_TURNS);
    assert_eq!(outcome.total_yield, 200);
    assert_eq!((outcome.moves, outcome.mines), (0, 20));
}

#[test]
fn test_empty_strategy_mines_by_default() {
    let mut mission = MissionState::new(vein_sector(), Hex::new(4, 0), 3);
    let record = mission.step(&Strategy::default()).unwrap();
    assert_eq!(record.decision.action, TurnAction::Mine);
    assert_eq!(record.decision.chosen_rule, None);
    assert_eq!(record.yield_gained, 10);
}

// ============================================================================
// SIMULATION
// ============================================================================

#[test]
fn test_monte_carlo_always_mine() {
    let result = run_monte_carlo(&always_mine(), &SimConfig::default().with_seed(42));
    assert_eq!(result.completed(), 100);
    assert!(result.scores().all(|s| s == 200));
    assert_eq!(result.stats.mean, 200);
}

#[test]
fn test_monte_carlo_reproducible() {
    let homebody = preset("homebody").unwrap().strategy;
    let config = SimConfig::new(30).with_seed(11);
    let a = run_monte_carlo(&homebody, &config);
    let b = run_monte_carlo(&homebody, &config.clone().sequential());
    assert_eq!(a.trials, b.trials);
    for trial in &a.trials {
        assert!(trial.moves <= 1);
        assert_eq!(trial.moves + trial.mines, 20);
    }
}

#[test]
fn test_monte_carlo_cancelled_up_front() {
    let control = RunControl::new();
    control.cancel();
    let result = run_monte_carlo_with(&always_mine(), &SimConfig::new(50), &control, |_| {});
    assert!(result.cancelled);
    assert_eq!(result.completed(), 0);
}

#[test]
fn test_benchmark_presets() {
    let report = run_benchmark(&presets(), &SimConfig::new(25).with_seed(8));
    assert_eq!(report.entries.len(), 4);

    let custom = report.entry("custom").unwrap();
    assert!(!custom.defined);
    assert_eq!((custom.mean, custom.min, custom.max), (0, 0, 0));

    for entry in report.entries.iter().filter(|e| e.defined) {
        assert!(entry.min <= entry.mean && entry.mean <= entry.max);
    }
    assert!(report.best().is_some_and(|b| b.key != "custom"));
}

#[test]
fn test_summary_after_mission() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let (grid, start) = create_sector(SECTOR_RADIUS, &mut rng);
    let mut mission = MissionState::new(grid, start, MISSION_TURNS);
    mission.run_to_end(&preset("recon").unwrap().strategy);

    let summary = summarize_mission(&mission, &SummaryConfig::default(), &mut rng);
    assert_eq!(summary.player_score, mission.total_yield());
    assert_eq!(summary.player_moves + summary.player_mines, MISSION_TURNS);
    assert!(summary.performance >= 0);
}

// ============================================================================
// STRATEGY STORE
// ============================================================================

#[test]
fn test_unknown_tokens_rejected_at_load() {
    let json = r#"[{"id": "r1", "condition": "LUCK", "operator": ">=", "threshold": 1, "action": "MINE_CURRENT"}]"#;
    match Strategy::from_json(json) {
        Err(StrategyError::MalformedRule { rule, .. }) => assert_eq!(rule, "r1"),
        other => panic!("expected malformed rule, got {other:?}"),
    }

    let json = r#"[{"id": "r1", "condition": "ALWAYS", "operator": "<", "threshold": 1, "action": "MINE_CURRENT"}]"#;
    assert!(Strategy::from_json(json).is_err());
}

#[test]
fn test_store_round_trip_through_simulation() {
    let path = std::env::temp_dir().join(format!("xplore-it-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let mut store = JsonFileStore::new(&path);

    let rich_only = Strategy::new(vec![
        Rule::new("r1", Condition::CurrentValue, Operator::AtLeast, 0, Action::MineCurrent)
            .comparing_highest(),
        Rule::always("r2", Action::MoveHighestKnown),
    ]);
    store.save("custom", &rich_only).unwrap();

    let loaded: NamedStrategy = store.load("custom").unwrap().unwrap();
    assert_eq!(loaded.strategy, rich_only);

    let result = run_monte_carlo(&loaded.strategy, &SimConfig::new(10).with_seed(5));
    assert_eq!(result.completed(), 10);

    store.reset().unwrap();
    assert_eq!(store.load_all().unwrap(), MemoryStore::new().load_all().unwrap());
}
