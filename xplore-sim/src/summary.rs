//! Mission summary - a finished mission measured against the baseline agent
//!
//! Level 2 - Phase-level implementation

use rand::Rng;
use serde::Serialize;
use xplore_core::{EpsilonGreedy, MissionState};

use crate::monte_carlo::rounded_mean;

/// Baseline missions played per summary
pub const BASELINE_RUNS: usize = 100;

/// How the baseline is sampled
#[derive(Clone, Copy, Debug)]
pub struct SummaryConfig {
    pub runs: usize,
    pub agent: EpsilonGreedy,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            runs: BASELINE_RUNS,
            agent: EpsilonGreedy::default(),
        }
    }
}

/// Player totals next to the averaged baseline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MissionSummary {
    pub player_score: i64,
    pub player_moves: u32,
    pub player_mines: u32,
    /// Player ore per mining turn, rounded
    pub player_avg_yield: i64,
    pub baseline_score: i64,
    pub baseline_moves: i64,
    pub baseline_mines: i64,
    /// Baseline ore per mining turn, rounded
    pub baseline_avg_mined_value: i64,
    /// Player score minus baseline score
    pub score_diff: i64,
    /// Player score as a rounded percentage of the baseline
    pub performance: i64,
}

/// Replay the mission's sector with the baseline agent and compare
///
/// The baseline starts from the mission's start tile on the same grid; it
/// does not see what the player revealed.
pub fn summarize_mission<R: Rng>(
    state: &MissionState,
    config: &SummaryConfig,
    rng: &mut R,
) -> MissionSummary {
    let turns = state.turn_budget();
    let mut total_score = 0i64;
    let mut total_moves = 0i64;
    let mut total_mines = 0i64;

    for _ in 0..config.runs {
        let run = config.agent.play(state.grid(), state.start(), turns, rng);
        total_score += run.score;
        total_moves += i64::from(run.moves);
        total_mines += i64::from(run.mines);
    }

    let baseline_score = rounded_mean(total_score, config.runs);
    let player_score = state.total_yield();
    let player_mines = state.mines();

    tracing::debug!(player_score, baseline_score, "mission summarized");

    MissionSummary {
        player_score,
        player_moves: state.moves(),
        player_mines,
        player_avg_yield: rounded_mean(player_score, player_mines as usize),
        baseline_score,
        baseline_moves: rounded_mean(total_moves, config.runs),
        baseline_mines: rounded_mean(total_mines, config.runs),
        baseline_avg_mined_value: rounded_mean(total_score, total_mines as usize),
        score_diff: player_score - baseline_score,
        performance: rounded_mean(player_score * 100, baseline_score.max(1) as usize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use xplore_core::{preset, Grid, Hex};

    fn finished_homebody() -> MissionState {
        let grid = Grid::from_fn(4, |hex| match (hex.q, hex.r) {
            (4, 0) => 10,
            (3, 0) => 30,
            _ => 15,
        });
        let mut state = MissionState::new(grid, Hex::new(4, 0), 20);
        state.run_to_end(&preset("homebody").unwrap().strategy);
        state
    }

    #[test]
    fn test_summary_against_pure_greedy() {
        let state = finished_homebody();
        let config = SummaryConfig {
            runs: 10,
            agent: EpsilonGreedy::new(0.0),
        };
        let summary = summarize_mission(&state, &config, &mut ChaCha8Rng::seed_from_u64(1));

        // The greedy baseline walks to (3,0) and mines there, like the player
        assert_eq!(summary.player_score, 570);
        assert_eq!(summary.baseline_score, 570);
        assert_eq!(summary.baseline_moves, 1);
        assert_eq!(summary.baseline_mines, 19);
        assert_eq!(summary.baseline_avg_mined_value, 30);
        assert_eq!(summary.player_avg_yield, 30);
        assert_eq!(summary.score_diff, 0);
        assert_eq!(summary.performance, 100);
    }

    #[test]
    fn test_summary_default_baseline() {
        let state = finished_homebody();
        let summary = summarize_mission(&state, &SummaryConfig::default(), &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(summary.player_moves, 1);
        assert_eq!(summary.player_mines, 19);
        assert!(summary.baseline_moves + summary.baseline_mines <= 21);
        assert_eq!(summary.score_diff, summary.player_score - summary.baseline_score);
    }

    #[test]
    fn test_unplayed_mission() {
        let grid = Grid::from_fn(2, |hex| if hex == Hex::new(2, 0) { 10 } else { 5 });
        let state = MissionState::new(grid, Hex::new(2, 0), 20);
        let config = SummaryConfig {
            runs: 5,
            agent: EpsilonGreedy::new(0.0),
        };
        let summary = summarize_mission(&state, &config, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(summary.player_score, 0);
        assert_eq!(summary.player_avg_yield, 0);
        assert_eq!(summary.baseline_score, 200);
        assert_eq!(summary.performance, 0);
    }
}
