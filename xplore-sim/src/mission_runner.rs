//! Mission runner - executes single seeded missions
//!
//! Level 3 - Step-level implementation

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use xplore_core::{create_sector, run_mission, Hex, Strategy};

use crate::config::SimConfig;

/// Outcome of a single trial mission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrialResult {
    /// Position of the trial in its batch
    pub index: usize,
    /// Seed the trial's sector was generated from
    pub seed: u64,
    /// Corner the mission started on
    pub start: Hex,
    pub score: i64,
    pub moves: u32,
    pub mines: u32,
}

/// Plays missions over freshly generated sectors
pub struct MissionRunner {
    turn_budget: u32,
    radius: i32,
}

impl MissionRunner {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            turn_budget: config.turn_budget,
            radius: config.radius,
        }
    }

    /// Play one mission on the sector generated from `seed`
    pub fn play(&self, strategy: &Strategy, index: usize, seed: u64) -> TrialResult {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (grid, start) = create_sector(self.radius, &mut rng);
        let outcome = run_mission(strategy, grid, start, self.turn_budget);

        TrialResult {
            index,
            seed,
            start,
            score: outcome.total_yield,
            moves: outcome.moves,
            mines: outcome.mines,
        }
    }

    pub fn turn_budget(&self) -> u32 {
        self.turn_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xplore_core::{preset, Action, Rule};

    #[test]
    fn test_always_mine_scores_start_value() {
        let runner = MissionRunner::new(&SimConfig::default());
        let strategy = Strategy::new(vec![Rule::always("m", Action::MineCurrent)]);

        let result = runner.play(&strategy, 3, 99);
        assert_eq!(result.index, 3);
        assert_eq!(result.seed, 99);
        assert_eq!(result.score, 200);
        assert_eq!((result.moves, result.mines), (0, 20));
    }

    #[test]
    fn test_same_seed_same_trial() {
        let runner = MissionRunner::new(&SimConfig::default());
        let recon = preset("recon").unwrap().strategy;
        assert_eq!(runner.play(&recon, 0, 5), runner.play(&recon, 0, 5));
    }

    #[test]
    fn test_turn_budget_respected() {
        let runner = MissionRunner::new(&SimConfig::default().with_turn_budget(7));
        let hunter = preset("value_hunter").unwrap().strategy;
        let result = runner.play(&hunter, 0, 11);
        assert_eq!(result.moves + result.mines, 7);
        assert_eq!(runner.turn_budget(), 7);
    }
}
