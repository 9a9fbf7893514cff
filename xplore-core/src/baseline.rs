//! Epsilon-greedy baseline agent
//!
//! A fixed comparison policy: it never learns, it only gives a player's
//! score something to be measured against.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::board::Hex;
use crate::grid::Grid;

/// Exploration rate tuned for 20-turn missions on the standard value mix
pub const DEFAULT_EPSILON: f64 = 0.15;

/// Result of one baseline mission
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BaselineRun {
    pub score: i64,
    pub moves: u32,
    pub mines: u32,
}

/// Epsilon-greedy agent
#[derive(Clone, Copy, Debug)]
pub struct EpsilonGreedy {
    pub epsilon: f64,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Play `turns` turns from `start` over a read-only grid
    ///
    /// The agent keeps its own knowledge (visited tiles and their neighbors)
    /// and ignores the grid's reveal flags.
    pub fn play<R: Rng>(&self, grid: &Grid, start: Hex, turns: u32, rng: &mut R) -> BaselineRun {
        let mut knowledge = Knowledge::default();
        knowledge.learn(grid, start);

        let mut position = start;
        let mut run = BaselineRun::default();

        for _ in 0..turns {
            let exploring = rng.gen::<f64>() < self.epsilon;
            let next = if exploring {
                explore(grid, position, &knowledge, rng)
            } else {
                exploit(grid, position, &knowledge, rng)
            };

            match next {
                Some(target) => {
                    position = target;
                    run.moves += 1;
                    knowledge.learn(grid, position);
                }
                None => {
                    run.score += grid[position].true_value() as i64;
                    run.mines += 1;
                }
            }
        }

        run
    }
}

/// Tiles the agent has seen, in ascending (q, r) order
#[derive(Default)]
struct Knowledge {
    known: BTreeSet<Hex>,
    visited: BTreeSet<Hex>,
}

impl Knowledge {
    fn learn(&mut self, grid: &Grid, pos: Hex) {
        self.visited.insert(pos);
        self.known.insert(pos);
        self.known.extend(grid.neighbors(pos));
    }

    /// Best known tile, first in (q, r) order on ties
    fn best(&self, grid: &Grid, fallback: Hex) -> Hex {
        let mut best = (fallback, -1);
        for &hex in &self.known {
            let value = grid[hex].true_value();
            if value > best.1 {
                best = (hex, value);
            }
        }
        best.0
    }
}

/// Random step, preferring unvisited neighbors; `None` means mine
fn explore<R: Rng>(grid: &Grid, position: Hex, knowledge: &Knowledge, rng: &mut R) -> Option<Hex> {
    let neighbors = grid.neighbors(position);
    let unvisited: Vec<Hex> = neighbors
        .iter()
        .copied()
        .filter(|n| !knowledge.visited.contains(n))
        .collect();

    if unvisited.is_empty() {
        neighbors.choose(rng).copied()
    } else {
        unvisited.choose(rng).copied()
    }
}

/// Mine the best known tile, or step towards it; `None` means mine
fn exploit<R: Rng>(grid: &Grid, position: Hex, knowledge: &Knowledge, rng: &mut R) -> Option<Hex> {
    let goal = knowledge.best(grid, position);
    if goal == position {
        return None;
    }

    let neighbors = grid.neighbors(position);
    let closest = neighbors.iter().map(|n| n.distance_to(goal)).min()?;
    let candidates: Vec<Hex> = neighbors
        .into_iter()
        .filter(|n| n.distance_to(goal) == closest)
        .collect();
    candidates.choose(rng).copied()
}
