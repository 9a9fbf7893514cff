//! Policy engine - turns an ordered strategy into one concrete turn action
//!
//! Every rule's predicate is evaluated on every decision so the caller gets
//! a complete trace; only the resulting action is first-match-wins.

use serde::Serialize;

use crate::board::Hex;
use crate::grid::Grid;
use crate::mission::MissionState;
use crate::strategy::{Action, Condition, Rule, Strategy};

/// Number of center-most neighbors considered by `SeekFrontier`
const FRONTIER_CANDIDATES: usize = 3;

/// Highest known value when nothing is revealed
const NOTHING_KNOWN: i32 = -1;

// ============================================================================
// TYPES
// ============================================================================

/// Concrete action for one turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TurnAction {
    Mine,
    Move(Hex),
}

/// Per-rule evaluation record
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleTrace {
    pub rule_id: String,
    pub met: bool,
    pub chosen: bool,
}

/// Best revealed tile at decision time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct KnownBest {
    pub coord: Hex,
    pub value: i32,
}

/// Outcome of one decision step
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub action: TurnAction,
    /// Index of the chosen rule, `None` when the default MINE applied
    pub chosen_rule: Option<usize>,
    pub trace: Vec<RuleTrace>,
    pub highest_known: KnownBest,
}

impl Decision {
    /// Move target, if the decision is a move
    pub fn target(&self) -> Option<Hex> {
        match self.action {
            TurnAction::Move(target) => Some(target),
            TurnAction::Mine => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self.action, TurnAction::Move(_))
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Decide the next action for a mission
pub fn decide(state: &MissionState, strategy: &Strategy) -> Decision {
    decide_at(state.grid(), state.position(), state.turns_left(), strategy)
}

/// Decide from raw inputs; never mutates the grid or the strategy
pub fn decide_at(grid: &Grid, position: Hex, turns_left: u32, strategy: &Strategy) -> Decision {
    let best = highest_known(grid, position);
    let ctx = Context {
        current_value: grid[position].true_value(),
        turns_left: i32::try_from(turns_left).unwrap_or(i32::MAX),
        highest: best.value,
    };

    let met: Vec<bool> = strategy.rules().iter().map(|rule| ctx.holds(rule)).collect();
    let chosen_rule = met.iter().position(|&m| m);

    let trace = strategy
        .rules()
        .iter()
        .zip(&met)
        .enumerate()
        .map(|(i, (rule, &met))| RuleTrace {
            rule_id: rule.id.clone(),
            met,
            chosen: chosen_rule == Some(i),
        })
        .collect();

    let action = match chosen_rule {
        Some(i) => resolve(strategy.rules()[i].action, grid, position, best),
        None => TurnAction::Mine,
    };

    Decision {
        action,
        chosen_rule,
        trace,
        highest_known: best,
    }
}

/// Highest revealed value and its coordinate, first in (q, r) order on ties
pub fn highest_known(grid: &Grid, position: Hex) -> KnownBest {
    let mut best = KnownBest {
        coord: position,
        value: NOTHING_KNOWN,
    };
    for tile in grid.tiles().filter(|t| t.is_revealed()) {
        if tile.true_value() > best.value {
            best = KnownBest {
                coord: tile.coord,
                value: tile.true_value(),
            };
        }
    }
    best
}

/// Snapshot of the values the predicates read
struct Context {
    current_value: i32,
    turns_left: i32,
    highest: i32,
}

impl Context {
    fn holds(&self, rule: &Rule) -> bool {
        match rule.condition {
            Condition::Always => true,
            Condition::CurrentValue => {
                let rhs = if rule.compare_with_highest {
                    self.highest
                } else {
                    rule.threshold
                };
                rule.operator.compare(self.current_value, rhs)
            }
            Condition::TurnsRemaining => rule.operator.compare(self.turns_left, rule.threshold),
            Condition::HighestValue => rule.operator.compare(self.highest, rule.threshold),
        }
    }
}

// ============================================================================
// ACTION RESOLUTION
// ============================================================================

fn resolve(action: Action, grid: &Grid, position: Hex, best: KnownBest) -> TurnAction {
    match action {
        Action::MineCurrent => TurnAction::Mine,
        Action::MoveHighestKnown => move_towards(grid, position, best.coord),
        Action::SeekFrontier => seek_frontier(grid, position),
    }
}

/// Step to the neighbor closest to `goal`, or mine when already there
fn move_towards(grid: &Grid, position: Hex, goal: Hex) -> TurnAction {
    if position == goal {
        return TurnAction::Mine;
    }
    // min_by_key keeps the first minimum, i.e. direction order on ties
    grid.neighbors(position)
        .into_iter()
        .min_by_key(|n| n.distance_to(goal))
        .map_or(TurnAction::Mine, TurnAction::Move)
}

/// Among the three center-most neighbors, step to the richest one
fn seek_frontier(grid: &Grid, position: Hex) -> TurnAction {
    let mut neighbors = grid.neighbors(position);
    neighbors.sort_by_key(|n| n.distance_to_center());

    let mut pick: Option<(Hex, i32)> = None;
    for &n in neighbors.iter().take(FRONTIER_CANDIDATES) {
        let value = grid[n].true_value();
        if pick.map_or(true, |(_, v)| value > v) {
            pick = Some((n, value));
        }
    }

    pick.map_or(TurnAction::Mine, |(n, _)| TurnAction::Move(n))
}
