//! Mission state and the turn simulator
//!
//! A mission owns its grid outright; every turn mutates it in place.

use serde::Serialize;
use thiserror::Error;

use crate::board::Hex;
use crate::grid::Grid;
use crate::policy::{decide, Decision, TurnAction};
use crate::strategy::Strategy;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Turns in a standard mission
pub const MISSION_TURNS: u32 = 20;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Mission lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MissionStatus {
    /// Created, no turn taken yet
    Idle,
    Playing,
    /// Terminal; reached exactly when no turns are left
    Finished,
}

/// Errors from driving a mission
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("mission is finished")]
    Finished,

    #[error("invalid coordinate {0}: outside the sector")]
    InvalidCoordinate(Hex),

    #[error("cannot move from {from} to {to}: not adjacent")]
    NotAdjacent { from: Hex, to: Hex },
}

/// Record of one autonomous turn
#[derive(Clone, Debug, Serialize)]
pub struct TurnRecord {
    /// 1-based turn number
    pub turn: u32,
    pub position: Hex,
    pub decision: Decision,
    /// Ore gained this turn (0 for moves)
    pub yield_gained: i64,
    /// Tiles revealed this turn (0 for mining)
    pub newly_revealed: usize,
}

/// Final tally of a mission
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MissionOutcome {
    pub total_yield: i64,
    pub moves: u32,
    pub mines: u32,
}

// ============================================================================
// MISSION STATE
// ============================================================================

/// One mission: position, turn budget, ore and the grid it owns
#[derive(Clone, Debug)]
pub struct MissionState {
    grid: Grid,
    start: Hex,
    position: Hex,
    turn_budget: u32,
    turns_left: u32,
    total_yield: i64,
    visited: Vec<Hex>,
    status: MissionStatus,
    moves: u32,
    mines: u32,
}

impl MissionState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Start a mission on `grid` at `start`
    ///
    /// The start and its neighbors are revealed before the first turn.
    /// Panics if `start` is outside the grid.
    pub fn new(mut grid: Grid, start: Hex, turn_budget: u32) -> Self {
        assert!(grid.contains(start), "start {start} is outside the sector");
        grid.reveal(start);

        Self {
            grid,
            start,
            position: start,
            turn_budget,
            turns_left: turn_budget,
            total_yield: 0,
            visited: vec![start],
            status: if turn_budget == 0 {
                MissionStatus::Finished
            } else {
                MissionStatus::Idle
            },
            moves: 0,
            mines: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Hex {
        self.start
    }

    pub fn position(&self) -> Hex {
        self.position
    }

    pub fn turn_budget(&self) -> u32 {
        self.turn_budget
    }

    pub fn turns_left(&self) -> u32 {
        self.turns_left
    }

    pub fn total_yield(&self) -> i64 {
        self.total_yield
    }

    /// Visited coordinates in first-visit order
    pub fn visited(&self) -> &[Hex] {
        &self.visited
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == MissionStatus::Finished
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn mines(&self) -> u32 {
        self.mines
    }

    /// Turns already spent
    pub fn turns_spent(&self) -> u32 {
        self.turn_budget - self.turns_left
    }

    pub fn outcome(&self) -> MissionOutcome {
        MissionOutcome {
            total_yield: self.total_yield,
            moves: self.moves,
            mines: self.mines,
        }
    }

    // ========================================================================
    // AUTONOMOUS PLAY
    // ========================================================================

    /// Let the strategy play one turn
    pub fn step(&mut self, strategy: &Strategy) -> Result<TurnRecord, MissionError> {
        self.ensure_active()?;

        let turn = self.turns_spent() + 1;
        let position = self.position;
        let decision = decide(self, strategy);

        let (yield_gained, newly_revealed) = match decision.action {
            TurnAction::Mine => (self.mine_current(), 0),
            TurnAction::Move(target) => (0, self.relocate(target)),
        };
        self.end_turn(1);

        Ok(TurnRecord {
            turn,
            position,
            decision,
            yield_gained,
            newly_revealed,
        })
    }

    /// Let the strategy play every remaining turn
    pub fn run_to_end(&mut self, strategy: &Strategy) -> Vec<TurnRecord> {
        let mut log = Vec::with_capacity(self.turns_left as usize);
        while let Ok(record) = self.step(strategy) {
            log.push(record);
        }
        log
    }

    // ========================================================================
    // MANUAL CONTROLS
    // ========================================================================

    /// Mine the current tile for one turn, returning the ore gained
    pub fn mine(&mut self) -> Result<i64, MissionError> {
        self.ensure_active()?;
        let gained = self.mine_current();
        self.end_turn(1);
        Ok(gained)
    }

    /// Move to an adjacent tile, returning the number of newly revealed tiles
    pub fn move_to(&mut self, target: Hex) -> Result<usize, MissionError> {
        self.ensure_active()?;
        if !self.grid.contains(target) {
            return Err(MissionError::InvalidCoordinate(target));
        }
        if self.position.distance_to(target) != 1 {
            return Err(MissionError::NotAdjacent {
                from: self.position,
                to: target,
            });
        }
        let revealed = self.relocate(target);
        self.end_turn(1);
        Ok(revealed)
    }

    /// Spend every remaining turn mining the current tile
    ///
    /// Same totals as calling [`mine`](Self::mine) once per remaining turn.
    pub fn mine_all(&mut self) -> Result<i64, MissionError> {
        self.ensure_active()?;
        let turns = self.turns_left;
        let gained = self.grid.mine(self.position, turns);
        self.total_yield += gained;
        self.mines += turns;
        self.end_turn(turns);
        Ok(gained)
    }

    // ========================================================================
    // TURN HELPERS
    // ========================================================================

    fn ensure_active(&self) -> Result<(), MissionError> {
        if self.is_finished() {
            Err(MissionError::Finished)
        } else {
            Ok(())
        }
    }

    fn mine_current(&mut self) -> i64 {
        let gained = self.grid.mine(self.position, 1);
        self.total_yield += gained;
        self.mines += 1;
        gained
    }

    fn relocate(&mut self, target: Hex) -> usize {
        self.position = target;
        self.moves += 1;
        if !self.visited.contains(&target) {
            self.visited.push(target);
        }
        self.grid.reveal(target)
    }

    fn end_turn(&mut self, turns: u32) {
        self.turns_left -= turns;
        self.status = if self.turns_left == 0 {
            MissionStatus::Finished
        } else {
            MissionStatus::Playing
        };
    }
}

/// Run a full mission driven by `strategy`
pub fn run_mission(strategy: &Strategy, grid: Grid, start: Hex, turn_budget: u32) -> MissionOutcome {
    let mut mission = MissionState::new(grid, start, turn_budget);
    mission.run_to_end(strategy);
    mission.outcome()
}
