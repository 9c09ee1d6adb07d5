//! Level configuration and initial board construction
//!
//! Levels are plain JSON documents:
//!
//! ```json
//! {
//!   "name": "frozen-corner",
//!   "move_limit": 20,
//!   "obstacles": [
//!     { "row": 7, "col": 0, "kind": "ice", "health": 2 },
//!     { "row": 3, "col": 3, "kind": "blocker" }
//!   ],
//!   "objectives": [{ "color": "red", "count": 30 }, { "score": 5000 }]
//! }
//! ```
//!
//! [`LevelConfig::from_json`] validates placements strictly. [`generate_board`]
//! accepts any config and skips placements it cannot honor, logging each one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::board::Board;
use crate::gravity::fill_empty_spaces;
use crate::moves::{has_legal_moves, shuffle};
use crate::rng::RandomSource;
use crate::types::{Color, Difficulty, ObstacleKind, Position, Special};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("obstacle at ({row}, {col}) is off the board")]
    OutOfBounds { row: i8, col: i8 },
    #[error("obstacle at ({row}, {col}) has zero health")]
    ZeroHealth { row: i8, col: i8 },
    #[error("more than one obstacle at ({row}, {col})")]
    Duplicate { row: i8, col: i8 },
}

fn default_health() -> u8 {
    1
}

/// One obstacle in a level file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstaclePlacement {
    pub row: i8,
    pub col: i8,
    pub kind: ObstacleKind,
    /// Ignored for blockers
    #[serde(default = "default_health")]
    pub health: u8,
}

impl ObstaclePlacement {
    pub fn new(row: i8, col: i8, kind: ObstacleKind, health: u8) -> Self {
        Self { row, col, kind, health }
    }

    pub fn pos(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// A level goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Objective {
    /// Clear `count` tokens of one color
    ClearColor { color: Color, count: u32 },
    /// Reach a total score
    ReachScore { score: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub obstacles: Vec<ObstaclePlacement>,
    /// Classic mode: moves available
    pub move_limit: Option<u32>,
    /// Arcade mode: milliseconds available
    pub time_limit_ms: Option<u64>,
    pub objectives: Vec<Objective>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "endless".to_string(),
            obstacles: Vec::new(),
            move_limit: None,
            time_limit_ms: None,
            objectives: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Parse and validate a level document
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelConfig = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        let mut seen = BTreeSet::new();
        for placement in &self.obstacles {
            check_placement(placement)?;
            if !seen.insert(placement.pos()) {
                return Err(LevelError::Duplicate {
                    row: placement.row,
                    col: placement.col,
                });
            }
        }
        Ok(())
    }
}

fn check_placement(placement: &ObstaclePlacement) -> Result<(), LevelError> {
    let (row, col) = (placement.row, placement.col);
    if !placement.pos().in_bounds() {
        return Err(LevelError::OutOfBounds { row, col });
    }
    if placement.kind != ObstacleKind::Blocker && placement.health == 0 {
        return Err(LevelError::ZeroHealth { row, col });
    }
    Ok(())
}

/// Build the opening board for a level
///
/// Blockers go down first so the fill sees them. Every other cell is filled
/// without runs, obstacle overlays are laid on top, and free cells may start
/// with a random special depending on difficulty. A board without a legal
/// move is re-dealt before it is returned.
pub fn generate_board(
    level: &LevelConfig,
    difficulty: Difficulty,
    rng: &mut impl RandomSource,
) -> Board {
    let mut placed = BTreeSet::new();
    let mut overlays = Vec::new();
    let mut board = Board::new();

    for placement in &level.obstacles {
        if let Err(err) = check_placement(placement) {
            warn!(
                level = %level.name,
                kind = placement.kind.as_str(),
                %err,
                "skipping obstacle placement"
            );
            continue;
        }
        if !placed.insert(placement.pos()) {
            warn!(
                level = %level.name,
                kind = placement.kind.as_str(),
                row = placement.row,
                col = placement.col,
                "skipping duplicate obstacle placement"
            );
            continue;
        }
        if placement.kind == ObstacleKind::Blocker {
            board = board.with_obstacle(placement.pos(), ObstacleKind::Blocker, 1);
        } else {
            overlays.push(*placement);
        }
    }

    board = fill_empty_spaces(&board, rng);
    for placement in overlays {
        board = board.with_obstacle(placement.pos(), placement.kind, placement.health);
    }

    let chance = difficulty.special_seed_chance();
    if chance > 0.0 {
        for pos in Board::positions() {
            let mut cell = board.cell(pos);
            if cell.color.is_none() || cell.obstacle.is_some() {
                continue;
            }
            if rng.chance(chance) {
                cell.special = Some(Special::ALL[rng.next_index(Special::ALL.len())]);
                board.set(pos, cell);
            }
        }
    }

    if !has_legal_moves(&board) {
        board = shuffle(&board, rng);
    }
    board
}
