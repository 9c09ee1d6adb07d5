//! Match detection - runs, activations, homing targets and creations
//!
//! [`find_matches`] reads a settled board and reports everything one
//! resolution round needs:
//!
//! 1. Horizontal then vertical runs of three or more equal matchable colors.
//!    Specials inside a run are activated on the spot (one activation per cell).
//! 2. Primed specials (hit by a sweep in the previous pass) are activated too.
//! 3. The provisional will-clear set: matched cells plus every activation area.
//! 4. Homing-strike targets, resolved in activation order so no two strikes
//!    land on the same area.
//! 5. Obstacle damage, one hit per obstacle per pass.
//! 6. Creations: L/T intersections and runs of five or more make a color-clear,
//!    runs of exactly four make a directional clear.
//!
//! A special caught by a sweep does not fire in the same pass; it is primed by
//! the resolver and fires on the next call.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::targeting::find_homing_target;
use crate::types::{
    Cell, Color, Direction, ObstacleKind, Position, Special, BOARD_COLS, BOARD_ROWS,
    MIN_MATCH_LEN,
};

/// A run of three or more equal colors along one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Cells in scan order (left to right, or top to bottom)
    pub cells: Vec<Position>,
    pub color: Color,
    pub direction: Direction,
}

impl Match {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell where a run-length creation lands (`cells[len / 2]`)
    pub fn middle(&self) -> Position {
        self.cells[self.cells.len() / 2]
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// A special that must fire this round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub pos: Position,
    pub special: Special,
    /// Color-clear target; for other kinds, the token's own color
    pub color: Color,
    /// Homing-strike landing cell, filled in once targets are resolved
    pub target: Option<Position>,
}

impl Activation {
    /// Cells this activation sweeps, against the given board
    ///
    /// Always includes the token's own cell. Blockers are never part of an area.
    pub fn area(&self, board: &Board) -> BTreeSet<Position> {
        let mut area = BTreeSet::new();
        area.insert(self.pos);
        match self.special {
            Special::RowClear => area.extend(Board::row_positions(self.pos.row)),
            Special::ColumnClear => area.extend(Board::col_positions(self.pos.col)),
            Special::AreaClear => area.extend(Board::square(self.pos, 1)),
            Special::ColorClear => area.extend(
                Board::positions().filter(|&p| board.matchable_color(p) == Some(self.color)),
            ),
            Special::HomingStrike => {
                if let Some(target) = self.target {
                    area.extend(Board::square(target, 1));
                }
            }
        }
        area.retain(|&p| !board.cell(p).is_blocker());
        area
    }
}

/// A special to place instead of emptying a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creation {
    pub pos: Position,
    pub special: Special,
    pub color: Color,
}

/// Everything [`find_matches`] found on one board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matches: Vec<Match>,
    pub activations: Vec<Activation>,
    pub creations: Vec<Creation>,
    /// Obstacles taking one point of damage this pass
    pub obstacle_damage: BTreeSet<Position>,
    /// Provisional clear set used for homing-strike avoidance
    pub will_clear: BTreeSet<Position>,
}

impl MatchResult {
    /// Nothing to resolve: no matches and no activations
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.activations.is_empty()
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Union of every matched cell
    pub fn matched_cells(&self) -> BTreeSet<Position> {
        self.matches.iter().flat_map(|m| m.cells.iter().copied()).collect()
    }

    pub fn is_activated(&self, pos: Position) -> bool {
        self.activations.iter().any(|a| a.pos == pos)
    }

    pub fn creation_at(&self, pos: Position) -> Option<&Creation> {
        self.creations.iter().find(|c| c.pos == pos)
    }

    fn activate(&mut self, pos: Position, special: Special, color: Color) {
        if !self.is_activated(pos) {
            self.activations.push(Activation {
                pos,
                special,
                color,
                target: None,
            });
        }
    }
}

/// Scan a settled board for matches and everything they trigger
///
/// Callers must only pass settled boards (no empty cells).
pub fn find_matches(board: &Board) -> MatchResult {
    debug_assert_eq!(board.empty_count(), 0, "find_matches on an unsettled board");

    let mut result = MatchResult::default();

    for row in 0..BOARD_ROWS {
        let line: ArrayVec<Position, 8> = Board::row_positions(row).collect();
        scan_line(board, &line, Direction::Horizontal, &mut result);
    }
    for col in 0..BOARD_COLS {
        let line: ArrayVec<Position, 8> = Board::col_positions(col).collect();
        scan_line(board, &line, Direction::Vertical, &mut result);
    }

    for pos in Board::positions() {
        let cell = board.cell(pos);
        if let (true, Some(special), Some(color)) = (cell.primed, cell.special, cell.color) {
            result.activate(pos, special, color);
        }
    }

    result.will_clear = result.matched_cells();
    for act in &result.activations {
        if act.special != Special::HomingStrike {
            result.will_clear.extend(act.area(board));
        } else {
            result.will_clear.insert(act.pos);
        }
    }

    // Homing strikes resolve after everything else is known, in order, each
    // reserving its landing area before the next one picks.
    for i in 0..result.activations.len() {
        if result.activations[i].special != Special::HomingStrike {
            continue;
        }
        let target = find_homing_target(board, &result.will_clear);
        result.activations[i].target = Some(target);
        result
            .will_clear
            .extend(Board::square(target, 1).filter(|&p| !board.cell(p).is_blocker()));
    }

    result.obstacle_damage = obstacle_damage(board, &result);
    add_creations(&mut result);
    result
}

/// Record every run of three or more along one line
fn scan_line(board: &Board, line: &[Position], direction: Direction, result: &mut MatchResult) {
    let mut i = 0;
    while i < line.len() {
        let Some(color) = board.matchable_color(line[i]) else {
            i += 1;
            continue;
        };
        let mut j = i + 1;
        while j < line.len() && board.matchable_color(line[j]) == Some(color) {
            j += 1;
        }
        if j - i >= MIN_MATCH_LEN {
            let cells = line[i..j].to_vec();
            for &pos in &cells {
                if let Some(special) = board.cell(pos).special {
                    result.activate(pos, special, color);
                }
            }
            result.matches.push(Match {
                cells,
                color,
                direction,
            });
        }
        i = j;
    }
}

fn damageable(cell: &Cell) -> bool {
    cell.obstacle.is_some_and(|o| !o.is_blocker() && o.health > 0)
}

/// Obstacles hit this pass: everything in the clear set, plus ice touching a match
fn obstacle_damage(board: &Board, result: &MatchResult) -> BTreeSet<Position> {
    let mut damage: BTreeSet<Position> = result
        .will_clear
        .iter()
        .copied()
        .filter(|&p| damageable(&board.cell(p)))
        .collect();

    for pos in result.matched_cells() {
        for n in Board::neighbors(pos) {
            let cell = board.cell(n);
            if damageable(&cell) && cell.obstacle.is_some_and(|o| o.kind == ObstacleKind::Ice) {
                damage.insert(n);
            }
        }
    }
    damage
}

/// L/T intersections, then runs of five or more, then runs of four
fn add_creations(result: &mut MatchResult) {
    let mut shape_cells: BTreeSet<Position> = BTreeSet::new();

    for h in result.matches.iter().filter(|m| m.direction == Direction::Horizontal) {
        for v in result.matches.iter().filter(|m| m.direction == Direction::Vertical) {
            let shared: ArrayVec<Position, 8> =
                h.cells.iter().copied().filter(|&p| v.contains(p)).collect();
            if let [pos] = shared.as_slice() {
                if shape_cells.insert(*pos) {
                    result.creations.push(Creation {
                        pos: *pos,
                        special: Special::ColorClear,
                        color: h.color,
                    });
                }
            }
        }
    }

    let mut long_runs = Vec::new();
    for m in result.matches.iter().filter(|m| m.len() >= 5) {
        if m.cells.iter().any(|p| shape_cells.contains(p)) {
            continue;
        }
        long_runs.push(Creation {
            pos: m.middle(),
            special: Special::ColorClear,
            color: m.color,
        });
    }
    for creation in long_runs {
        if result.creation_at(creation.pos).is_none() {
            result.creations.push(creation);
        }
    }

    let mut fours = Vec::new();
    for m in result.matches.iter().filter(|m| m.len() == 4) {
        fours.push(Creation {
            pos: m.middle(),
            special: m.direction.rocket(),
            color: m.color,
        });
    }
    for creation in fours {
        if result.creation_at(creation.pos).is_none() {
            result.creations.push(creation);
        }
    }
}
