//! Homing-strike target selection
//!
//! Candidates are tried in a fixed order and every step skips cells already
//! in the `cleared` set:
//!
//! 1. The highest [`Special::target_priority`] special that is not a homing strike
//! 2. The colored cell with the most same-color live neighbors, preferring lower rows
//! 3. Any colored cell, scanning from the bottom row upward
//! 4. The board center

use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::{Position, BOARD_COLS, BOARD_ROWS};

/// Row bonus weight: one neighbor outweighs any row difference
const NEIGHBOR_WEIGHT: u32 = 10;

/// Pick where one homing strike lands
pub fn find_homing_target(board: &Board, cleared: &BTreeSet<Position>) -> Position {
    special_target(board, cleared)
        .or_else(|| cluster_target(board, cleared))
        .or_else(|| bottom_up_target(board, cleared))
        .unwrap_or(Position::CENTER)
}

/// Pick `count` targets one after another, reserving a square of `radius`
/// around each before choosing the next
pub fn find_homing_targets(
    board: &Board,
    cleared: &mut BTreeSet<Position>,
    count: usize,
    radius: i8,
) -> Vec<Position> {
    let mut targets = Vec::with_capacity(count);
    for _ in 0..count {
        let target = find_homing_target(board, cleared);
        cleared.extend(Board::square(target, radius).filter(|&p| !board.cell(p).is_blocker()));
        targets.push(target);
    }
    targets
}

fn special_target(board: &Board, cleared: &BTreeSet<Position>) -> Option<Position> {
    let mut best: Option<(u8, Position)> = None;
    for pos in Board::positions() {
        if cleared.contains(&pos) {
            continue;
        }
        let Some(special) = board.cell(pos).special else {
            continue;
        };
        let priority = special.target_priority();
        if priority == 0 {
            continue;
        }
        if best.map_or(true, |(p, _)| priority > p) {
            best = Some((priority, pos));
        }
    }
    best.map(|(_, pos)| pos)
}

fn cluster_target(board: &Board, cleared: &BTreeSet<Position>) -> Option<Position> {
    let mut best: Option<(u32, Position)> = None;
    for pos in Board::positions() {
        if cleared.contains(&pos) {
            continue;
        }
        let Some(color) = board.matchable_color(pos) else {
            continue;
        };
        let neighbors = Board::neighbors(pos)
            .into_iter()
            .filter(|n| !cleared.contains(n) && board.matchable_color(*n) == Some(color))
            .count() as u32;
        if neighbors == 0 {
            continue;
        }
        let score = neighbors * NEIGHBOR_WEIGHT + pos.row as u32;
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, pos));
        }
    }
    best.map(|(_, pos)| pos)
}

fn bottom_up_target(board: &Board, cleared: &BTreeSet<Position>) -> Option<Position> {
    (0..BOARD_ROWS)
        .rev()
        .flat_map(|r| (0..BOARD_COLS).map(move |c| Position::new(r, c)))
        .find(|p| !cleared.contains(p) && board.matchable_color(*p).is_some())
}
