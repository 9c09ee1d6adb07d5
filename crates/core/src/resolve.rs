//! Effect resolution - turns a [`MatchResult`] into the next board
//!
//! Order of operations for one round:
//!
//! 1. Queued obstacle damage is applied (health -1, removed at 0).
//! 2. The clear set is rebuilt from matched cells and every activation area,
//!    read against the damaged board.
//! 3. Each cell in the clear set is then turned into a created special (any
//!    surviving obstacle stays on it), kept (an obstacle absorbed the hit),
//!    primed (an un-activated special caught by a sweep), or emptied.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::matcher::{Creation, MatchResult};
use crate::types::{Cell, Color, Position, Special};

/// A cell emptied this round, with what it held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedCell {
    pub pos: Position,
    pub color: Option<Color>,
    pub special: Option<Special>,
}

/// Outcome of one removal step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub board: Board,
    pub cleared: Vec<ClearedCell>,
    /// Obstacles that took a hit
    pub obstacles_damaged: u32,
    /// Obstacles whose health reached 0
    pub obstacles_cleared: u32,
    pub created: Vec<Creation>,
    /// Specials caught by a sweep, firing on the next pass
    pub primed: Vec<Position>,
}

impl Removal {
    pub fn cleared_count(&self) -> usize {
        self.cleared.len()
    }
}

/// Apply one round of matches, activations and creations
pub fn remove_matches(board: &Board, result: &MatchResult) -> Removal {
    let mut out = board.clone();
    let (damaged, destroyed) = apply_damage(&mut out, &result.obstacle_damage);

    let mut to_remove = result.matched_cells();
    for act in &result.activations {
        to_remove.extend(act.area(&out));
    }
    let activated: BTreeSet<Position> = result.activations.iter().map(|a| a.pos).collect();

    let mut removal = clear_cells(out, &to_remove, &activated, &result.creations);
    removal.obstacles_damaged = damaged;
    removal.obstacles_cleared = destroyed;
    removal
}

/// One point of damage to every listed obstacle; blockers are immune
///
/// Returns (damaged, destroyed).
pub fn apply_damage(board: &mut Board, targets: &BTreeSet<Position>) -> (u32, u32) {
    let mut damaged = 0;
    let mut destroyed = 0;
    for &pos in targets {
        let mut cell = board.cell(pos);
        let Some(mut obstacle) = cell.obstacle else {
            continue;
        };
        if obstacle.is_blocker() || obstacle.health == 0 {
            continue;
        }
        obstacle.health -= 1;
        damaged += 1;
        cell.obstacle = if obstacle.health == 0 {
            destroyed += 1;
            None
        } else {
            Some(obstacle)
        };
        board.set(pos, cell);
    }
    (damaged, destroyed)
}

/// Empty, prime or transform every cell in `to_remove`
///
/// `activated` lists specials that fired this round and are consumed; any
/// other special in the set is primed instead of emptied.
pub fn clear_cells(
    mut board: Board,
    to_remove: &BTreeSet<Position>,
    activated: &BTreeSet<Position>,
    creations: &[Creation],
) -> Removal {
    let mut cleared = Vec::new();
    let mut created = Vec::new();
    let mut primed = Vec::new();

    for &pos in to_remove {
        let cell = board.cell(pos);
        if cell.is_blocker() {
            continue;
        }
        // A surviving obstacle stays on top of the new special.
        if let Some(creation) = pick_creation(creations, pos) {
            board.set(
                pos,
                Cell {
                    obstacle: cell.obstacle,
                    ..Cell::special(creation.color, creation.special)
                },
            );
            created.push(creation);
            continue;
        }
        if cell.obstacle.is_some() {
            continue;
        }
        if cell.special.is_some() && !activated.contains(&pos) {
            board.set(pos, Cell { primed: true, ..cell });
            primed.push(pos);
            continue;
        }
        if cell.color.is_some() {
            cleared.push(ClearedCell {
                pos,
                color: cell.color,
                special: cell.special,
            });
        }
        board.set(pos, Cell::EMPTY);
    }

    Removal {
        board,
        cleared,
        obstacles_damaged: 0,
        obstacles_cleared: 0,
        created,
        primed,
    }
}

/// Creation for a cell; color-clear beats directional clears
fn pick_creation(creations: &[Creation], pos: Position) -> Option<Creation> {
    creations
        .iter()
        .filter(|c| c.pos == pos)
        .max_by_key(|c| c.special == Special::ColorClear)
        .copied()
}
