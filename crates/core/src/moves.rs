//! Legal-move search and board shuffling
//!
//! Everything here works on copies, so hint systems and automated players can
//! try candidate moves without touching live state.

use crate::board::Board;
use crate::matcher::find_matches;
use crate::rng::RandomSource;
use crate::scoring::calculate_base_score;
use crate::types::{Cell, Position, FUSION_BASE_POINTS};

/// Shuffle attempts before falling back to recoloring
const SHUFFLE_ATTEMPTS: usize = 64;

/// A candidate swap, `from` moves into `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

fn is_fusion(board: &Board, m: Move) -> bool {
    board.cell(m.from).special.is_some() && board.cell(m.to).special.is_some()
}

/// Would this swap produce a match (or a fusion)?
pub fn is_productive(board: &Board, m: Move) -> bool {
    if !board.can_swap(m.from) || !board.can_swap(m.to) || !Board::are_adjacent(m.from, m.to) {
        return false;
    }
    if is_fusion(board, m) {
        return true;
    }
    let mut swapped = board.clone();
    swapped.swap(m.from, m.to);
    [m.from, m.to].into_iter().any(|p| match swapped.matchable_color(p) {
        Some(color) => swapped.completes_run(p, color),
        None => false,
    })
}

/// Every productive swap, each unordered pair once (right and down neighbors)
pub fn find_possible_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    for pos in Board::positions() {
        for next in [pos.offset(0, 1), pos.offset(1, 0)] {
            let m = Move::new(pos, next);
            if next.in_bounds() && is_productive(board, m) {
                moves.push(m);
            }
        }
    }
    moves
}

pub fn has_legal_moves(board: &Board) -> bool {
    Board::positions().any(|pos| {
        [pos.offset(0, 1), pos.offset(1, 0)]
            .into_iter()
            .any(|next| next.in_bounds() && is_productive(board, Move::new(pos, next)))
    })
}

/// Immediate (first-round, unmultiplied) value of a move
///
/// Fusions are valued at their flat base award. Unproductive moves are 0.
pub fn evaluate_move(board: &Board, m: Move) -> u32 {
    if !is_productive(board, m) {
        return 0;
    }
    if is_fusion(board, m) {
        return FUSION_BASE_POINTS;
    }
    let mut swapped = board.clone();
    swapped.swap(m.from, m.to);
    calculate_base_score(&find_matches(&swapped))
}

/// Highest immediate value move, first found on ties
pub fn find_best_move(board: &Board) -> Option<Move> {
    let mut best: Option<(u32, Move)> = None;
    for m in find_possible_moves(board) {
        let value = evaluate_move(board, m);
        if best.map_or(true, |(v, _)| value > v) {
            best = Some((value, m));
        }
    }
    best.map(|(_, m)| m)
}

/// Re-deal the movable cells until the board has no runs and at least one move
///
/// Cells with obstacles and blockers stay where they are. If no permutation
/// works within the attempt budget, the movable cells are recolored instead.
pub fn shuffle(board: &Board, rng: &mut impl RandomSource) -> Board {
    let slots: Vec<Position> = Board::positions()
        .filter(|&p| {
            let cell = board.cell(p);
            cell.can_swap() && cell.obstacle.is_none()
        })
        .collect();
    let mut tokens: Vec<Cell> = slots.iter().map(|&p| board.cell(p)).collect();

    for _ in 0..SHUFFLE_ATTEMPTS {
        rng.shuffle(&mut tokens);
        let mut candidate = board.clone();
        for (&pos, &cell) in slots.iter().zip(&tokens) {
            candidate.set(pos, cell);
        }
        if !candidate.has_any_run() && has_legal_moves(&candidate) {
            return candidate;
        }
    }

    recolor(board, &slots, rng)
}

fn recolor(board: &Board, slots: &[Position], rng: &mut impl RandomSource) -> Board {
    let mut out = board.clone();
    for _ in 0..SHUFFLE_ATTEMPTS {
        for &pos in slots {
            out.set(pos, Cell::EMPTY);
        }
        out = crate::gravity::fill_empty_spaces(&out, rng);
        if has_legal_moves(&out) {
            break;
        }
    }
    out
}
