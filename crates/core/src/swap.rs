//! Swap entry point
//!
//! [`apply_swap`] validates a move, performs it on a copy of the board and
//! classifies the result: a fusion when both cells hold specials, a normal
//! match, or a revert when nothing matched. A rejected or reverted swap never
//! changes the caller's board.

use thiserror::Error;

use crate::board::Board;
use crate::combo::{resolve_combo, ComboResult};
use crate::matcher::{find_matches, MatchResult};
use crate::rng::RandomSource;
use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("position {0:?} is off the board")]
    OutOfBounds(Position),
    #[error("{0:?} and {1:?} are not adjacent")]
    NotAdjacent(Position, Position),
    #[error("cell {0:?} cannot be swapped")]
    Immovable(Position),
    #[error("a cascade is still resolving")]
    Busy,
}

impl SwapError {
    pub fn code(self) -> &'static str {
        match self {
            SwapError::OutOfBounds(_) | SwapError::NotAdjacent(..) => "invalid_swap",
            SwapError::Immovable(_) => "immovable",
            SwapError::Busy => "busy",
        }
    }
}

/// What a validated swap turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(MatchResult),
    Combo(ComboResult),
    /// No match; the board is the pre-swap board
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Post-swap board, or the original board when reverted
    pub board: Board,
    pub resolution: Resolution,
}

impl SwapOutcome {
    pub fn is_reverted(&self) -> bool {
        matches!(self.resolution, Resolution::Reverted)
    }
}

/// Reject swaps that are off the board, not adjacent, or touch an immovable cell
pub fn validate_swap(board: &Board, a: Position, b: Position) -> Result<(), SwapError> {
    for p in [a, b] {
        if !p.in_bounds() {
            return Err(SwapError::OutOfBounds(p));
        }
    }
    if !Board::are_adjacent(a, b) {
        return Err(SwapError::NotAdjacent(a, b));
    }
    for p in [a, b] {
        if !board.can_swap(p) {
            return Err(SwapError::Immovable(p));
        }
    }
    Ok(())
}

/// Swap `a` (origin) into `b` (destination) and classify the result
pub fn apply_swap(
    board: &Board,
    a: Position,
    b: Position,
    rng: &mut impl RandomSource,
) -> Result<SwapOutcome, SwapError> {
    validate_swap(board, a, b)?;

    let mut swapped = board.clone();
    swapped.swap(a, b);

    if let Some(combo) = resolve_combo(&swapped, a, b, rng) {
        return Ok(SwapOutcome {
            board: swapped,
            resolution: Resolution::Combo(combo),
        });
    }

    let result = find_matches(&swapped);
    if result.has_matches() {
        return Ok(SwapOutcome {
            board: swapped,
            resolution: Resolution::Matched(result),
        });
    }

    Ok(SwapOutcome {
        board: board.clone(),
        resolution: Resolution::Reverted,
    })
}
