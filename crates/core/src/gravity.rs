//! Gravity and refill - the settle half of a cascade round
//!
//! Both functions are pure: they take a board and return the next one.
//! Blockers split each column into independent segments and never move.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::rng::RandomSource;
use crate::types::{Cell, Color, Position, BOARD_COLS, BOARD_ROWS, PALETTE};

/// Compact every column downward, preserving order, empties on top
///
/// Each run of non-blocker rows between blockers (or the board edges) is
/// compacted on its own: cells above a blocker come to rest on it.
pub fn apply_gravity(board: &Board) -> Board {
    let mut out = board.clone();
    for col in 0..BOARD_COLS {
        let mut bottom = BOARD_ROWS - 1;
        loop {
            // Skip blockers from the bottom of the current segment.
            while bottom >= 0 && board.cell(Position::new(bottom, col)).is_blocker() {
                bottom -= 1;
            }
            if bottom < 0 {
                break;
            }
            let mut top = bottom;
            while top > 0 && !board.cell(Position::new(top - 1, col)).is_blocker() {
                top -= 1;
            }
            compact_segment(board, &mut out, col, top, bottom);
            bottom = top - 1;
        }
    }
    out
}

/// Compact rows `top..=bottom` of one column into `out`
fn compact_segment(board: &Board, out: &mut Board, col: i8, top: i8, bottom: i8) {
    let mut write = bottom;
    for read in (top..=bottom).rev() {
        let cell = board.cell(Position::new(read, col));
        if cell.color.is_some() {
            out.set(Position::new(write, col), cell);
            write -= 1;
        }
    }
    for row in top..=write {
        out.set(Position::new(row, col), Cell::EMPTY);
    }
}

/// Colors that may go at `pos` without completing a run through it
pub fn refill_options(board: &Board, pos: Position) -> ArrayVec<Color, 6> {
    PALETTE
        .iter()
        .copied()
        .filter(|&color| !board.completes_run(pos, color))
        .collect()
}

/// Give every empty non-blocker cell a random color
///
/// Cells are filled in row-major order, each drawing uniformly among the
/// colors that would not complete a run through it given everything already
/// on the board. If every color is excluded the whole palette is used.
/// Runs that gravity formed among existing cells are left alone for the
/// next detection pass.
pub fn fill_empty_spaces(board: &Board, rng: &mut impl RandomSource) -> Board {
    let mut out = board.clone();
    for pos in Board::positions() {
        if !out.cell(pos).is_empty() {
            continue;
        }
        let options = refill_options(&out, pos);
        let color = if options.is_empty() {
            rng.next_color()
        } else {
            options[rng.next_index(options.len())]
        };
        out.set(pos, Cell::gem(color));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;
    use crate::types::ObstacleKind;

    fn column(board: &Board, col: i8) -> String {
        (0..BOARD_ROWS)
            .map(|r| {
                let cell = board.cell(Position::new(r, col));
                if cell.is_blocker() {
                    '#'
                } else {
                    cell.color.map(|c| c.letter()).unwrap_or('.')
                }
            })
            .collect()
    }

    #[test]
    fn test_gravity_compacts_preserving_order() {
        let board = Board::from_rows(&["R", "G", ".", "B", ".", ".", "Y", "."]);
        let settled = apply_gravity(&board);
        assert_eq!(column(&settled, 0), "....RGBY");
    }

    #[test]
    fn test_gravity_rests_on_blocker() {
        let board = Board::from_rows(&["R", ".", ".", "#", "G", ".", ".", "."]);
        let settled = apply_gravity(&board);
        assert_eq!(column(&settled, 0), "..R#...G");
    }

    #[test]
    fn test_gravity_with_stacked_blockers() {
        let board = Board::from_rows(&["R", "#", "#", ".", "B", "#", ".", "Y"]);
        let settled = apply_gravity(&board);
        assert_eq!(column(&settled, 0), "R##.B#.Y");
    }

    #[test]
    fn test_gravity_moves_obstacle_overlays() {
        let board = Board::from_rows(&["R", "."]).with_obstacle(Position::new(0, 0), ObstacleKind::Box, 2);
        let settled = apply_gravity(&board);
        let landed = settled.cell(Position::new(7, 0));
        assert_eq!(landed.color, Some(Color::Red));
        assert_eq!(landed.obstacle.map(|o| o.health), Some(2));
    }

    #[test]
    fn test_fill_leaves_no_empty_cells() {
        let board = Board::from_rows(&["#......."]);
        let mut rng = SimpleRng::new(5);
        let filled = fill_empty_spaces(&board, &mut rng);
        assert_eq!(filled.empty_count(), 0);
        assert!(filled.cell(Position::new(0, 0)).is_blocker());
        assert!(!filled.has_any_run());
    }

    #[test]
    fn test_refill_options_exclude_run_colors() {
        let board = Board::from_rows(&["RR.", "..B", "..B"]);
        let options = refill_options(&board, Position::new(0, 2));
        assert!(!options.contains(&Color::Red));
        assert!(!options.contains(&Color::Blue));
        assert_eq!(options.len(), 4);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn cell_strategy() -> impl Strategy<Value = Cell> {
            prop_oneof![
                3 => Just(Cell::EMPTY),
                1 => Just(Cell::blocker()),
                6 => (0usize..PALETTE.len()).prop_map(|i| Cell::gem(PALETTE[i])),
            ]
        }

        fn board_strategy() -> impl Strategy<Value = Board> {
            prop::collection::vec(cell_strategy(), 64).prop_map(|cells| {
                let mut board = Board::new();
                for (pos, cell) in Board::positions().zip(cells) {
                    board.set(pos, cell);
                }
                board
            })
        }

        proptest! {
            #[test]
            fn gravity_keeps_blockers_and_leaves_no_gaps(board in board_strategy()) {
                let settled = apply_gravity(&board);
                for col in 0..BOARD_COLS {
                    let before: String = column(&board, col).chars().filter(|&c| c != '.').collect();
                    let after: String = column(&settled, col).chars().filter(|&c| c != '.').collect();
                    prop_assert_eq!(before, after);
                }
                for pos in Board::positions() {
                    prop_assert_eq!(board.cell(pos).is_blocker(), settled.cell(pos).is_blocker());
                    let below = pos.offset(1, 0);
                    if settled.cell(pos).color.is_some() && below.in_bounds() {
                        prop_assert!(!settled.cell(below).is_empty());
                    }
                }
            }

            #[test]
            fn fill_settles_any_board(board in board_strategy(), seed in any::<u32>()) {
                let filled = fill_empty_spaces(&apply_gravity(&board), &mut SimpleRng::new(seed));
                prop_assert!(filled.is_settled());
                for pos in Board::positions() {
                    let cell = board.cell(pos);
                    if cell.is_blocker() {
                        prop_assert!(filled.cell(pos).is_blocker());
                    }
                }
            }
        }
    }
}
