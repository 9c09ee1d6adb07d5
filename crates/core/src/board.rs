//! Board module - manages the game grid
//!
//! The board is an 8x8 grid of [`Cell`]s stored as a flat row-major array.
//! Coordinates are [`Position`]s with row 0 at the top; gravity pulls toward row 7.
//! The board is `Copy`-cheap to clone, which is how callers try "what if"
//! moves without committing them.

use std::fmt;

use arrayvec::ArrayVec;

use crate::types::{
    Cell, Color, ObstacleKind, Position, Special, BOARD_CELLS, BOARD_COLS, BOARD_ROWS,
    MIN_MATCH_LEN,
};

/// The game board - 8 columns x 8 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (row * COLS + col)
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Create a new board of empty cells
    pub fn new() -> Self {
        Self {
            cells: [Cell::EMPTY; BOARD_CELLS],
        }
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(row: i8, col: i8) -> Option<usize> {
        if !Self::in_bounds(row, col) {
            return None;
        }
        Some((row as usize) * (BOARD_COLS as usize) + (col as usize))
    }

    pub fn rows(&self) -> i8 {
        BOARD_ROWS
    }

    pub fn cols(&self) -> i8 {
        BOARD_COLS
    }

    pub fn in_bounds(row: i8, col: i8) -> bool {
        (0..BOARD_ROWS).contains(&row) && (0..BOARD_COLS).contains(&col)
    }

    /// Manhattan distance exactly 1, both on the board
    pub fn are_adjacent(a: Position, b: Position) -> bool {
        a.in_bounds() && b.in_bounds() && a.is_adjacent(b)
    }

    /// Get cell at position
    /// Returns None if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        Self::index(pos.row, pos.col).map(|idx| self.cells[idx])
    }

    /// Cell at a position known to be on the board
    ///
    /// Out-of-bounds positions read as a blocker so sweeps and scans never
    /// treat them as playable.
    #[inline]
    pub fn cell(&self, pos: Position) -> Cell {
        self.get(pos).unwrap_or_else(Cell::blocker)
    }

    /// Set cell at position
    /// Returns false if out of bounds
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match Self::index(pos.row, pos.col) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Exchange two cells. Returns false if either is out of bounds.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        match (Self::index(a.row, a.col), Self::index(b.row, b.col)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    pub fn can_match(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(|c| c.can_match())
    }

    pub fn can_swap(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(|c| c.can_swap())
    }

    /// Matchable color at position, if any
    pub fn matchable_color(&self, pos: Position) -> Option<Color> {
        self.get(pos).and_then(|c| c.matchable_color())
    }

    /// All positions in row-major order
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..BOARD_ROWS).flat_map(|r| (0..BOARD_COLS).map(move |c| Position::new(r, c)))
    }

    /// In-bounds orthogonal neighbors (up, down, left, right)
    pub fn neighbors(pos: Position) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let n = pos.offset(dr, dc);
            if n.in_bounds() {
                out.push(n);
            }
        }
        out
    }

    /// In-bounds positions within `radius` (Chebyshev) of `center`, row-major
    ///
    /// Radius 1 is a 3x3 block, radius 2 a 5x5 block.
    pub fn square(center: Position, radius: i8) -> impl Iterator<Item = Position> {
        (-radius..=radius)
            .flat_map(move |dr| (-radius..=radius).map(move |dc| center.offset(dr, dc)))
            .filter(|p| p.in_bounds())
    }

    /// Every position in a row
    pub fn row_positions(row: i8) -> impl Iterator<Item = Position> {
        (0..BOARD_COLS).map(move |c| Position::new(row, c))
    }

    /// Every position in a column
    pub fn col_positions(col: i8) -> impl Iterator<Item = Position> {
        (0..BOARD_ROWS).map(move |r| Position::new(r, col))
    }

    /// True when no cell is empty and no special is primed
    pub fn is_settled(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty() && !c.primed)
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// Number of same-color cells running from `pos` (exclusive) in one direction
    fn run_from(&self, pos: Position, color: Color, dr: i8, dc: i8) -> usize {
        let mut n = 0;
        let mut p = pos.offset(dr, dc);
        while self.matchable_color(p) == Some(color) {
            n += 1;
            p = p.offset(dr, dc);
        }
        n
    }

    /// Would a token of `color` at `pos` sit in a run of at least three?
    ///
    /// The cell at `pos` itself is ignored, only its neighbors are read.
    pub fn completes_run(&self, pos: Position, color: Color) -> bool {
        let horizontal = self.run_from(pos, color, 0, -1) + self.run_from(pos, color, 0, 1) + 1;
        let vertical = self.run_from(pos, color, -1, 0) + self.run_from(pos, color, 1, 0) + 1;
        horizontal >= MIN_MATCH_LEN || vertical >= MIN_MATCH_LEN
    }

    /// True if any run of three or more equal matchable colors exists
    pub fn has_any_run(&self) -> bool {
        Self::positions().any(|p| match self.matchable_color(p) {
            Some(color) => {
                self.run_from(p, color, 0, 1) + 1 >= MIN_MATCH_LEN
                    || self.run_from(p, color, 1, 0) + 1 >= MIN_MATCH_LEN
            }
            None => false,
        })
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Build a board from text rows
    ///
    /// One character per cell: a color letter (`R O Y G B P`), `.` for empty,
    /// `#` for a blocker. Missing rows/columns stay empty.
    ///
    /// ```
    /// use gemfall_core::Board;
    /// use gemfall_types::{Color, Position};
    ///
    /// let board = Board::from_rows(&["RGB", "#.."]);
    /// assert_eq!(board.cell(Position::new(0, 1)).color, Some(Color::Green));
    /// assert!(board.cell(Position::new(1, 0)).is_blocker());
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new();
        for (r, line) in rows.iter().enumerate().take(BOARD_ROWS as usize) {
            for (c, ch) in line.chars().enumerate().take(BOARD_COLS as usize) {
                let cell = match ch {
                    '#' => Cell::blocker(),
                    '.' => Cell::EMPTY,
                    other => Color::from_str(&other.to_string())
                        .map(Cell::gem)
                        .unwrap_or(Cell::EMPTY),
                };
                board.set(Position::new(r as i8, c as i8), cell);
            }
        }
        board
    }

    /// Builder: place a special on an existing colored cell
    pub fn with_special(mut self, pos: Position, special: Special) -> Self {
        if let Some(idx) = Self::index(pos.row, pos.col) {
            if self.cells[idx].can_match() {
                self.cells[idx].special = Some(special);
            }
        }
        self
    }

    /// Builder: overlay an obstacle; a blocker replaces the cell entirely
    pub fn with_obstacle(mut self, pos: Position, kind: ObstacleKind, health: u8) -> Self {
        if let Some(idx) = Self::index(pos.row, pos.col) {
            self.cells[idx] = if kind == ObstacleKind::Blocker {
                Cell::blocker()
            } else {
                self.cells[idx].with_obstacle(kind, health)
            };
        }
        self
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders one letter per cell: colors in upper case, specials in lower
/// case, `.` for empty and `#` for blockers.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..BOARD_ROWS {
            for pos in Self::row_positions(r) {
                let cell = self.cell(pos);
                let ch = match (cell.color, cell.special) {
                    _ if cell.is_blocker() => '#',
                    (None, _) => '.',
                    (Some(color), None) => color.letter(),
                    (Some(color), Some(_)) => color.letter().to_ascii_lowercase(),
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
