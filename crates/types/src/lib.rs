//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behavior beyond small queries, making them
//! usable in any context (core resolution, session bookkeeping, presentation).
//!
//! # Board Dimensions
//!
//! The board is a fixed 8x8 grid:
//!
//! - **Rows**: 8 (indexed 0-7, row 0 is the top, gravity pulls toward row 7)
//! - **Columns**: 8 (indexed 0-7, left to right)
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MATCH_CELL_POINTS` | 10 | Points per cell of a match |
//! | `MATCH_EXTRA_CELL_POINTS` | 15 | Bonus per cell beyond the third |
//! | `ROCKET_ACTIVATION_POINTS` | 50 | Row/column-clear activation |
//! | `COLOR_CLEAR_ACTIVATION_POINTS` | 100 | Color-clear activation |
//! | `AREA_CLEAR_ACTIVATION_POINTS` | 75 | Area-clear activation |
//! | `HOMING_ACTIVATION_POINTS` | 60 | Homing-strike activation |
//! | `FUSION_BASE_POINTS` | 200 | Flat award per combo fusion |
//! | `FUSION_CELL_POINTS` | 15 | Per cell cleared by a fusion |
//!
//! # Examples
//!
//! ```
//! use gemfall_types::{Cell, Color, Position, Special, BOARD_COLS, BOARD_ROWS};
//!
//! let gem = Cell::gem(Color::Red);
//! assert!(gem.can_match());
//!
//! let rocket = Cell::special(Color::Blue, Special::RowClear);
//! assert_eq!(rocket.special, Some(Special::RowClear));
//!
//! assert!(Position::new(3, 3).is_adjacent(Position::new(3, 4)));
//! assert_eq!(Special::from_str("bomb"), Some(Special::AreaClear));
//!
//! assert_eq!(BOARD_ROWS, 8);
//! assert_eq!(BOARD_COLS, 8);
//! ```

use serde::{Deserialize, Serialize};

/// Board height in cells (8 rows)
pub const BOARD_ROWS: i8 = 8;

/// Board width in cells (8 columns)
pub const BOARD_COLS: i8 = 8;

/// Total number of cells on the board
pub const BOARD_CELLS: usize = (BOARD_ROWS as usize) * (BOARD_COLS as usize);

/// Minimum run length that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Points per matched cell
pub const MATCH_CELL_POINTS: u32 = 10;

/// Extra points per matched cell beyond the third
pub const MATCH_EXTRA_CELL_POINTS: u32 = 15;

/// Row/column-clear activation bonus
pub const ROCKET_ACTIVATION_POINTS: u32 = 50;

/// Color-clear activation bonus
pub const COLOR_CLEAR_ACTIVATION_POINTS: u32 = 100;

/// Area-clear activation bonus
pub const AREA_CLEAR_ACTIVATION_POINTS: u32 = 75;

/// Homing-strike activation bonus
pub const HOMING_ACTIVATION_POINTS: u32 = 60;

/// Flat award for a combo fusion (not multiplied)
pub const FUSION_BASE_POINTS: u32 = 200;

/// Per-cell award for cells cleared by a combo fusion
pub const FUSION_CELL_POINTS: u32 = 15;

/// Number of homing strikes launched by the triple-strike fusions
pub const FUSION_HOMING_STRIKES: usize = 3;

/// Upper bound on cascade rounds for a single move.
pub const MAX_CASCADE_ROUNDS: u32 = 256;

/// Token colors.
///
/// The palette is fixed; refill and construction pick uniformly among these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

/// Every color in palette order
pub const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Orange,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Purple,
];

impl Color {
    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gemfall_types::Color;
    ///
    /// assert_eq!(Color::from_str("red"), Some(Color::Red));
    /// assert_eq!(Color::from_str("PURPLE"), Some(Color::Purple));
    /// assert_eq!(Color::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Some(Color::Red),
            "orange" | "o" => Some(Color::Orange),
            "yellow" | "y" => Some(Color::Yellow),
            "green" | "g" => Some(Color::Green),
            "blue" | "b" => Some(Color::Blue),
            "purple" | "p" => Some(Color::Purple),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
        }
    }

    /// Single-letter code used by text board fixtures
    pub fn letter(&self) -> char {
        match self {
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Yellow => 'Y',
            Color::Green => 'G',
            Color::Blue => 'B',
            Color::Purple => 'P',
        }
    }
}

/// Special power tokens
///
/// - **RowClear** / **ColumnClear**: "rockets", sweep their entire row or column
/// - **AreaClear**: "bomb", sweeps a 3x3 neighborhood
/// - **HomingStrike**: "propeller", sweeps a 3x3 around a computed target
/// - **ColorClear**: "rainbow", sweeps every cell of one color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    RowClear,
    ColumnClear,
    AreaClear,
    HomingStrike,
    ColorClear,
}

impl Special {
    /// Every special kind
    pub const ALL: [Special; 5] = [
        Special::RowClear,
        Special::ColumnClear,
        Special::AreaClear,
        Special::HomingStrike,
        Special::ColorClear,
    ];

    /// Rockets pair as one category for combo fusions
    pub fn is_rocket(&self) -> bool {
        matches!(self, Special::RowClear | Special::ColumnClear)
    }

    /// Homing-strike target preference (higher wins, 0 = never targeted)
    ///
    /// | Special | Priority |
    /// |---------|----------|
    /// | ColorClear | 3 |
    /// | AreaClear | 2 |
    /// | RowClear / ColumnClear | 1 |
    /// | HomingStrike | 0 |
    pub fn target_priority(&self) -> u8 {
        match self {
            Special::ColorClear => 3,
            Special::AreaClear => 2,
            Special::RowClear | Special::ColumnClear => 1,
            Special::HomingStrike => 0,
        }
    }

    /// Activation bonus points
    pub fn activation_points(&self) -> u32 {
        match self {
            Special::RowClear | Special::ColumnClear => ROCKET_ACTIVATION_POINTS,
            Special::ColorClear => COLOR_CLEAR_ACTIVATION_POINTS,
            Special::AreaClear => AREA_CLEAR_ACTIVATION_POINTS,
            Special::HomingStrike => HOMING_ACTIVATION_POINTS,
        }
    }

    /// Parse special from string, accepting the nicknames
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "row_clear" | "row" => Some(Special::RowClear),
            "column_clear" | "column" | "col" => Some(Special::ColumnClear),
            "area_clear" | "bomb" => Some(Special::AreaClear),
            "homing_strike" | "propeller" => Some(Special::HomingStrike),
            "color_clear" | "rainbow" => Some(Special::ColorClear),
            _ => None,
        }
    }

    /// Convert to snake_case string
    pub fn as_str(&self) -> &'static str {
        match self {
            Special::RowClear => "row_clear",
            Special::ColumnClear => "column_clear",
            Special::AreaClear => "area_clear",
            Special::HomingStrike => "homing_strike",
            Special::ColorClear => "color_clear",
        }
    }
}

/// Obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Box,
    Ice,
    Chain,
    Grass,
    /// Colorless, immovable, indestructible; acts as a floor for gravity
    Blocker,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Box => "box",
            ObstacleKind::Ice => "ice",
            ObstacleKind::Chain => "chain",
            ObstacleKind::Grass => "grass",
            ObstacleKind::Blocker => "blocker",
        }
    }
}

/// Hit-point bearing overlay on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub health: u8,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, health: u8) -> Self {
        Self { kind, health }
    }

    pub fn is_blocker(&self) -> bool {
        self.kind == ObstacleKind::Blocker
    }
}

/// A cell on the game board
///
/// - `color`: `None` only for empty cells (transient) and blockers
/// - `special`: power token sitting on the cell, if any
/// - `obstacle`: overlay, if any
/// - `primed`: a special hit by another activation's sweep, fires on the next detection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub color: Option<Color>,
    pub special: Option<Special>,
    pub obstacle: Option<Obstacle>,
    pub primed: bool,
}

impl Cell {
    /// Empty cell: no color, no special, no obstacle
    pub const EMPTY: Cell = Cell {
        color: None,
        special: None,
        obstacle: None,
        primed: false,
    };

    /// Plain colored gem
    pub fn gem(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::EMPTY
        }
    }

    /// Colored special token
    pub fn special(color: Color, special: Special) -> Self {
        Self {
            color: Some(color),
            special: Some(special),
            ..Self::EMPTY
        }
    }

    /// Immovable colorless blocker
    pub fn blocker() -> Self {
        Self {
            obstacle: Some(Obstacle::new(ObstacleKind::Blocker, 1)),
            ..Self::EMPTY
        }
    }

    /// Builder-style obstacle overlay
    pub fn with_obstacle(self, kind: ObstacleKind, health: u8) -> Self {
        Self {
            obstacle: Some(Obstacle::new(kind, health)),
            ..self
        }
    }

    pub fn is_blocker(&self) -> bool {
        self.obstacle.is_some_and(|o| o.is_blocker())
    }

    /// Empty and fillable (not a blocker)
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && !self.is_blocker()
    }

    /// Has a color and is not a blocker
    pub fn can_match(&self) -> bool {
        self.color.is_some() && !self.is_blocker()
    }

    /// Swappable cells are exactly the matchable ones
    pub fn can_swap(&self) -> bool {
        self.can_match()
    }

    /// Color if the cell takes part in runs
    pub fn matchable_color(&self) -> Option<Color> {
        if self.is_blocker() {
            None
        } else {
            self.color
        }
    }
}

/// Grid coordinate (row 0 is the top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Board center used as the last-resort homing target
    pub const CENTER: Position = Position::new(BOARD_ROWS / 2, BOARD_COLS / 2);

    pub fn in_bounds(&self) -> bool {
        self.row >= 0 && self.row < BOARD_ROWS && self.col >= 0 && self.col < BOARD_COLS
    }

    /// Manhattan distance exactly 1
    pub fn is_adjacent(&self, other: Position) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }

    pub fn offset(&self, dr: i8, dc: i8) -> Position {
        Position::new(self.row + dr, self.col + dc)
    }

    /// Chebyshev distance (used for 3x3 / 5x5 area membership)
    pub fn chebyshev(&self, other: Position) -> i8 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }
}

/// Axis of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    /// Directional special created by a run of four along this axis
    pub fn rocket(&self) -> Special {
        match self {
            Direction::Horizontal => Special::RowClear,
            Direction::Vertical => Special::ColumnClear,
        }
    }
}

/// Difficulty setting, affects initial special seeding only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Chance per free cell to start with a random special
    pub fn special_seed_chance(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.06,
            Difficulty::Normal => 0.03,
            Difficulty::Hard => 0.0,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocker_is_never_matchable() {
        let blocker = Cell::blocker();
        assert!(blocker.is_blocker());
        assert!(!blocker.can_match());
        assert!(!blocker.can_swap());
        assert!(!blocker.is_empty());
        assert_eq!(blocker.matchable_color(), None);
    }

    #[test]
    fn test_obstacle_overlay_keeps_color_matchable() {
        let iced = Cell::gem(Color::Green).with_obstacle(ObstacleKind::Ice, 2);
        assert!(iced.can_match());
        assert_eq!(iced.matchable_color(), Some(Color::Green));
    }

    #[test]
    fn test_adjacency_is_manhattan_one() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(Position::new(2, 3)));
        assert!(p.is_adjacent(Position::new(3, 2)));
        assert!(!p.is_adjacent(Position::new(2, 2)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Position::new(3, 5)));
    }

    #[test]
    fn test_target_priority_order() {
        assert!(Special::ColorClear.target_priority() > Special::AreaClear.target_priority());
        assert!(Special::AreaClear.target_priority() > Special::RowClear.target_priority());
        assert_eq!(
            Special::RowClear.target_priority(),
            Special::ColumnClear.target_priority()
        );
        assert_eq!(Special::HomingStrike.target_priority(), 0);
    }

    #[test]
    fn test_center_is_in_bounds() {
        assert_eq!(Position::CENTER, Position::new(4, 4));
        assert!(Position::CENTER.in_bounds());
    }
}
