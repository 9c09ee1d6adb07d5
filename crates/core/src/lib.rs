//! Core match-3 rules - pure, deterministic, and testable
//!
//! Every function here takes a board value and returns a new one (or a
//! description of what would happen). Nothing holds state between calls and
//! all randomness comes through [`RandomSource`], so a seed fully determines
//! a game.
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 grid of cells with adjacency and run queries
//! - [`matcher`]: run detection, activations, creations and obstacle damage
//! - [`targeting`]: homing-strike target selection
//! - [`resolve`]: applies a detection result to the board
//! - [`combo`]: fusion of two swapped specials
//! - [`gravity`]: compaction and refill
//! - [`scoring`]: round and fusion scores
//! - [`swap`]: validated swap entry point
//! - [`moves`]: legal-move search, hints and shuffling
//! - [`level`]: level files and initial board construction
//! - [`rng`]: seedable random sources
//!
//! # Example
//!
//! ```
//! use gemfall_core::{apply_swap, Board, Resolution, SimpleRng};
//! use gemfall_core::types::Position;
//!
//! let board = Board::from_rows(&[
//!     "RRGRYGBY",
//!     "YRGBYRGB",
//!     "BYRGBYRG",
//!     "GBYRGBYR",
//!     "RGBYRGBY",
//!     "YRGBYRGB",
//!     "BYRGBYRG",
//!     "GBYRGBYR",
//! ]);
//! let mut rng = SimpleRng::new(7);
//!
//! let outcome = apply_swap(&board, Position::new(0, 3), Position::new(0, 2), &mut rng).unwrap();
//! assert!(matches!(outcome.resolution, Resolution::Matched(_)));
//! ```

pub mod board;
pub mod combo;
pub mod gravity;
pub mod level;
pub mod matcher;
pub mod moves;
pub mod resolve;
pub mod rng;
pub mod scoring;
pub mod swap;
pub mod targeting;

pub use gemfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use combo::{apply_combo, resolve_combo, ComboResult, FusionKind};
pub use gravity::{apply_gravity, fill_empty_spaces};
pub use level::{generate_board, LevelConfig, LevelError, Objective, ObstaclePlacement};
pub use matcher::{find_matches, Activation, Creation, Match, MatchResult};
pub use moves::{find_best_move, find_possible_moves, has_legal_moves, shuffle, Move};
pub use resolve::{remove_matches, ClearedCell, Removal};
pub use rng::{RandomSource, SequenceRng, SimpleRng};
pub use scoring::{calculate_fusion_score, calculate_score, ScoreResult};
pub use swap::{apply_swap, validate_swap, Resolution, SwapError, SwapOutcome};
pub use targeting::find_homing_target;
