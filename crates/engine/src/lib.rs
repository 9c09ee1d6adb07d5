//! Engine layer - cascade sequencing, level rules and configuration
//!
//! `gemfall-core` provides the pure phase functions; this crate strings them
//! together into moves ([`CascadeDriver`]) and games ([`Session`]).
//!
//! # Example
//!
//! ```
//! use gemfall_core::LevelConfig;
//! use gemfall_engine::{Session, SessionStatus};
//! use gemfall_types::Difficulty;
//!
//! let level = LevelConfig {
//!     move_limit: Some(3),
//!     ..LevelConfig::default()
//! };
//! let mut session = Session::new(&level, Difficulty::Normal, 12345);
//!
//! while session.status() == SessionStatus::Playing {
//!     let hint = session.hint().expect("boards always keep a legal move");
//!     session.play(hint.from, hint.to).unwrap();
//! }
//! assert_eq!(session.status(), SessionStatus::GameOver);
//! assert_eq!(session.moves_made(), 3);
//! ```

pub mod cascade;
pub mod config;
pub mod objectives;
pub mod session;

pub use cascade::{settle, CascadeDriver, MoveReport, Phase, PhaseEvent, RoundEvent, Settled};
pub use config::EngineConfig;
pub use objectives::{ObjectiveProgress, ObjectiveTracker};
pub use session::{Mode, MoveError, Session, SessionStatus};
