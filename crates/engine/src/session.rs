//! Game session - a board, its cascade driver and the level rules around it

use thiserror::Error;
use tracing::{debug, info};

use gemfall_core::level::{generate_board, LevelConfig};
use gemfall_core::moves::{find_best_move, shuffle, Move};
use gemfall_core::rng::{RandomSource, SimpleRng};
use gemfall_core::swap::SwapError;
use gemfall_core::Board;
use gemfall_types::{Difficulty, Position};

use crate::cascade::{CascadeDriver, MoveReport, Settled};
use crate::config::EngineConfig;
use crate::objectives::ObjectiveTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Swap(#[from] SwapError),
    #[error("the session is over")]
    NotPlaying,
}

impl MoveError {
    pub fn code(self) -> &'static str {
        match self {
            MoveError::Swap(err) => err.code(),
            MoveError::NotPlaying => "not_playing",
        }
    }
}

/// Which limit ends the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Limited moves
    Classic,
    /// Limited time, advanced with [`Session::tick`]
    Arcade,
    /// No limit
    Endless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Playing,
    LevelComplete,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct Session<R: RandomSource = SimpleRng> {
    driver: CascadeDriver,
    rng: R,
    tracker: ObjectiveTracker,
    level_name: String,
    moves_left: Option<u32>,
    time_left_ms: Option<u64>,
    moves_made: u32,
    shuffles: u32,
    score: u32,
    status: SessionStatus,
}

impl Session<SimpleRng> {
    /// Create a session with the given RNG seed
    pub fn new(level: &LevelConfig, difficulty: Difficulty, seed: u32) -> Self {
        Self::with_rng(level, difficulty, SimpleRng::new(seed))
    }

    pub fn from_config(config: &EngineConfig, level: &LevelConfig) -> Self {
        Self::new(level, config.difficulty, config.seed)
    }
}

impl<R: RandomSource> Session<R> {
    pub fn with_rng(level: &LevelConfig, difficulty: Difficulty, mut rng: R) -> Self {
        let board = generate_board(level, difficulty, &mut rng);
        info!(
            level = %level.name,
            difficulty = difficulty.as_str(),
            move_limit = ?level.move_limit,
            time_limit_ms = ?level.time_limit_ms,
            "session started"
        );
        Self {
            driver: CascadeDriver::new(board),
            rng,
            tracker: ObjectiveTracker::new(&level.objectives),
            level_name: level.name.clone(),
            moves_left: level.move_limit,
            time_left_ms: level.time_limit_ms,
            moves_made: 0,
            shuffles: 0,
            score: 0,
            status: SessionStatus::Playing,
        }
    }

    pub fn board(&self) -> &Board {
        self.driver.board()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    pub fn moves_left(&self) -> Option<u32> {
        self.moves_left
    }

    pub fn time_left_ms(&self) -> Option<u64> {
        self.time_left_ms
    }

    /// Times the board was re-dealt because no move was left
    pub fn shuffles(&self) -> u32 {
        self.shuffles
    }

    pub fn objectives(&self) -> &ObjectiveTracker {
        &self.tracker
    }

    pub fn mode(&self) -> Mode {
        if self.moves_left.is_some() {
            Mode::Classic
        } else if self.time_left_ms.is_some() {
            Mode::Arcade
        } else {
            Mode::Endless
        }
    }

    /// Best immediate move on the current board
    pub fn hint(&self) -> Option<Move> {
        find_best_move(self.board())
    }

    /// Play one swap through the whole cascade
    ///
    /// A reverted swap costs nothing. A settled board without a legal move is
    /// shuffled before control returns.
    pub fn play(&mut self, a: Position, b: Position) -> Result<MoveReport, MoveError> {
        if self.status != SessionStatus::Playing {
            return Err(MoveError::NotPlaying);
        }
        let report = self.driver.play_move(a, b, &mut self.rng)?;
        if report.reverted {
            return Ok(report);
        }

        self.moves_made += 1;
        if let Some(left) = self.moves_left.as_mut() {
            *left = left.saturating_sub(1);
        }
        self.score = self.score.saturating_add(report.total_score);
        for round in &report.rounds {
            self.tracker.record(round);
        }
        debug!(
            moves = self.moves_made,
            rounds = report.rounds.len(),
            gained = report.total_score,
            score = self.score,
            "move resolved"
        );

        if report.settled == Settled::NoLegalMoves {
            self.reshuffle()?;
        }
        self.update_status();
        Ok(report)
    }

    fn reshuffle(&mut self) -> Result<(), MoveError> {
        let board = shuffle(self.driver.board(), &mut self.rng);
        self.driver.replace_board(board)?;
        self.shuffles += 1;
        debug!(shuffles = self.shuffles, "no legal moves, board shuffled");
        Ok(())
    }

    /// Advance the arcade clock
    pub fn tick(&mut self, elapsed_ms: u64) -> SessionStatus {
        if self.status == SessionStatus::Playing {
            if let Some(left) = self.time_left_ms.as_mut() {
                *left = left.saturating_sub(elapsed_ms);
            }
            self.update_status();
        }
        self.status
    }

    fn update_status(&mut self) {
        if self.status != SessionStatus::Playing {
            return;
        }
        let next = if self.tracker.is_complete() {
            SessionStatus::LevelComplete
        } else if self.moves_left == Some(0) || self.time_left_ms == Some(0) {
            SessionStatus::GameOver
        } else {
            SessionStatus::Playing
        };
        if next != self.status {
            info!(level = %self.level_name, status = ?next, score = self.score, "session ended");
            self.status = next;
        }
    }
}
