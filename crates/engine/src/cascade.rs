//! Cascade driver - runs one move from swap to a settled board
//!
//! The driver is a small state machine:
//!
//! ```text
//! Idle -> Swapping -> Checking -> Removing -> Falling -> Filling -> Checking -> ... -> Idle
//! ```
//!
//! [`CascadeDriver::step`] advances exactly one phase so a presentation layer
//! can animate between phases. [`CascadeDriver::run_to_idle`] drives the rest
//! of the move in one call. Every phase is a pure board-to-board function from
//! `gemfall-core`; the driver only sequences them and keeps the score.

use tracing::{debug, trace, warn};

use gemfall_core::combo::{apply_combo, ComboResult, FusionKind};
use gemfall_core::gravity::{apply_gravity, fill_empty_spaces};
use gemfall_core::matcher::{find_matches, Creation, MatchResult};
use gemfall_core::moves::has_legal_moves;
use gemfall_core::resolve::{remove_matches, ClearedCell};
use gemfall_core::rng::RandomSource;
use gemfall_core::scoring::{calculate_fusion_score, calculate_score};
use gemfall_core::swap::{apply_swap, Resolution, SwapError, SwapOutcome};
use gemfall_core::Board;
use gemfall_types::{Position, MAX_CASCADE_ROUNDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Swapping,
    Checking,
    Removing,
    Falling,
    Filling,
}

/// State of the board once a move has fully resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settled {
    HasMoves,
    NoLegalMoves,
}

impl Settled {
    pub fn of(board: &Board) -> Self {
        if has_legal_moves(board) {
            Settled::HasMoves
        } else {
            Settled::NoLegalMoves
        }
    }
}

/// One resolved round of a cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEvent {
    /// 1-based round index within the move
    pub round: u32,
    pub cleared_cells: Vec<ClearedCell>,
    pub score_delta: u32,
    /// Combo index the round was scored at
    pub combo: u32,
    pub matches: usize,
    pub activations: usize,
    pub created: Vec<Creation>,
    pub obstacles_cleared: u32,
    /// Set on the round that resolved a fusion
    pub fusion: Option<FusionKind>,
}

/// What a single [`CascadeDriver::step`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Nothing to do
    Idle,
    /// The swap made no match and was undone
    Reverted,
    Swapped { fusion: Option<FusionKind> },
    Checked { matches: usize, activations: usize },
    Round(RoundEvent),
    Fell,
    Filled,
    Settled(Settled),
}

/// Summary of one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub rounds: Vec<RoundEvent>,
    pub total_score: u32,
    pub reverted: bool,
    pub fusion: Option<FusionKind>,
    pub settled: Settled,
}

impl MoveReport {
    pub fn cleared_count(&self) -> usize {
        self.rounds.iter().map(|r| r.cleared_cells.len()).sum()
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Matches(MatchResult),
    Fusion(ComboResult),
}

#[derive(Debug, Clone)]
pub struct CascadeDriver {
    board: Board,
    phase: Phase,
    swap: Option<SwapOutcome>,
    pending: Option<Pending>,
    round: u32,
    combo: u32,
    reverted: bool,
    fusion: Option<FusionKind>,
}

impl CascadeDriver {
    /// Driver at rest on `board`
    pub fn new(board: Board) -> Self {
        Self {
            board,
            phase: Phase::Idle,
            swap: None,
            pending: None,
            round: 0,
            combo: 0,
            reverted: false,
            fusion: None,
        }
    }

    /// Driver that starts by checking `board`, for boards that may already
    /// hold runs or primed specials
    pub fn resume(board: Board) -> Self {
        let mut driver = Self::new(board);
        driver.phase = Phase::Checking;
        driver
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Swap in a new board (after a shuffle); only allowed while idle
    pub fn replace_board(&mut self, board: Board) -> Result<(), SwapError> {
        if !self.is_idle() {
            return Err(SwapError::Busy);
        }
        self.board = board;
        Ok(())
    }

    /// Validate and perform a swap; the next [`step`](Self::step) commits or reverts it
    pub fn begin_swap(
        &mut self,
        a: Position,
        b: Position,
        rng: &mut impl RandomSource,
    ) -> Result<(), SwapError> {
        if !self.is_idle() {
            return Err(SwapError::Busy);
        }
        let outcome = apply_swap(&self.board, a, b, rng)?;
        self.swap = Some(outcome);
        self.round = 0;
        self.combo = 0;
        self.reverted = false;
        self.fusion = None;
        self.enter(Phase::Swapping);
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        trace!(from = ?self.phase, to = ?phase, round = self.round, "phase");
        self.phase = phase;
    }

    /// Advance exactly one phase
    pub fn step(&mut self, rng: &mut impl RandomSource) -> PhaseEvent {
        match self.phase {
            Phase::Idle => PhaseEvent::Idle,
            Phase::Swapping => self.step_swapping(),
            Phase::Checking => self.step_checking(),
            Phase::Removing => self.step_removing(),
            Phase::Falling => {
                self.board = apply_gravity(&self.board);
                self.enter(Phase::Filling);
                PhaseEvent::Fell
            }
            Phase::Filling => {
                self.board = fill_empty_spaces(&self.board, rng);
                self.enter(Phase::Checking);
                PhaseEvent::Filled
            }
        }
    }

    fn step_swapping(&mut self) -> PhaseEvent {
        let Some(outcome) = self.swap.take() else {
            self.enter(Phase::Idle);
            return PhaseEvent::Idle;
        };
        self.board = outcome.board;
        match outcome.resolution {
            Resolution::Reverted => {
                self.reverted = true;
                self.enter(Phase::Idle);
                PhaseEvent::Reverted
            }
            Resolution::Combo(combo) => {
                let kind = combo.kind;
                self.fusion = Some(kind);
                self.pending = Some(Pending::Fusion(combo));
                self.enter(Phase::Removing);
                PhaseEvent::Swapped { fusion: Some(kind) }
            }
            Resolution::Matched(_) => {
                self.enter(Phase::Checking);
                PhaseEvent::Swapped { fusion: None }
            }
        }
    }

    fn step_checking(&mut self) -> PhaseEvent {
        if self.round >= MAX_CASCADE_ROUNDS {
            warn!(rounds = self.round, "cascade round cap reached, stopping");
            return self.settle();
        }
        let result = find_matches(&self.board);
        if result.is_empty() {
            return self.settle();
        }
        let event = PhaseEvent::Checked {
            matches: result.matches.len(),
            activations: result.activations.len(),
        };
        self.pending = Some(Pending::Matches(result));
        self.enter(Phase::Removing);
        event
    }

    fn step_removing(&mut self) -> PhaseEvent {
        let Some(pending) = self.pending.take() else {
            self.enter(Phase::Checking);
            return PhaseEvent::Idle;
        };
        self.round += 1;

        let event = match pending {
            Pending::Matches(result) => {
                let score = calculate_score(&result, self.combo);
                let removal = remove_matches(&self.board, &result);
                self.board = removal.board;
                RoundEvent {
                    round: self.round,
                    cleared_cells: removal.cleared,
                    score_delta: score.total,
                    combo: self.combo,
                    matches: result.matches.len(),
                    activations: result.activations.len(),
                    created: removal.created,
                    obstacles_cleared: removal.obstacles_cleared,
                    fusion: None,
                }
            }
            Pending::Fusion(combo) => {
                let removal = apply_combo(&self.board, &combo);
                self.board = removal.board;
                RoundEvent {
                    round: self.round,
                    score_delta: calculate_fusion_score(removal.cleared.len()),
                    cleared_cells: removal.cleared,
                    combo: self.combo,
                    matches: 0,
                    activations: 2 + combo.seeded.len(),
                    created: removal.created,
                    obstacles_cleared: removal.obstacles_cleared,
                    fusion: Some(combo.kind),
                }
            }
        };

        debug!(
            round = event.round,
            matches = event.matches,
            activations = event.activations,
            cleared = event.cleared_cells.len(),
            score = event.score_delta,
            combo = event.combo,
            "cascade round"
        );
        // Only rounds with a match extend the combo.
        if event.matches > 0 {
            self.combo += 1;
        } else {
            self.combo = 0;
        }
        self.enter(Phase::Falling);
        PhaseEvent::Round(event)
    }

    fn settle(&mut self) -> PhaseEvent {
        self.enter(Phase::Idle);
        PhaseEvent::Settled(Settled::of(&self.board))
    }

    /// Drive every remaining phase of the current move
    pub fn run_to_idle(&mut self, rng: &mut impl RandomSource) -> MoveReport {
        let mut rounds = Vec::new();
        let mut settled = None;
        while !self.is_idle() {
            match self.step(rng) {
                PhaseEvent::Round(event) => rounds.push(event),
                PhaseEvent::Settled(s) => settled = Some(s),
                _ => {}
            }
        }
        MoveReport {
            total_score: rounds.iter().map(|r| r.score_delta).sum(),
            rounds,
            reverted: self.reverted,
            fusion: self.fusion,
            settled: settled.unwrap_or_else(|| Settled::of(&self.board)),
        }
    }

    /// Swap and resolve the whole cascade
    pub fn play_move(
        &mut self,
        a: Position,
        b: Position,
        rng: &mut impl RandomSource,
    ) -> Result<MoveReport, SwapError> {
        self.begin_swap(a, b, rng)?;
        Ok(self.run_to_idle(rng))
    }
}

/// Resolve any runs or primed specials already on `board`
pub fn settle(board: Board, rng: &mut impl RandomSource) -> (Board, MoveReport) {
    let mut driver = CascadeDriver::resume(board);
    let report = driver.run_to_idle(rng);
    (driver.board, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemfall_core::rng::SimpleRng;
    use gemfall_types::{ObstacleKind, Special};

    const FILLER: [&str; 8] = [
        "RGBYRGBY", "YRGBYRGB", "BYRGBYRG", "GBYRGBYR", "RGBYRGBY", "YRGBYRGB", "BYRGBYRG",
        "GBYRGBYR",
    ];

    fn with_row0(row0: &'static str) -> Board {
        let mut rows = FILLER;
        rows[0] = row0;
        Board::from_rows(&rows)
    }

    #[test]
    fn test_phases_advance_in_order() {
        let mut driver = CascadeDriver::new(with_row0("RRGRYGBY"));
        let mut rng = SimpleRng::new(1);
        driver
            .begin_swap(Position::new(0, 3), Position::new(0, 2), &mut rng)
            .unwrap();
        assert_eq!(driver.phase(), Phase::Swapping);

        assert_eq!(driver.step(&mut rng), PhaseEvent::Swapped { fusion: None });
        assert_eq!(driver.phase(), Phase::Checking);
        assert_eq!(
            driver.step(&mut rng),
            PhaseEvent::Checked { matches: 1, activations: 0 }
        );
        assert_eq!(driver.phase(), Phase::Removing);
        match driver.step(&mut rng) {
            PhaseEvent::Round(event) => {
                assert_eq!(event.round, 1);
                assert_eq!(event.score_delta, 30);
                assert_eq!(event.cleared_cells.len(), 3);
            }
            other => panic!("expected round, got {:?}", other),
        }
        assert_eq!(driver.step(&mut rng), PhaseEvent::Fell);
        assert_eq!(driver.step(&mut rng), PhaseEvent::Filled);
        assert_eq!(driver.phase(), Phase::Checking);

        let report = driver.run_to_idle(&mut rng);
        assert!(driver.is_idle());
        assert!(driver.board().is_settled());
        assert!(!report.reverted);
    }

    #[test]
    fn test_reverted_swap_leaves_board() {
        let board = Board::from_rows(&FILLER);
        let mut driver = CascadeDriver::new(board.clone());
        let report = driver
            .play_move(Position::new(0, 0), Position::new(0, 1), &mut SimpleRng::new(1))
            .unwrap();
        assert!(report.reverted);
        assert!(report.rounds.is_empty());
        assert_eq!(report.total_score, 0);
        assert_eq!(driver.board(), &board);
    }

    #[test]
    fn test_busy_while_resolving() {
        let mut driver = CascadeDriver::new(with_row0("RRGRYGBY"));
        let mut rng = SimpleRng::new(1);
        driver
            .begin_swap(Position::new(0, 3), Position::new(0, 2), &mut rng)
            .unwrap();
        assert_eq!(
            driver.begin_swap(Position::new(5, 5), Position::new(5, 6), &mut rng),
            Err(SwapError::Busy)
        );
        assert_eq!(driver.replace_board(Board::new()), Err(SwapError::Busy));
    }

    #[test]
    fn test_rejected_swap_keeps_driver_idle() {
        let mut driver = CascadeDriver::new(Board::from_rows(&FILLER));
        let err = driver
            .play_move(Position::new(0, 0), Position::new(2, 0), &mut SimpleRng::new(1))
            .unwrap_err();
        assert_eq!(err, SwapError::NotAdjacent(Position::new(0, 0), Position::new(2, 0)));
        assert!(driver.is_idle());
    }

    #[test]
    fn test_double_rocket_fusion_scores_flat() {
        let board = Board::from_rows(&FILLER)
            .with_special(Position::new(3, 3), Special::RowClear)
            .with_special(Position::new(3, 4), Special::ColumnClear);
        let mut driver = CascadeDriver::new(board);
        let report = driver
            .play_move(Position::new(3, 4), Position::new(3, 3), &mut SimpleRng::new(9))
            .unwrap();
        assert_eq!(report.fusion, Some(FusionKind::DoubleRocket));
        let first = &report.rounds[0];
        assert_eq!(first.fusion, Some(FusionKind::DoubleRocket));
        assert_eq!(first.score_delta, 425);
        assert_eq!(first.cleared_cells.len(), 15);
    }

    #[test]
    fn test_fusion_score_counts_only_cleared_cells() {
        let board = Board::from_rows(&FILLER)
            .with_special(Position::new(3, 3), Special::RowClear)
            .with_special(Position::new(3, 4), Special::ColumnClear)
            .with_obstacle(Position::new(3, 6), ObstacleKind::Box, 2);
        let mut driver = CascadeDriver::new(board);
        let report = driver
            .play_move(Position::new(3, 4), Position::new(3, 3), &mut SimpleRng::new(9))
            .unwrap();
        let first = &report.rounds[0];
        assert_eq!(first.cleared_cells.len(), 14);
        assert_eq!(first.score_delta, 410);
    }

    #[test]
    fn test_match_after_fusion_scores_without_combo() {
        // Clearing row 3 drops the P at (2,0) onto the Ps at (4,0) and (5,0).
        let rows = [
            "RGBYRGBY", "YRGBYRGB", "PYRGBYRG", "GBYRGBYR", "PGBYRGBY", "PRGBYRGB", "BYRGBYRG",
            "GBYRGBYR",
        ];
        let board = Board::from_rows(&rows)
            .with_special(Position::new(3, 3), Special::RowClear)
            .with_special(Position::new(3, 4), Special::ColumnClear);
        let mut driver = CascadeDriver::new(board);
        let report = driver
            .play_move(Position::new(3, 4), Position::new(3, 3), &mut SimpleRng::new(5))
            .unwrap();

        assert_eq!(report.rounds[0].fusion, Some(FusionKind::DoubleRocket));
        assert_eq!(report.rounds[0].score_delta, 425);
        let second = &report.rounds[1];
        assert_eq!(second.matches, 1);
        assert_eq!(second.combo, 0);
        assert_eq!(second.score_delta, 30);
    }

    #[test]
    fn test_later_rounds_use_combo_index() {
        let mut driver = CascadeDriver::new(with_row0("RRGRYGBY"));
        let report = driver
            .play_move(Position::new(0, 3), Position::new(0, 2), &mut SimpleRng::new(4))
            .unwrap();
        let mut combo = 0;
        for (i, round) in report.rounds.iter().enumerate() {
            assert_eq!(round.combo, combo);
            assert_eq!(round.round, i as u32 + 1);
            combo = if round.matches > 0 { combo + 1 } else { 0 };
        }
        assert_eq!(
            report.total_score,
            report.rounds.iter().map(|r| r.score_delta).sum::<u32>()
        );
    }

    #[test]
    fn test_settle_fires_primed_special() {
        let mut board = Board::from_rows(&FILLER).with_special(Position::new(7, 0), Special::RowClear);
        let mut cell = board.cell(Position::new(7, 0));
        cell.primed = true;
        board.set(Position::new(7, 0), cell);

        let (settled, report) = settle(board, &mut SimpleRng::new(2));
        assert!(report.rounds[0].activations >= 1);
        assert!(report.rounds[0].cleared_cells.len() >= 8);
        assert!(settled.is_settled());
        assert!(find_matches(&settled).is_empty());
    }

    #[test]
    fn test_blockers_survive_cascade() {
        let board = with_row0("RRGRYGBY").with_obstacle(Position::new(1, 2), ObstacleKind::Blocker, 1);
        let mut driver = CascadeDriver::new(board);
        driver
            .play_move(Position::new(0, 3), Position::new(0, 2), &mut SimpleRng::new(3))
            .unwrap();
        assert!(driver.board().cell(Position::new(1, 2)).is_blocker());
    }
}
