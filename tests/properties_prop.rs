//! Property tests for the cascade invariants
//!
//! Boards come from seeds and random obstacle layouts, then get driven
//! through random productive moves one phase at a time.

use std::collections::BTreeSet;

use proptest::prelude::*;

use gemfall::core::gravity::fill_empty_spaces;
use gemfall::core::level::{generate_board, LevelConfig, ObstaclePlacement};
use gemfall::core::moves::is_productive;
use gemfall::core::{
    apply_swap, find_matches, find_possible_moves, resolve_combo, Board, Move, RandomSource,
    SimpleRng,
};
use gemfall::engine::{settle, CascadeDriver, Phase};
use gemfall::types::{Cell, Difficulty, ObstacleKind, Position, Special, MAX_CASCADE_ROUNDS};

fn obstacle_kind() -> impl Strategy<Value = ObstacleKind> {
    prop_oneof![
        Just(ObstacleKind::Box),
        Just(ObstacleKind::Ice),
        Just(ObstacleKind::Chain),
        Just(ObstacleKind::Grass),
        Just(ObstacleKind::Blocker),
    ]
}

fn placements() -> impl Strategy<Value = Vec<ObstaclePlacement>> {
    prop::collection::vec((0i8..8, 0i8..8, obstacle_kind(), 1u8..4), 0..10).prop_map(|v| {
        v.into_iter()
            .map(|(row, col, kind, health)| ObstaclePlacement::new(row, col, kind, health))
            .collect()
    })
}

fn difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Normal),
        Just(Difficulty::Hard),
    ]
}

fn level_board(
    seed: u32,
    obstacles: Vec<ObstaclePlacement>,
    difficulty: Difficulty,
) -> (Board, SimpleRng) {
    let level = LevelConfig {
        obstacles,
        ..LevelConfig::default()
    };
    let mut rng = SimpleRng::new(seed);
    let board = generate_board(&level, difficulty, &mut rng);
    (board, rng)
}

fn blockers(board: &Board) -> BTreeSet<Position> {
    Board::positions().filter(|&p| board.cell(p).is_blocker()).collect()
}

fn obstacle_health(board: &Board) -> u32 {
    board
        .cells()
        .iter()
        .filter_map(|c| c.obstacle)
        .filter(|o| !o.is_blocker())
        .map(|o| o.health as u32)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn refill_never_completes_a_run(
        seed in any::<u32>(),
        holes in prop::collection::vec(any::<bool>(), 64),
        obstacles in placements(),
    ) {
        let (board, mut rng) = level_board(seed, obstacles, Difficulty::Hard);
        let mut holed = board.clone();
        let mut refilled = BTreeSet::new();
        for (pos, hole) in Board::positions().zip(holes) {
            if hole && !holed.cell(pos).is_blocker() {
                holed.set(pos, Cell::EMPTY);
                refilled.insert(pos);
            }
        }

        let filled = fill_empty_spaces(&holed, &mut rng);
        prop_assert!(filled.is_settled());
        for m in find_matches(&filled).matches {
            for pos in &m.cells {
                prop_assert!(!refilled.contains(pos), "refilled {:?} is part of a run", pos);
            }
        }
    }

    #[test]
    fn settle_terminates_without_matches(seed in any::<u32>(), obstacles in placements()) {
        // Unconstrained colors, so the board usually starts with runs.
        let mut rng = SimpleRng::new(seed);
        let mut board = Board::new();
        for p in obstacles.iter().filter(|p| p.kind == ObstacleKind::Blocker) {
            board = board.with_obstacle(p.pos(), ObstacleKind::Blocker, 1);
        }
        for pos in Board::positions() {
            if !board.cell(pos).is_blocker() {
                board.set(pos, Cell::gem(rng.next_color()));
            }
        }
        for p in obstacles.iter().filter(|p| p.kind != ObstacleKind::Blocker) {
            if !board.cell(p.pos()).is_blocker() {
                board = board.with_obstacle(p.pos(), p.kind, p.health);
            }
        }

        let (settled, report) = settle(board, &mut rng);
        prop_assert!(report.rounds.len() < MAX_CASCADE_ROUNDS as usize);
        prop_assert!(settled.is_settled());
        prop_assert!(find_matches(&settled).is_empty());
    }

    #[test]
    fn unproductive_swaps_revert_exactly(
        seed in any::<u32>(),
        obstacles in placements(),
        difficulty in difficulty(),
        pick in any::<usize>(),
    ) {
        let (board, mut rng) = level_board(seed, obstacles, difficulty);
        let candidates: Vec<Move> = Board::positions()
            .flat_map(|p| [Move::new(p, p.offset(0, 1)), Move::new(p, p.offset(1, 0))])
            .filter(|m| {
                m.to.in_bounds()
                    && board.can_swap(m.from)
                    && board.can_swap(m.to)
                    && !is_productive(&board, *m)
            })
            .collect();
        prop_assume!(!candidates.is_empty());

        let m = candidates[pick % candidates.len()];
        let outcome = apply_swap(&board, m.from, m.to, &mut rng).unwrap();
        prop_assert!(outcome.is_reverted());
        prop_assert_eq!(outcome.board, board);
    }

    #[test]
    fn obstacle_health_drops_at_most_one_per_pass(
        seed in any::<u32>(),
        obstacles in placements(),
        difficulty in difficulty(),
        picks in prop::collection::vec(any::<usize>(), 1..6),
    ) {
        let (board, mut rng) = level_board(seed, obstacles, difficulty);
        let mut driver = CascadeDriver::new(board);

        for pick in picks {
            let moves = find_possible_moves(driver.board());
            if moves.is_empty() {
                break;
            }
            let m = moves[pick % moves.len()];
            driver.begin_swap(m.from, m.to, &mut rng).unwrap();

            while !driver.is_idle() {
                let removing = driver.phase() == Phase::Removing;
                let before = driver.board().clone();
                driver.step(&mut rng);
                let after = driver.board();

                for cell in after.cells() {
                    if let Some(o) = cell.obstacle {
                        prop_assert!(o.health > 0);
                    }
                }
                if !removing {
                    prop_assert_eq!(obstacle_health(&before), obstacle_health(after));
                    continue;
                }
                for pos in Board::positions() {
                    match (before.cell(pos).obstacle, after.cell(pos).obstacle) {
                        (None, Some(o)) => prop_assert!(false, "obstacle {:?} appeared at {:?}", o, pos),
                        (Some(o), None) => {
                            prop_assert!(!o.is_blocker());
                            prop_assert_eq!(o.health, 1);
                        }
                        (Some(o), Some(n)) => {
                            prop_assert_eq!(o.kind, n.kind);
                            prop_assert!(n.health == o.health || n.health + 1 == o.health);
                        }
                        (None, None) => {}
                    }
                }
            }
        }
    }

    #[test]
    fn homing_strikes_never_self_or_double_target(
        seed in any::<u32>(),
        homing in prop::collection::vec((0i8..8, 0i8..8), 1..6),
    ) {
        let (mut board, _) = level_board(seed, Vec::new(), Difficulty::Hard);
        for &(row, col) in &homing {
            let pos = Position::new(row, col);
            let mut cell = board.cell(pos);
            cell.special = Some(Special::HomingStrike);
            cell.primed = true;
            board.set(pos, cell);
        }

        let result = find_matches(&board);
        let strikes: Vec<(Position, Position)> = result
            .activations
            .iter()
            .filter(|a| a.special == Special::HomingStrike)
            .filter_map(|a| a.target.map(|t| (a.pos, t)))
            .collect();
        prop_assert_eq!(strikes.len(), homing.iter().collect::<BTreeSet<_>>().len());

        let mut seen = BTreeSet::new();
        for &(pos, target) in &strikes {
            prop_assert_ne!(pos, target);
            prop_assert!(seen.insert(target), "{:?} targeted twice", target);
        }
        // No target may land inside another strike's 3x3.
        for (i, &(_, a)) in strikes.iter().enumerate() {
            for &(_, b) in &strikes[i + 1..] {
                prop_assert!(a.chebyshev(b) >= 2, "{:?} and {:?} overlap", a, b);
            }
        }
    }

    #[test]
    fn homing_fusions_never_target_the_swap(
        seed in any::<u32>(),
        row in 0i8..8,
        col in 0i8..7,
        partner in 0usize..5,
    ) {
        let (board, mut rng) = level_board(seed, Vec::new(), Difficulty::Hard);
        let (a, b) = (Position::new(row, col), Position::new(row, col + 1));
        let board = board
            .with_special(a, Special::HomingStrike)
            .with_special(b, Special::ALL[partner]);

        let combo = resolve_combo(&board, a, b, &mut rng).unwrap();
        let distinct: BTreeSet<Position> = combo.targets.iter().copied().collect();
        prop_assert_eq!(distinct.len(), combo.targets.len());
        prop_assert!(!distinct.contains(&a));
        prop_assert!(!distinct.contains(&b));
    }

    #[test]
    fn blockers_never_change(
        seed in any::<u32>(),
        obstacles in placements(),
        difficulty in difficulty(),
        picks in prop::collection::vec(any::<usize>(), 1..8),
    ) {
        let (board, mut rng) = level_board(seed, obstacles, difficulty);
        let expected = blockers(&board);
        let mut driver = CascadeDriver::new(board);

        for pick in picks {
            let moves = find_possible_moves(driver.board());
            if moves.is_empty() {
                break;
            }
            let m = moves[pick % moves.len()];
            driver.play_move(m.from, m.to, &mut rng).unwrap();
            prop_assert_eq!(blockers(driver.board()), expected.clone());
        }
    }
}
