//! Combo fusion - swapping two specials into each other
//!
//! When both swapped cells hold a special, normal match detection is skipped
//! and one of ten fixed fusion effects fires around the swap destination.
//! Row- and column-clears pair as a single "rocket" category.
//!
//! | Pair | Effect |
//! |------|--------|
//! | rocket + rocket | row and column through the center |
//! | rocket + bomb | three rows centered on the center row |
//! | bomb + bomb | 5x5 around the center |
//! | rainbow + rainbow | whole board |
//! | rocket + rainbow | every cell of the partner color fires a rocket |
//! | bomb + rainbow | every cell of the partner color fires a 3x3 |
//! | propeller + rocket / propeller | three homing strikes |
//! | propeller + bomb | one homing strike with a 5x5 |
//! | propeller + rainbow | three homing strikes |

use std::collections::BTreeSet;

use crate::board::Board;
use crate::resolve::{apply_damage, clear_cells, Removal};
use crate::rng::RandomSource;
use crate::targeting::find_homing_targets;
use crate::types::{Color, Position, Special, BOARD_COLS, FUSION_HOMING_STRIKES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Rocket,
    Bomb,
    Homing,
    Rainbow,
}

impl From<Special> for Category {
    fn from(special: Special) -> Self {
        match special {
            Special::RowClear | Special::ColumnClear => Category::Rocket,
            Special::AreaClear => Category::Bomb,
            Special::HomingStrike => Category::Homing,
            Special::ColorClear => Category::Rainbow,
        }
    }
}

/// The ten fusion effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FusionKind {
    DoubleRocket,
    RocketBomb,
    DoubleBomb,
    DoubleRainbow,
    RocketRainbow,
    BombRainbow,
    HomingRocket,
    DoubleHoming,
    HomingBomb,
    HomingRainbow,
}

impl FusionKind {
    /// Fusion for an unordered pair of specials
    pub fn from_pair(a: Special, b: Special) -> Self {
        use Category::*;
        match (Category::from(a), Category::from(b)) {
            (Rocket, Rocket) => FusionKind::DoubleRocket,
            (Rocket, Bomb) | (Bomb, Rocket) => FusionKind::RocketBomb,
            (Bomb, Bomb) => FusionKind::DoubleBomb,
            (Rainbow, Rainbow) => FusionKind::DoubleRainbow,
            (Rocket, Rainbow) | (Rainbow, Rocket) => FusionKind::RocketRainbow,
            (Bomb, Rainbow) | (Rainbow, Bomb) => FusionKind::BombRainbow,
            (Rocket, Homing) | (Homing, Rocket) => FusionKind::HomingRocket,
            (Homing, Homing) => FusionKind::DoubleHoming,
            (Bomb, Homing) | (Homing, Bomb) => FusionKind::HomingBomb,
            (Homing, Rainbow) | (Rainbow, Homing) => FusionKind::HomingRainbow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FusionKind::DoubleRocket => "rocket+rocket",
            FusionKind::RocketBomb => "rocket+bomb",
            FusionKind::DoubleBomb => "bomb+bomb",
            FusionKind::DoubleRainbow => "rainbow+rainbow",
            FusionKind::RocketRainbow => "rocket+rainbow",
            FusionKind::BombRainbow => "bomb+rainbow",
            FusionKind::HomingRocket => "propeller+rocket",
            FusionKind::DoubleHoming => "propeller+propeller",
            FusionKind::HomingBomb => "propeller+bomb",
            FusionKind::HomingRainbow => "propeller+rainbow",
        }
    }
}

/// A resolved fusion, ready to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboResult {
    pub kind: FusionKind,
    /// Swap destination, the center of the effect
    pub center: Position,
    /// The other swapped cell
    pub partner: Position,
    /// Color the color-seeded fusions sweep
    pub seed_color: Option<Color>,
    /// Cells turned into firing specials by rocket/bomb + rainbow
    pub seeded: Vec<(Position, Special)>,
    /// Homing-strike landing cells
    pub targets: Vec<Position>,
    /// Every cell the fusion sweeps, blockers excluded
    pub area: BTreeSet<Position>,
}

/// Resolve the fusion for a swap of two specials
///
/// `board` is the post-swap board; `a` is the origin and `b` the destination.
/// Returns `None` unless both cells hold a special.
pub fn resolve_combo(
    board: &Board,
    a: Position,
    b: Position,
    rng: &mut impl RandomSource,
) -> Option<ComboResult> {
    let moved = board.get(b)?;
    let other = board.get(a)?;
    let kind = FusionKind::from_pair(moved.special?, other.special?);

    // The non-rainbow token decides the seeded color.
    let seed_color = match (moved.special, other.special) {
        (Some(Special::ColorClear), _) => other.color,
        _ => moved.color,
    };

    let center = b;
    let mut area = BTreeSet::new();
    let mut seeded = Vec::new();
    let mut targets = Vec::new();

    match kind {
        FusionKind::DoubleRocket => {
            area.extend(Board::row_positions(center.row));
            area.extend(Board::col_positions(center.col));
        }
        FusionKind::RocketBomb => {
            for row in center.row - 1..=center.row + 1 {
                area.extend((0..BOARD_COLS).map(|c| Position::new(row, c)).filter(|p| p.in_bounds()));
            }
        }
        FusionKind::DoubleBomb => area.extend(Board::square(center, 2)),
        FusionKind::DoubleRainbow => area.extend(Board::positions()),
        FusionKind::RocketRainbow | FusionKind::BombRainbow => {
            for pos in Board::positions() {
                if seed_color.is_none() || board.matchable_color(pos) != seed_color {
                    continue;
                }
                let special = if kind == FusionKind::BombRainbow {
                    area.extend(Board::square(pos, 1));
                    Special::AreaClear
                } else if rng.chance(0.5) {
                    area.extend(Board::row_positions(pos.row));
                    Special::RowClear
                } else {
                    area.extend(Board::col_positions(pos.col));
                    Special::ColumnClear
                };
                seeded.push((pos, special));
            }
        }
        FusionKind::HomingRocket | FusionKind::DoubleHoming | FusionKind::HomingRainbow => {
            let mut reserved: BTreeSet<Position> = [a, b].into_iter().collect();
            targets = find_homing_targets(board, &mut reserved, FUSION_HOMING_STRIKES, 1);
            for &t in &targets {
                area.extend(Board::square(t, 1));
            }
        }
        FusionKind::HomingBomb => {
            let mut reserved: BTreeSet<Position> = [a, b].into_iter().collect();
            targets = find_homing_targets(board, &mut reserved, 1, 2);
            for &t in &targets {
                area.extend(Board::square(t, 2));
            }
        }
    }

    area.insert(a);
    area.insert(b);
    area.retain(|&p| !board.cell(p).is_blocker());

    Some(ComboResult {
        kind,
        center,
        partner: a,
        seed_color,
        seeded,
        targets,
        area,
    })
}

/// Clear a fusion's area
///
/// Obstacles in the area take one hit. The two fused tokens and every seeded
/// cell are consumed; any other special in the area is primed.
pub fn apply_combo(board: &Board, combo: &ComboResult) -> Removal {
    let mut out = board.clone();
    let damage: BTreeSet<Position> = combo
        .area
        .iter()
        .copied()
        .filter(|&p| out.cell(p).obstacle.is_some_and(|o| !o.is_blocker()))
        .collect();
    let (damaged, destroyed) = apply_damage(&mut out, &damage);

    let mut consumed: BTreeSet<Position> = [combo.center, combo.partner].into_iter().collect();
    consumed.extend(combo.seeded.iter().map(|(p, _)| *p));

    let mut removal = clear_cells(out, &combo.area, &consumed, &[]);
    removal.obstacles_damaged = damaged;
    removal.obstacles_cleared = destroyed;
    removal
}
