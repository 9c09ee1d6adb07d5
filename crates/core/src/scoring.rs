//! Scoring module - per-round and fusion scores
//!
//! Round score:
//! - each match: `10 * len + 15 * max(0, len - 3)`
//! - each activation: rocket 50, rainbow 100, bomb 75, propeller 60
//! - the sum is multiplied by `1 + combo * 0.5` (floored), where `combo`
//!   counts earlier rounds of the same move
//!
//! Fusion score is flat: `200 + 15 * cells`, never multiplied.

use crate::matcher::MatchResult;
use crate::types::{
    FUSION_BASE_POINTS, FUSION_CELL_POINTS, MATCH_CELL_POINTS, MATCH_EXTRA_CELL_POINTS,
    MIN_MATCH_LEN,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points from match lengths
    pub match_points: u32,
    /// Points from activations
    pub activation_points: u32,
    /// Combo index the multiplier was taken from
    pub combo: u32,
    pub total: u32,
}

/// Points for one match of the given length
pub fn calculate_match_points(len: usize) -> u32 {
    let len = len as u32;
    let extra = len.saturating_sub(MIN_MATCH_LEN as u32);
    MATCH_CELL_POINTS * len + MATCH_EXTRA_CELL_POINTS * extra
}

/// Apply the `1 + combo * 0.5` multiplier in integer arithmetic
pub fn apply_combo_multiplier(points: u32, combo: u32) -> u32 {
    points.saturating_mul(combo.saturating_add(2)) / 2
}

fn match_points(result: &MatchResult) -> u32 {
    result.matches.iter().map(|m| calculate_match_points(m.len())).sum()
}

fn activation_points(result: &MatchResult) -> u32 {
    result
        .activations
        .iter()
        .map(|a| a.special.activation_points())
        .sum()
}

/// Unmultiplied points for a round
pub fn calculate_base_score(result: &MatchResult) -> u32 {
    match_points(result) + activation_points(result)
}

/// Complete score for a round at the given combo index
pub fn calculate_score(result: &MatchResult, combo: u32) -> ScoreResult {
    let match_points = match_points(result);
    let activation_points = activation_points(result);
    ScoreResult {
        match_points,
        activation_points,
        combo,
        total: apply_combo_multiplier(match_points + activation_points, combo),
    }
}

/// Flat fusion award
pub fn calculate_fusion_score(cells: usize) -> u32 {
    FUSION_BASE_POINTS + FUSION_CELL_POINTS * cells as u32
}
