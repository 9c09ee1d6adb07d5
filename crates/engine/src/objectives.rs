//! Level objective bookkeeping

use gemfall_core::level::Objective;
use gemfall_types::{Color, PALETTE};

use crate::cascade::RoundEvent;

/// Progress toward one objective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectiveProgress {
    pub objective: Objective,
    pub current: u32,
}

impl ObjectiveProgress {
    pub fn target(&self) -> u32 {
        match self.objective {
            Objective::ClearColor { count, .. } => count,
            Objective::ReachScore { score } => score,
        }
    }

    pub fn is_met(&self) -> bool {
        self.current >= self.target()
    }
}

/// Tracks cleared colors and score against a level's objectives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveTracker {
    goals: Vec<ObjectiveProgress>,
    cleared: [u32; PALETTE.len()],
    score: u32,
}

fn color_index(color: Color) -> usize {
    PALETTE.iter().position(|&c| c == color).unwrap_or(0)
}

impl ObjectiveTracker {
    pub fn new(objectives: &[Objective]) -> Self {
        Self {
            goals: objectives
                .iter()
                .map(|&objective| ObjectiveProgress { objective, current: 0 })
                .collect(),
            cleared: [0; PALETTE.len()],
            score: 0,
        }
    }

    /// Fold one cascade round into the counters
    pub fn record(&mut self, event: &RoundEvent) {
        for cell in &event.cleared_cells {
            if let Some(color) = cell.color {
                self.cleared[color_index(color)] += 1;
            }
        }
        self.score = self.score.saturating_add(event.score_delta);

        for goal in &mut self.goals {
            goal.current = match goal.objective {
                Objective::ClearColor { color, .. } => self.cleared[color_index(color)],
                Objective::ReachScore { .. } => self.score,
            };
        }
    }

    pub fn cleared(&self, color: Color) -> u32 {
        self.cleared[color_index(color)]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn progress(&self) -> &[ObjectiveProgress] {
        &self.goals
    }

    /// True once every objective is met; a level without objectives never completes
    pub fn is_complete(&self) -> bool {
        !self.goals.is_empty() && self.goals.iter().all(|g| g.is_met())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemfall_core::resolve::ClearedCell;
    use gemfall_types::Position;

    fn round(colors: &[Color], score: u32) -> RoundEvent {
        RoundEvent {
            round: 1,
            cleared_cells: colors
                .iter()
                .enumerate()
                .map(|(i, &c)| ClearedCell {
                    pos: Position::new(0, i as i8),
                    color: Some(c),
                    special: None,
                })
                .collect(),
            score_delta: score,
            combo: 0,
            matches: 1,
            activations: 0,
            created: Vec::new(),
            obstacles_cleared: 0,
            fusion: None,
        }
    }

    #[test]
    fn test_counts_colors_and_score() {
        let mut tracker = ObjectiveTracker::new(&[
            Objective::ClearColor { color: Color::Red, count: 5 },
            Objective::ReachScore { score: 50 },
        ]);
        tracker.record(&round(&[Color::Red, Color::Red, Color::Red], 30));
        assert_eq!(tracker.cleared(Color::Red), 3);
        assert!(!tracker.is_complete());

        tracker.record(&round(&[Color::Red, Color::Red, Color::Blue], 30));
        assert_eq!(tracker.cleared(Color::Red), 5);
        assert_eq!(tracker.cleared(Color::Blue), 1);
        assert_eq!(tracker.score(), 60);
        assert!(tracker.progress().iter().all(|g| g.is_met()));
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_no_objectives_never_complete() {
        let mut tracker = ObjectiveTracker::new(&[]);
        tracker.record(&round(&[Color::Green; 3], 1000));
        assert!(!tracker.is_complete());
    }
}
