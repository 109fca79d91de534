use serde::Serialize;

use crate::model::score::rounded_percentage;

/// Questions finished (answered and submitted, or timed out) over the total.
///
/// The question currently on screen does not count until it is advanced past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    pub completed: usize,
    pub total: usize,
}

impl QuizProgress {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        rounded_percentage(self.completed, self.total)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}
