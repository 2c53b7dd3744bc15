//! Progress tracking for bulk imports.
//!
//! Tracks a completed/total pair and a human-readable status string. The
//! fraction is monotonically non-decreasing within one run and reverts to
//! indeterminate when the run state is reset.

/// Snapshot of import progress for observing surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportProgress {
    /// Completion fraction in [0, 1]; `None` while no run is in flight
    pub fraction: Option<f64>,
    /// Human-readable status string
    pub message: String,
}

impl ImportProgress {
    /// Indeterminate progress with an idle message.
    pub fn indeterminate() -> Self {
        Self {
            fraction: None,
            message: "idle".to_string(),
        }
    }
}

/// Mutable progress state owned by the importer.
#[derive(Debug)]
pub(crate) struct ProgressState {
    completed: usize,
    total: Option<usize>,
    message: String,
}

impl ProgressState {
    pub(crate) fn idle() -> Self {
        Self {
            completed: 0,
            total: None,
            message: "idle".to_string(),
        }
    }

    /// Enter a determinate phase with a known item total.
    pub(crate) fn begin(&mut self, total: usize, message: impl Into<String>) {
        self.completed = 0;
        self.total = Some(total);
        self.message = message.into();
    }

    /// Indeterminate phase (listing call in flight).
    pub(crate) fn begin_indeterminate(&mut self, message: impl Into<String>) {
        self.completed = 0;
        self.total = None;
        self.message = message.into();
    }

    /// Record one more completed item. Completion never decreases within a
    /// run; the counter saturates at the total.
    pub(crate) fn advance(&mut self, message: impl Into<String>) {
        let ceiling = self.total.unwrap_or(usize::MAX);
        self.completed = (self.completed + 1).min(ceiling);
        self.message = message.into();
    }

    /// Update the status message without touching completion.
    pub(crate) fn note(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Force completion (fraction 1.0) with a final message.
    pub(crate) fn finish(&mut self, message: impl Into<String>) {
        if let Some(total) = self.total {
            self.completed = total;
        } else {
            self.total = Some(1);
            self.completed = 1;
        }
        self.message = message.into();
    }

    /// Reset to the indeterminate between-runs state.
    pub(crate) fn reset(&mut self) {
        *self = Self::idle();
    }

    pub(crate) fn fraction(&self) -> Option<f64> {
        self.total.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.completed as f64 / total as f64
            }
        })
    }

    pub(crate) fn snapshot(&self) -> ImportProgress {
        ImportProgress {
            fraction: self.fraction(),
            message: self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_is_indeterminate() {
        let state = ProgressState::idle();
        assert_eq!(state.fraction(), None);
        assert_eq!(state.snapshot(), ImportProgress::indeterminate());
    }

    #[test]
    fn test_fraction_is_monotonic_and_reaches_one() {
        let mut state = ProgressState::idle();
        state.begin(4, "starting");

        let mut previous = 0.0;
        for i in 0..4 {
            state.advance(format!("item {i}"));
            let fraction = state.fraction().expect("determinate");
            assert!(fraction >= previous);
            previous = fraction;
        }
        assert_eq!(state.fraction(), Some(1.0));
    }

    #[test]
    fn test_advance_saturates_at_total() {
        let mut state = ProgressState::idle();
        state.begin(2, "starting");
        state.advance("a");
        state.advance("b");
        state.advance("overrun");
        assert_eq!(state.fraction(), Some(1.0));
    }

    #[test]
    fn test_empty_total_is_complete() {
        let mut state = ProgressState::idle();
        state.begin(0, "empty listing");
        assert_eq!(state.fraction(), Some(1.0));
    }

    #[test]
    fn test_reset_returns_to_indeterminate() {
        let mut state = ProgressState::idle();
        state.begin(3, "starting");
        state.advance("a");
        state.reset();
        assert_eq!(state.fraction(), None);
    }
}
