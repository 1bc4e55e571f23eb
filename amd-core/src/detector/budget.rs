//! Audio-time budget for one analysis.
//!
//! The budget is counted in samples, not wall-clock time: a stalled media
//! path never trips it.

use tracing::debug;

/// Forces NOTSURE/TOOLONG once `total_analysis_time` of audio has been seen.
#[derive(Debug, Clone)]
pub struct TimeBudgetGuard {
    total_analysis_ms: u32,
    /// `None` until armed on the first frame, or when disabled.
    remaining: Option<i64>,
    armed: bool,
}

impl TimeBudgetGuard {
    /// `total_analysis_ms == 0` disables the guard.
    pub fn new(total_analysis_ms: u32) -> Self {
        Self {
            total_analysis_ms,
            remaining: None,
            armed: false,
        }
    }

    /// Fix the sample budget from the stream's rate. Only the first call counts.
    ///
    /// `(rate / 1000) * total_analysis_time`; a budget that works out to zero
    /// (disabled, or a rate below 1 kHz) leaves the guard off.
    pub fn arm(&mut self, sample_rate: u32) {
        if self.armed {
            return;
        }
        self.armed = true;
        if self.total_analysis_ms == 0 {
            return;
        }
        let budget = i64::from(sample_rate / 1000) * i64::from(self.total_analysis_ms);
        if budget > 0 {
            debug!(budget_samples = budget, "AMD: analysis budget armed");
            self.remaining = Some(budget);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining_samples(&self) -> Option<i64> {
        self.remaining
    }

    /// Charge a frame against the budget. Returns `true` once it is spent.
    pub fn consume(&mut self, samples: usize) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= i64::try_from(samples).unwrap_or(i64::MAX);
        *remaining <= 0
    }
}
