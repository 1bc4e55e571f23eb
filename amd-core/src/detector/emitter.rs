//! One-shot verdict delivery.
//!
//! The state machine only returns a cause; `ResultEmitter` stamps it and
//! hands it to the host's `VerdictObserver` exactly once per session.

use tracing::debug;

use crate::ipc::events::{Verdict, VerdictReport};

/// Host-side sink for the decision.
pub trait VerdictObserver: Send {
    /// Called once, when the session's verdict becomes known.
    fn verdict_reached(&mut self, report: &VerdictReport);
}

impl<F> VerdictObserver for F
where
    F: FnMut(&VerdictReport) + Send,
{
    fn verdict_reached(&mut self, report: &VerdictReport) {
        self(report)
    }
}

/// Source of the decision timestamp.
pub trait Clock: Send {
    /// Seconds since the Unix epoch.
    fn now_epoch_secs(&self) -> i64;
}

/// Wall clock via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Constant clock for replay and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Write-once holder of the session's report.
pub struct ResultEmitter {
    observer: Box<dyn VerdictObserver>,
    clock: Box<dyn Clock>,
    report: Option<VerdictReport>,
}

impl ResultEmitter {
    pub fn new(observer: Box<dyn VerdictObserver>, clock: Box<dyn Clock>) -> Self {
        Self {
            observer,
            clock,
            report: None,
        }
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    pub fn report(&self) -> Option<VerdictReport> {
        self.report
    }

    /// Record `verdict` and notify the observer, unless a verdict already exists.
    /// Always returns the report that stands.
    pub fn emit(&mut self, verdict: Verdict) -> VerdictReport {
        if let Some(existing) = self.report {
            debug!(
                result = %existing.result,
                cause = %existing.cause,
                ignored = %verdict,
                "AMD: verdict already recorded"
            );
            return existing;
        }
        let report = VerdictReport::new(verdict, self.clock.now_epoch_secs());
        self.report = Some(report);
        self.observer.verdict_reached(&report);
        report
    }
}

impl std::fmt::Debug for ResultEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultEmitter")
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}
