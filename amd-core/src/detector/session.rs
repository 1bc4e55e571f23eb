//! `DetectionSession` — per-call detector driven by two input signals.
//!
//! ## Per-frame flow
//!
//! ```text
//! on_frame(frame)
//!   ├─ verdict already recorded → Inert
//!   ├─ arm budget (first frame), charge samples → exhausted? NOTSURE/TOOLONG
//!   ├─ frame_ms = 1000 / (rate / samples)
//!   ├─ classify → Silence | Voiced
//!   └─ PhaseStateMachine::step → Some(cause)? emit
//! on_close()
//!   └─ no verdict yet → NOTSURE/TOOLONG (logged as an anomaly)
//! ```
//!
//! Everything runs synchronously on the caller's thread. A session is owned
//! by exactly one call and is never shared.

use tracing::{debug, trace, warn};

use super::budget::TimeBudgetGuard;
use super::emitter::{Clock, ResultEmitter, SystemClock, VerdictObserver};
use super::phase::PhaseStateMachine;
use crate::buffering::AudioFrame;
use crate::config::AmdParameters;
use crate::ipc::events::{Verdict, VerdictReport};
use crate::vad::{FrameClassifier, MeanAmplitudeClassifier};

/// What a single frame did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No rule fired; keep feeding frames.
    Pending,
    /// This frame produced the verdict.
    Decided(VerdictReport),
    /// The session already had a verdict; the frame was ignored.
    Inert,
}

pub struct DetectionSession {
    uuid: String,
    classifier: Box<dyn FrameClassifier>,
    machine: PhaseStateMachine,
    budget: TimeBudgetGuard,
    emitter: ResultEmitter,
    frames_seen: u64,
    samples_seen: u64,
}

impl DetectionSession {
    /// New session using the mean-amplitude classifier at the configured
    /// `silence_threshold` and the system clock.
    pub fn new(
        uuid: impl Into<String>,
        params: AmdParameters,
        observer: impl VerdictObserver + 'static,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            classifier: Box::new(MeanAmplitudeClassifier::new(params.silence_threshold)),
            machine: PhaseStateMachine::new(params),
            budget: TimeBudgetGuard::new(params.total_analysis_time),
            emitter: ResultEmitter::new(Box::new(observer), Box::new(SystemClock)),
            frames_seen: 0,
            samples_seen: 0,
        }
    }

    /// Replace the frame classifier.
    pub fn with_classifier(mut self, classifier: impl FrameClassifier) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Replace the clock used to stamp the decision.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.emitter.set_clock(Box::new(clock));
        self
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn params(&self) -> &AmdParameters {
        self.machine.params()
    }

    pub fn state(&self) -> &PhaseStateMachine {
        &self.machine
    }

    pub fn budget(&self) -> &TimeBudgetGuard {
        &self.budget
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.emitter.report().map(|r| r.verdict())
    }

    pub fn report(&self) -> Option<VerdictReport> {
        self.emitter.report()
    }

    pub fn is_terminal(&self) -> bool {
        self.emitter.report().is_some()
    }

    /// Process one inbound frame.
    pub fn on_frame(&mut self, frame: &AudioFrame) -> FrameOutcome {
        if self.is_terminal() {
            trace!(uuid = %self.uuid, "AMD: frame after verdict ignored");
            return FrameOutcome::Inert;
        }
        if frame.is_empty() || frame.sample_rate == 0 {
            debug!(
                uuid = %self.uuid,
                samples = frame.len(),
                sample_rate = frame.sample_rate,
                "AMD: skipping unusable frame"
            );
            return FrameOutcome::Pending;
        }

        self.frames_seen += 1;
        self.samples_seen += frame.len() as u64;

        self.budget.arm(frame.sample_rate);
        if self.budget.consume(frame.len()) {
            debug!(
                uuid = %self.uuid,
                samples_seen = self.samples_seen,
                "AMD: NOTSURE (analysis time exhausted)"
            );
            return FrameOutcome::Decided(self.emitter.emit(Verdict::not_sure()));
        }

        let frame_ms = frame.duration_ms();
        let label = self.classifier.classify(frame);
        trace!(uuid = %self.uuid, ?label, frame_ms, "AMD: frame classified");

        match self.machine.step(label, frame_ms) {
            Some(cause) => FrameOutcome::Decided(self.emitter.emit(Verdict::from_cause(cause))),
            None => FrameOutcome::Pending,
        }
    }

    /// The media path detached. Returns the verdict that stands.
    ///
    /// Safe to call more than once; observers are only notified the first
    /// time any verdict is recorded.
    pub fn on_close(&mut self) -> VerdictReport {
        if let Some(report) = self.emitter.report() {
            debug!(uuid = %self.uuid, verdict = %report.verdict(), "AMD: close");
            return report;
        }
        warn!(
            uuid = %self.uuid,
            frames_seen = self.frames_seen,
            "no AMD result recorded; setting NOTSURE/TOOLONG"
        );
        self.emitter.emit(Verdict::not_sure())
    }
}

impl std::fmt::Debug for DetectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionSession")
            .field("uuid", &self.uuid)
            .field("machine", &self.machine)
            .field("budget", &self.budget)
            .field("verdict", &self.verdict())
            .finish_non_exhaustive()
    }
}
