//! Answering-machine detector: phase state machine, analysis budget and the
//! one-shot verdict emitter, tied together by `DetectionSession`.

pub mod budget;
pub mod emitter;
pub mod phase;
pub mod session;

pub use budget::TimeBudgetGuard;
pub use emitter::{Clock, FixedClock, ResultEmitter, SystemClock, VerdictObserver};
pub use phase::{Phase, PhaseStateMachine, WordState};
pub use session::{DetectionSession, FrameOutcome};
