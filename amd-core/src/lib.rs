//! # amd-core
//!
//! Live answering-machine detection on the inbound leg of a call.
//!
//! ## Architecture
//!
//! ```text
//! host media reader ──AudioFrame──► DetectionSession::on_frame
//!                                        │
//!                          TimeBudgetGuard (samples left?)
//!                                        │
//!                       MeanAmplitudeClassifier → Silence | Voiced
//!                                        │
//!                              PhaseStateMachine::step
//!                                        │ Some(cause)
//!                                  ResultEmitter (once)
//!                                        │
//!                  VerdictObserver → ChannelNotifier → vars / event / hook
//! ```
//!
//! Per-frame work is synchronous arithmetic on the caller's thread; nothing
//! here spawns, blocks or performs I/O.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod buffering;
pub mod config;
pub mod detector;
pub mod error;
pub mod host;
pub mod ipc;
pub mod vad;

// Convenience re-exports for downstream crates
pub use buffering::AudioFrame;
pub use config::{AmdParameters, ParameterStore};
pub use detector::{DetectionSession, FrameOutcome, VerdictObserver};
pub use error::AmdError;
pub use host::{
    start_detection, uuid_amd_detect, CallChannel, CallRegistry, CommandReply, DecisionBus,
};
pub use ipc::events::{AmdEvent, Cause, Decision, Verdict, VerdictReport};
