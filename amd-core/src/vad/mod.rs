//! Per-frame silence / voice labelling.
//!
//! The `FrameClassifier` trait is the seam between the detector and the
//! signal measure: `MeanAmplitudeClassifier` is the only implementation the
//! detector ships with, but tests swap in scripted classifiers to drive the
//! state machine directly.

pub mod energy;

pub use energy::MeanAmplitudeClassifier;

use crate::buffering::AudioFrame;

/// Binary label for one audio frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLabel {
    /// The frame's score is below the silence threshold.
    Silence,
    /// The frame's score reached the silence threshold.
    Voiced,
}

impl FrameLabel {
    pub fn is_voiced(self) -> bool {
        self == FrameLabel::Voiced
    }
}

/// Trait for frame classifiers.
///
/// Classification must be deterministic: identical samples always produce
/// the same label.
pub trait FrameClassifier: Send + 'static {
    /// Label a frame. Callers guarantee the frame is non-empty.
    fn classify(&self, frame: &AudioFrame) -> FrameLabel;
}
