//! Frame types handed from the host media path to the detector.
//!
//! Frames arrive already decoded to mono linear PCM; the detector never
//! buffers across frames, so there is no ring here, only the typed frame.

pub mod frame;

pub use frame::AudioFrame;
