//! Mean-absolute-amplitude frame classifier.
//!
//! ## Algorithm
//!
//! 1. Sum `|sample|` over the frame.
//! 2. `score = round(sum / N)`.
//! 3. `score >= threshold` → `Voiced`, otherwise `Silence`.

use super::{FrameClassifier, FrameLabel};
use crate::buffering::AudioFrame;

/// Energy classifier over signed 16-bit PCM.
#[derive(Debug, Clone, Copy)]
pub struct MeanAmplitudeClassifier {
    /// Amplitude score at or above which a frame is voiced.
    /// Default: 256.
    threshold: u32,
}

impl MeanAmplitudeClassifier {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Rounded mean absolute amplitude. Returns 0 for an empty slice.
    pub fn score(samples: &[i16]) -> u32 {
        if samples.is_empty() {
            return 0;
        }
        let n = samples.len() as u64;
        let sum: u64 = samples.iter().map(|s| u64::from(s.unsigned_abs())).sum();
        // Round half up; the mean never exceeds 32768 so the cast is lossless.
        ((sum + n / 2) / n) as u32
    }
}

impl Default for MeanAmplitudeClassifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SILENCE_THRESHOLD)
    }
}

impl FrameClassifier for MeanAmplitudeClassifier {
    fn classify(&self, frame: &AudioFrame) -> FrameLabel {
        if Self::score(&frame.samples) >= self.threshold {
            FrameLabel::Voiced
        } else {
            FrameLabel::Silence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(samples: Vec<i16>) -> AudioFrame {
        AudioFrame::new(samples, 8000)
    }

    #[test]
    fn all_zero_frame_is_silence() {
        let classifier = MeanAmplitudeClassifier::new(256);
        assert_eq!(MeanAmplitudeClassifier::score(&[0; 160]), 0);
        assert_eq!(classifier.classify(&frame(vec![0; 160])), FrameLabel::Silence);
    }

    #[test]
    fn score_at_threshold_is_voiced() {
        let classifier = MeanAmplitudeClassifier::new(256);
        assert_eq!(classifier.classify(&frame(vec![256; 160])), FrameLabel::Voiced);
        assert_eq!(classifier.classify(&frame(vec![255; 160])), FrameLabel::Silence);
    }

    #[test]
    fn negative_samples_count_by_magnitude() {
        let classifier = MeanAmplitudeClassifier::new(1000);
        let samples: Vec<i16> = (0..160)
            .map(|i| if i % 2 == 0 { 1000 } else { -1000 })
            .collect();
        assert_eq!(MeanAmplitudeClassifier::score(&samples), 1000);
        assert_eq!(classifier.classify(&frame(samples)), FrameLabel::Voiced);
    }

    #[test]
    fn mean_is_rounded_not_truncated() {
        // (255 + 256) / 2 = 255.5 → 256
        assert_eq!(MeanAmplitudeClassifier::score(&[255, -256]), 256);
        // (255 + 255 + 256) / 3 = 255.33 → 255
        assert_eq!(MeanAmplitudeClassifier::score(&[255, 255, 256]), 255);
    }

    #[test]
    fn full_scale_negative_does_not_overflow() {
        assert_eq!(MeanAmplitudeClassifier::score(&[i16::MIN; 4]), 32768);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = MeanAmplitudeClassifier::default();
        let samples: Vec<i16> = (0..320).map(|i| ((i * 37) % 700) as i16 - 350).collect();
        let first = classifier.classify(&frame(samples.clone()));
        for _ in 0..10 {
            assert_eq!(classifier.classify(&frame(samples.clone())), first);
        }
    }
}
