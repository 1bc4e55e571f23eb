//! Typed audio frame passed from the host media reader to the detector.

/// A contiguous block of mono signed 16-bit PCM samples at a known sample rate.
///
/// The host may change the frame size mid-stream, so every per-frame duration
/// is derived from the frame itself rather than cached.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Mono linear PCM samples.
    pub samples: Vec<i16>,
    /// Sample rate in Hz (e.g. 8000, 16000).
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples carried by this frame.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the frame contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Frame duration in whole milliseconds: `1000 / (rate / samples)`.
    ///
    /// Integer arithmetic throughout, so a 160-sample frame at 8 kHz is 20 ms
    /// and a 441-sample frame at 44.1 kHz is 10 ms. Frames longer than one
    /// second of audio (where `rate / samples` would be zero) fall back to
    /// `samples * 1000 / rate`. Empty frames and a zero rate yield 0.
    pub fn duration_ms(&self) -> u32 {
        let samples = self.samples.len() as u64;
        let rate = u64::from(self.sample_rate);
        if samples == 0 || rate == 0 {
            return 0;
        }
        let frames_per_second = rate / samples;
        let ms = if frames_per_second == 0 {
            samples * 1000 / rate
        } else {
            1000 / frames_per_second
        };
        u32::try_from(ms).unwrap_or(u32::MAX)
    }
}
