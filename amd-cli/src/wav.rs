//! WAV input: splits a mono 16-bit PCM recording into fixed-duration frames.

use std::path::Path;

use amd_core::AudioFrame;
use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};

/// Read `path` and cut it into frames of `frame_ms` milliseconds.
/// The final frame may be shorter.
pub fn read_frames(path: &Path, frame_ms: u32) -> Result<Vec<AudioFrame>> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        bail!("expected mono audio, got {} channels", spec.channels);
    }
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!(
            "expected 16-bit linear PCM, got {:?} {}-bit",
            spec.sample_format,
            spec.bits_per_sample
        );
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to decode WAV samples")?;

    Ok(split_frames(&samples, spec.sample_rate, frame_ms))
}

pub fn split_frames(samples: &[i16], sample_rate: u32, frame_ms: u32) -> Vec<AudioFrame> {
    let per_frame = ((u64::from(sample_rate) * u64::from(frame_ms)) / 1000).max(1) as usize;
    samples
        .chunks(per_frame)
        .map(|chunk| AudioFrame::new(chunk.to_vec(), sample_rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).expect("create wav");
        for s in samples {
            writer.write_sample(*s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn splits_into_twenty_ms_frames() {
        let frames = split_frames(&vec![0i16; 8000], 8000, 20);
        assert_eq!(frames.len(), 50);
        assert!(frames.iter().all(|f| f.len() == 160 && f.duration_ms() == 20));
    }

    #[test]
    fn trailing_partial_frame_is_kept() {
        let frames = split_frames(&vec![0i16; 500], 8000, 20);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3].len(), 20);
    }

    #[test]
    fn reads_mono_pcm() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, &vec![1000i16; 1600]);

        let frames = read_frames(&path, 20).expect("read frames");
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0].sample_rate, 8000);
        assert_eq!(frames[0].samples[0], 1000);
    }

    #[test]
    fn rejects_stereo() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &vec![0i16; 320]);

        let err = read_frames(&path, 20).expect_err("stereo should be rejected");
        assert!(err.to_string().contains("mono"));
    }
}
