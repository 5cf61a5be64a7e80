//! Audio file I/O for Clipforge
//!
//! The canonical output container is uncompressed PCM WAV: 16-bit signed
//! little-endian integers, interleaved, regardless of the buffer's internal
//! range metadata. Buffers with a wider internal range are clamped on write.
//!
//! Decoding is best-effort: other bit depths are rescaled into the engine's
//! symmetric 16-bit range on import.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::warn;

use crate::engine::buffer::{ChannelLayout, SampleBuffer, SAMPLE_MAX, SAMPLE_MIN};
use crate::error::{ForgeError, Result};

/// Decoded audio shorter than this is treated as a failed load
pub const MIN_DURATION_SECS: f64 = 0.1;

/// Write a buffer to a WAV file in the canonical format
///
/// The header carries the buffer's channel count and sample rate; the body
/// is the interleaved sample matrix packed as 2-byte little-endian signed
/// integers.
///
/// # Errors
/// * `InvalidAudio` - if the file cannot be created or written; the
///   underlying encoder error is kept as the source
pub fn save_wav(buffer: &SampleBuffer, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_io_err)?;

    for sample in buffer.to_interleaved() {
        let packed = sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        writer.write_sample(packed).map_err(wav_io_err)?;
    }

    writer.finalize().map_err(wav_io_err)?;
    Ok(())
}

/// Import a WAV file into a SampleBuffer
///
/// Samples are rescaled into the engine's symmetric 16-bit range. A file
/// that decodes to a near-zero duration reports `LoadFailed` so callers can
/// substitute a default buffer.
///
/// # Errors
/// * `FileNotFound` - if the file does not exist
/// * `InvalidAudio` - if the file is not a readable WAV file
/// * `UnsupportedFormat` - for more than 2 channels or odd bit depths
/// * `LoadFailed` - if the decoded duration is below 0.1 seconds
pub fn load_wav(path: &Path) -> Result<SampleBuffer> {
    if !path.exists() {
        return Err(ForgeError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| ForgeError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let layout = ChannelLayout::from_count(spec.channels as usize).ok_or_else(|| {
        ForgeError::UnsupportedFormat {
            format: format!(
                "{}-channel audio (only mono/stereo supported)",
                spec.channels
            ),
        }
    })?;

    let interleaved = read_samples_as_i32(reader, spec.bits_per_sample, spec.sample_format)?;
    let buffer = SampleBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;

    if buffer.duration_secs() <= MIN_DURATION_SECS {
        return Err(ForgeError::LoadFailed {
            path: path.display().to_string(),
            reason: format!(
                "decoded duration {:.3}s is below {:.1}s",
                buffer.duration_secs(),
                MIN_DURATION_SECS
            ),
        });
    }

    Ok(buffer)
}

/// Load a WAV file, substituting an empty default buffer on failure
///
/// This is the engine's required response to a collaborator reporting a
/// failed load: downstream code always gets a valid buffer to operate on.
pub fn load_or_silence(path: &Path) -> SampleBuffer {
    match load_wav(path) {
        Ok(buffer) => buffer,
        Err(e) => {
            warn!("{}; substituting an empty buffer", e);
            SampleBuffer::default()
        }
    }
}

/// Synthesize a full-scale mono sine wave
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `duration_secs` - Length of the tone in seconds
/// * `sample_rate` - Sample rate in Hz
pub fn sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> SampleBuffer {
    let frames = (duration_secs as f64 * sample_rate as f64) as usize;
    let mut buffer = SampleBuffer::silence(frames, ChannelLayout::Mono, sample_rate);

    let angular = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;
    for (i, sample) in buffer.channel_mut(0).iter_mut().enumerate() {
        *sample = ((angular * i as f64).sin() * SAMPLE_MAX as f64).round() as i32;
    }

    buffer
}

fn wav_io_err(e: hound::Error) -> ForgeError {
    ForgeError::InvalidAudio {
        reason: format!("Failed to write WAV file: {}", e),
        source: Some(Box::new(e)),
    }
}

/// Read interleaved samples and rescale into the symmetric 16-bit range
///
/// The container's most negative values (`i16::MIN` and its wider
/// equivalents) clamp to `SAMPLE_MIN`: the engine's range is symmetric and
/// one unit narrower than two's-complement full scale.
fn read_samples_as_i32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<i32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| {
                s.map(|v| {
                    ((v as f64) * SAMPLE_MAX as f64)
                        .round()
                        .clamp(-(SAMPLE_MAX as f64), SAMPLE_MAX as f64) as i32
                })
            })
            .collect::<std::result::Result<Vec<i32>, _>>()
            .map_err(|e| ForgeError::InvalidAudio {
                reason: format!("Failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| (v as i32 * 256).clamp(SAMPLE_MIN, SAMPLE_MAX)))
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| ForgeError::InvalidAudio {
                    reason: format!("Failed to read 8-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| (v as i32).clamp(SAMPLE_MIN, SAMPLE_MAX)))
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| ForgeError::InvalidAudio {
                    reason: format!("Failed to read 16-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> 8).clamp(SAMPLE_MIN, SAMPLE_MAX)))
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| ForgeError::InvalidAudio {
                    reason: format!("Failed to read 24-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> 16).clamp(SAMPLE_MIN, SAMPLE_MAX)))
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| ForgeError::InvalidAudio {
                    reason: format!("Failed to read 32-bit int samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            _ => Err(ForgeError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::DEFAULT_SAMPLE_RATE;
    use tempfile::tempdir;

    #[test]
    fn test_sine_wave_shape() {
        let buffer = sine_wave(440.0, 1.0, DEFAULT_SAMPLE_RATE);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.frames(), DEFAULT_SAMPLE_RATE as usize);
        assert!(buffer.in_range());

        // Peak should come close to full scale somewhere in the first cycle
        let peak = buffer.channel(0).iter().map(|s| s.abs()).max().unwrap();
        assert!(peak > SAMPLE_MAX - 100);
    }

    #[test]
    fn test_round_trip_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let original = sine_wave(440.0, 0.5, DEFAULT_SAMPLE_RATE);
        save_wav(&original, &path).unwrap();
        let imported = load_wav(&path).unwrap();

        // Integer samples inside the symmetric range survive 16-bit PCM exactly
        assert_eq!(original, imported);
    }

    #[test]
    fn test_round_trip_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let left: Vec<i32> = (0..8000).map(|i| (i % 100) * 10).collect();
        let right: Vec<i32> = (0..8000).map(|i| -(i % 50) * 20).collect();
        let original =
            SampleBuffer::from_channels(vec![left, right], DEFAULT_SAMPLE_RATE).unwrap();

        save_wav(&original, &path).unwrap();
        let imported = load_wav(&path).unwrap();
        assert_eq!(original, imported);
    }

    #[test]
    fn test_canonical_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("header.wav");

        let buffer = sine_wave(1000.0, 0.2, 44100);
        save_wav(&buffer, &path).unwrap();

        let spec = WavReader::open(&path).unwrap().spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);
    }

    #[test]
    fn test_load_full_scale_negative_clamps_to_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("floor.wav");

        // Hand-written 16-bit WAV of i16::MIN samples: one unit below the
        // engine's symmetric minimum.
        let spec = WavSpec {
            channels: 1,
            sample_rate: DEFAULT_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..4410 {
            writer.write_sample(i16::MIN).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = load_wav(&path).unwrap();
        assert!(buffer.in_range());
        assert!(buffer.channel(0).iter().all(|&s| s == buffer.sample_min));
    }

    #[test]
    fn test_save_to_bad_path_keeps_error_source() {
        let err = save_wav(
            &sine_wave(440.0, 0.2, DEFAULT_SAMPLE_RATE),
            Path::new("/nonexistent-dir/out.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidAudio { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_wav(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(ForgeError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_near_zero_duration_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blip.wav");

        // 0.01 seconds is below the load threshold
        let tiny = sine_wave(440.0, 0.01, DEFAULT_SAMPLE_RATE);
        save_wav(&tiny, &path).unwrap();

        let result = load_wav(&path);
        assert!(matches!(result, Err(ForgeError::LoadFailed { .. })));
    }

    #[test]
    fn test_load_or_silence_substitutes_default() {
        let buffer = load_or_silence(Path::new("/nonexistent/audio.wav"));
        assert!(buffer.is_empty());
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.sample_rate, DEFAULT_SAMPLE_RATE);
    }
}
