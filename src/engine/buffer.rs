//! Sample Buffer
//!
//! Provides the core sample buffer type and the buffer-to-buffer transforms
//! for Clipforge. Samples are stored as fixed-point integers; every transform
//! clips its output into the buffer's sample range before returning, so
//! arithmetic saturates instead of wrapping.
//!
//! All transforms are value-producing: they take `&self` and return a fresh
//! `SampleBuffer`. Callers decide when to replace the buffer they own.

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Lower bound of the default symmetric 16-bit sample range
pub const SAMPLE_MIN: i32 = -32767;

/// Upper bound of the default symmetric 16-bit sample range
pub const SAMPLE_MAX: i32 = 32767;

/// Default sample rate for synthesized buffers (22.05 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Epsilon for floating-point no-op guards. Parameters are compared against
/// their neutral value through this, never with exact equality.
pub const PARAM_EPSILON: f32 = 1e-6;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to a linear amplitude factor
#[inline]
pub fn db_to_linear(db: f32) -> f64 {
    10.0_f64.powf(db as f64 / 20.0)
}

/// Convert a linear amplitude factor to decibels
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Single channel (mono)
    #[default]
    Mono,
    /// Two channels (stereo: left, right)
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Sample Buffer
// ============================================================================

/// Core sample buffer type for all clip editing in Clipforge
///
/// Stores audio as non-interleaved fixed-point samples. Each channel is a
/// separate `Vec<i32>`, and every stored value lies inside
/// `[sample_min, sample_max]`.
///
/// The sample rate and range travel with the buffer: two buffers produced
/// under different configurations can never be silently mismatched through
/// an ambient global.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Sample data: outer Vec is channels, inner Vec is frames
    pub samples: Vec<Vec<i32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Smallest representable sample value
    pub sample_min: i32,
    /// Largest representable sample value
    pub sample_max: i32,
}

impl SampleBuffer {
    /// Create a silent buffer with the given frame count and layout
    ///
    /// All samples are initialized to 0. Uses the default symmetric
    /// 16-bit sample range.
    pub fn silence(frames: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        let samples = vec![vec![0_i32; frames]; layout.num_channels()];
        Self {
            samples,
            sample_rate,
            sample_min: SAMPLE_MIN,
            sample_max: SAMPLE_MAX,
        }
    }

    /// Create a buffer from per-channel sample data
    ///
    /// # Errors
    /// * `InvalidParameter` - if there are no channels, the channels have
    ///   differing lengths, or the sample rate is zero
    pub fn from_channels(samples: Vec<Vec<i32>>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(ForgeError::InvalidParameter {
                param: "channels".to_string(),
                value: "0".to_string(),
                expected: "at least one channel".to_string(),
            });
        }
        if sample_rate == 0 {
            return Err(ForgeError::InvalidParameter {
                param: "sample_rate".to_string(),
                value: "0".to_string(),
                expected: "a positive rate in Hz".to_string(),
            });
        }
        let frames = samples[0].len();
        if samples.iter().any(|ch| ch.len() != frames) {
            return Err(ForgeError::InvalidParameter {
                param: "samples".to_string(),
                value: "ragged channel lengths".to_string(),
                expected: "equal frame count in every channel".to_string(),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            sample_min: SAMPLE_MIN,
            sample_max: SAMPLE_MAX,
        })
    }

    /// Create a buffer from interleaved sample data (L, R, L, R, ... for stereo)
    pub fn from_interleaved(
        interleaved: &[i32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();
        if interleaved.len() % num_channels != 0 {
            return Err(ForgeError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
            sample_min: SAMPLE_MIN,
            sample_max: SAMPLE_MAX,
        })
    }

    /// Convert the buffer to interleaved order (L, R, L, R, ... for stereo)
    pub fn to_interleaved(&self) -> Vec<i32> {
        let mut interleaved = Vec::with_capacity(self.channels() * self.frames());
        for frame in 0..self.frames() {
            for channel in &self.samples {
                interleaved.push(channel[frame]);
            }
        }
        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of frames (time samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[i32] {
        &self.samples[index]
    }

    /// Get mutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [i32] {
        &mut self.samples[index]
    }

    /// Saturate a promoted-width value into this buffer's sample range
    #[inline]
    fn clip(&self, value: i64) -> i32 {
        value.clamp(self.sample_min as i64, self.sample_max as i64) as i32
    }

    /// Check that every stored sample lies inside the buffer's range
    pub fn in_range(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|&s| s >= self.sample_min && s <= self.sample_max)
    }

    /// Build an empty output buffer sharing this buffer's format metadata
    fn derived(&self, frames: usize) -> SampleBuffer {
        SampleBuffer {
            samples: vec![vec![0_i32; frames]; self.channels()],
            sample_rate: self.sample_rate,
            sample_min: self.sample_min,
            sample_max: self.sample_max,
        }
    }

    // ------------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------------

    /// Apply a gain in decibels, saturating out-of-range results
    ///
    /// `db` of exactly 0 (within epsilon) is a true no-op: the samples are
    /// copied without being multiplied, so repeated neutral applications
    /// cannot accumulate rounding drift.
    pub fn apply_gain(&self, db: f32) -> SampleBuffer {
        if db.abs() < PARAM_EPSILON {
            return self.clone();
        }

        let factor = db_to_linear(db);
        let mut out = self.clone();
        for channel in &mut out.samples {
            for sample in channel.iter_mut() {
                let scaled = (*sample as f64 * factor).round() as i64;
                *sample = self.clip(scaled);
            }
        }
        out
    }

    /// Resample at a constant rate, changing pitch and duration together
    ///
    /// Nearest-neighbor resampling: destination frame `i` reads source frame
    /// `floor(i * multiplier)`. The result has `ceil(frames / multiplier)`
    /// frames; destinations whose source index falls past the end stay zero.
    /// Aliasing and staircase artifacts are inherent to this method and are
    /// reproduced as-is.
    ///
    /// # Errors
    /// * `InvalidParameter` - if `multiplier` is not strictly positive
    pub fn change_frequency(&self, multiplier: f32) -> Result<SampleBuffer> {
        if multiplier <= 0.0 {
            return Err(ForgeError::InvalidParameter {
                param: "multiplier".to_string(),
                value: multiplier.to_string(),
                expected: "> 0".to_string(),
            });
        }
        if (multiplier - 1.0).abs() < PARAM_EPSILON {
            return Ok(self.clone());
        }

        let old_frames = self.frames();
        let new_frames = (old_frames as f64 / multiplier as f64).ceil() as usize;
        let mut out = self.derived(new_frames);

        for i in 0..new_frames {
            let src = (i as f64 * multiplier as f64).floor() as usize;
            if src >= old_frames {
                // Past the end of the source: leave the zero fill in place
                continue;
            }
            for (ch, channel) in self.samples.iter().enumerate() {
                out.samples[ch][i] = channel[src];
            }
        }

        Ok(out)
    }

    /// Resample with a multiplier that drifts over time
    ///
    /// The effective multiplier at destination frame `i` is
    /// `base + (i / sample_rate) * shift_per_second`, and the source frame
    /// read is `floor(i * effective(i))`. The output length uses the
    /// constant-rate formula with the effective multiplier evaluated at the
    /// source's last frame. A source index that lands outside the source
    /// truncates the output at that point rather than clamping to the edge.
    ///
    /// # Errors
    /// * `InvalidParameter` - if `base` is not strictly positive, or the
    ///   sweep reaches a non-positive multiplier by the end of the buffer
    pub fn change_frequency_shifting(
        &self,
        base: f32,
        shift_per_second: f32,
    ) -> Result<SampleBuffer> {
        if base <= 0.0 {
            return Err(ForgeError::InvalidParameter {
                param: "base".to_string(),
                value: base.to_string(),
                expected: "> 0".to_string(),
            });
        }

        let old_frames = self.frames();
        let rate = self.sample_rate as f64;
        let last = old_frames.saturating_sub(1) as f64;
        let end_multiplier = base as f64 + (last / rate) * shift_per_second as f64;
        if end_multiplier <= 0.0 {
            return Err(ForgeError::InvalidParameter {
                param: "shift_per_second".to_string(),
                value: shift_per_second.to_string(),
                expected: "a sweep that stays above zero for the clip length".to_string(),
            });
        }

        let new_frames = (old_frames as f64 / end_multiplier).ceil() as usize;
        let mut out = self.derived(new_frames);

        let mut produced = new_frames;
        for i in 0..new_frames {
            let effective = base as f64 + (i as f64 / rate) * shift_per_second as f64;
            let src = (i as f64 * effective).floor();
            if src < 0.0 || src as usize >= old_frames {
                produced = i;
                break;
            }
            let src = src as usize;
            for (ch, channel) in self.samples.iter().enumerate() {
                out.samples[ch][i] = channel[src];
            }
        }

        if produced < new_frames {
            for channel in &mut out.samples {
                channel.truncate(produced);
            }
        }

        Ok(out)
    }

    /// Mix another buffer into this one, growing the result as needed
    ///
    /// All three time values are converted to frames using this buffer's
    /// sample rate. `length_secs` of `None` (or a negative value) means the
    /// rest of the source from `source_start_secs`; an explicit length is
    /// clamped so it never runs past the source's end. The result is
    /// zero-extended first when the mixed region would overrun it, so mixing
    /// is never lossy due to insufficient target length.
    ///
    /// Only the minimum of the two channel counts participates per frame: a
    /// mono source mixed into a stereo target lands in the first channel
    /// only. Additions happen on promoted-width integers and saturate into
    /// the target's sample range.
    pub fn mix(
        &self,
        source: &SampleBuffer,
        target_start_secs: f32,
        source_start_secs: f32,
        length_secs: Option<f32>,
    ) -> SampleBuffer {
        let rate = self.sample_rate as f64;
        // Round, don't truncate: times built as frames/rate must convert
        // back to the same frame count.
        let target_start = (target_start_secs.max(0.0) as f64 * rate).round() as usize;
        let source_start = (source_start_secs.max(0.0) as f64 * rate).round() as usize;

        let available = source.frames().saturating_sub(source_start);
        let frames = match length_secs {
            Some(len) if len >= 0.0 => ((len as f64 * rate).round() as usize).min(available),
            _ => available,
        };

        let mut out = self.clone();
        let needed = target_start + frames;
        if out.frames() < needed {
            for channel in &mut out.samples {
                channel.resize(needed, 0);
            }
        }

        let channels = out.channels().min(source.channels());
        for frame in 0..frames {
            for ch in 0..channels {
                let sum = out.samples[ch][target_start + frame] as i64
                    + source.samples[ch][source_start + frame] as i64;
                out.samples[ch][target_start + frame] = out.clip(sum);
            }
        }

        out
    }

    /// Add delayed, progressively attenuated echoes
    ///
    /// Echo `k` (0-based) is the pre-echo buffer gained by
    /// `db_change_per_echo * (k + 1)` and mixed in at
    /// `delay_secs * (k + 1)`. Every copy is taken from the snapshot the
    /// buffer had before any echo was added; echoes never compound onto
    /// prior echoes.
    pub fn add_echo(&self, delay_secs: f32, db_change_per_echo: f32, echo_count: u32) -> SampleBuffer {
        let mut out = self.clone();
        for k in 1..=echo_count {
            let copy = self.apply_gain(db_change_per_echo * k as f32);
            out = out.mix(&copy, delay_secs * k as f32, 0.0, None);
        }
        out
    }

    /// Gate the buffer into alternating on/off windows ("plops")
    ///
    /// Window length is `sample_rate / plops_per_second / 2` frames; every
    /// second window is zeroed across all channels. A rate at or below
    /// epsilon is a no-op, never a division by zero.
    pub fn add_plopper(&self, plops_per_second: f32) -> SampleBuffer {
        if plops_per_second <= PARAM_EPSILON {
            return self.clone();
        }

        let window = ((self.sample_rate as f64 / plops_per_second as f64 / 2.0) as usize).max(1);
        let mut out = self.clone();
        for channel in &mut out.samples {
            for (i, sample) in channel.iter_mut().enumerate() {
                if (i / window) % 2 == 1 {
                    *sample = 0;
                }
            }
        }
        out
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::silence(0, ChannelLayout::Mono, DEFAULT_SAMPLE_RATE)
    }
}

// ============================================================================
// Tests
// ============================================================================
