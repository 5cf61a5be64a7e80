//! Effect Pipeline
//!
//! Owns the untouched base buffer and a parameter set, and derives the edit
//! buffer on demand. A dirty flag gates recomputation: every setter
//! invalidates unconditionally, and `resolve` re-runs the whole chain from
//! the base exactly once per change.
//!
//! Effects apply in a fixed order chosen to minimize clipping: gain first
//! (normalize volume before anything that can introduce new peaks), then
//! resampling, then the stutter gate, then echoes (which sum peaks).

use std::path::Path;

use log::debug;

use crate::engine::buffer::SampleBuffer;
use crate::engine::io::save_wav;
use crate::error::Result;

use super::params::EffectParams;

/// Lazy effect pipeline over one base buffer
///
/// The base buffer is never mutated; the edit buffer is entirely derived
/// and only readable through accessors that resolve first.
#[derive(Debug, Clone)]
pub struct EffectPipeline {
    /// Untouched source audio
    base: SampleBuffer,
    /// Derived output; stale whenever `valid` is false
    edit: SampleBuffer,
    /// Current effect parameters
    params: EffectParams,
    /// Dirty flag: true only when `edit` reflects `base` under `params`
    valid: bool,
}

impl EffectPipeline {
    /// Create a pipeline around a base buffer
    ///
    /// The pipeline starts invalid; the first resolve derives the edit buffer.
    pub fn new(base: SampleBuffer) -> Self {
        Self {
            base,
            edit: SampleBuffer::default(),
            params: EffectParams::default(),
            valid: false,
        }
    }

    /// Replace the base buffer with newly loaded or synthesized audio
    pub fn set_base(&mut self, base: SampleBuffer) {
        self.base = base;
        self.valid = false;
    }

    /// Get the untouched base buffer
    pub fn base(&self) -> &SampleBuffer {
        &self.base
    }

    /// Get the current parameters
    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    /// Replace the whole parameter set (e.g. from a preset file)
    pub fn set_params(&mut self, params: EffectParams) {
        self.params = params;
        self.valid = false;
    }

    /// Whether the edit buffer is up to date
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    // Setters invalidate unconditionally, even when the new value equals the
    // old one. Resolution is cheap enough that tracking equality isn't worth
    // the bookkeeping.

    /// Set the gain offset in decibels
    pub fn set_gain_db(&mut self, db: f32) {
        self.params.gain_db = db;
        self.valid = false;
    }

    /// Set the frequency multiplier
    pub fn set_freq_multiplier(&mut self, multiplier: f32) {
        self.params.freq_multiplier = multiplier;
        self.valid = false;
    }

    /// Set the per-second frequency shift rate
    pub fn set_freq_shift_rate(&mut self, rate: f32) {
        self.params.freq_shift_rate = rate;
        self.valid = false;
    }

    /// Set the delay between echoes in seconds
    pub fn set_echo_delay_secs(&mut self, secs: f32) {
        self.params.echo_delay_secs = secs;
        self.valid = false;
    }

    /// Set the number of echoes
    pub fn set_echo_count(&mut self, count: u32) {
        self.params.echo_count = count;
        self.valid = false;
    }

    /// Set the per-echo attenuation in decibels
    pub fn set_echo_attenuation_db(&mut self, db: f32) {
        self.params.echo_attenuation_db = db;
        self.valid = false;
    }

    /// Set the stutter-gate rate in plops per second
    pub fn set_plop_rate(&mut self, rate: f32) {
        self.params.plop_rate = rate;
        self.valid = false;
    }

    /// Ensure the edit buffer is up to date
    ///
    /// No-op when already valid. Otherwise recomputes the edit buffer from
    /// the base, applying gain, resampling (constant or shifting, chosen by
    /// the shift rate), the stutter gate, and echoes, in that order.
    ///
    /// # Errors
    /// * `InvalidParameter` - from the resample stage; the pipeline stays
    ///   invalid and the previous edit buffer is not replaced
    pub fn resolve(&mut self) -> Result<()> {
        if self.valid {
            return Ok(());
        }

        self.params.validate()?;
        debug!(
            "resolving pipeline: {} frames, params {:?}",
            self.base.frames(),
            self.params
        );

        let mut edit = self.base.clone();

        // Skip neutral gain entirely: multiplying by a rounded 1.0 would
        // still be a no-op, but skipping avoids any chance of drift.
        if self.params.has_gain() {
            edit = edit.apply_gain(self.params.gain_db);
        }

        if self.params.is_constant_rate() {
            if self.params.has_frequency_change() {
                edit = edit.change_frequency(self.params.freq_multiplier)?;
            }
        } else {
            edit = edit.change_frequency_shifting(
                self.params.freq_multiplier,
                self.params.freq_shift_rate,
            )?;
        }

        edit = edit.add_plopper(self.params.plop_rate);
        edit = edit.add_echo(
            self.params.echo_delay_secs,
            self.params.echo_attenuation_db,
            self.params.echo_count,
        );

        self.edit = edit;
        self.valid = true;
        Ok(())
    }

    /// Resolve and return the edit buffer
    ///
    /// This is the playback handoff point: callers get the sample matrix
    /// and format metadata, the engine performs no device I/O itself.
    pub fn edit_buffer(&mut self) -> Result<&SampleBuffer> {
        self.resolve()?;
        Ok(&self.edit)
    }

    /// Resolve and write the edit buffer to a WAV file
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.resolve()?;
        save_wav(&self.edit, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::{ChannelLayout, DEFAULT_SAMPLE_RATE};

    fn counting_buffer(frames: usize) -> SampleBuffer {
        SampleBuffer::from_channels(
            vec![(0..frames).map(|i| (i % 100) as i32 * 10).collect()],
            DEFAULT_SAMPLE_RATE,
        )
        .unwrap()
    }

    #[test]
    fn test_starts_invalid() {
        let pipeline = EffectPipeline::new(counting_buffer(100));
        assert!(!pipeline.is_valid());
    }

    #[test]
    fn test_neutral_params_reproduce_base() {
        let base = counting_buffer(500);
        let mut pipeline = EffectPipeline::new(base.clone());
        assert_eq!(pipeline.edit_buffer().unwrap(), &base);
    }

    #[test]
    fn test_setters_invalidate_even_for_equal_value() {
        let mut pipeline = EffectPipeline::new(counting_buffer(100));
        pipeline.resolve().unwrap();
        assert!(pipeline.is_valid());

        pipeline.set_gain_db(pipeline.params().gain_db);
        assert!(!pipeline.is_valid());
    }

    #[test]
    fn test_resolve_is_memoized() {
        let mut pipeline = EffectPipeline::new(counting_buffer(1000));
        pipeline.set_gain_db(-6.0);
        pipeline.resolve().unwrap();

        // A second resolve with no intervening change must not rebuild the
        // edit buffer: its sample storage stays at the same allocation.
        let before = pipeline.edit.samples[0].as_ptr();
        pipeline.resolve().unwrap();
        let after = pipeline.edit.samples[0].as_ptr();
        assert_eq!(before, after);
    }

    #[test]
    fn test_recompute_starts_from_base_not_edit() {
        let base = counting_buffer(1000);
        let mut pipeline = EffectPipeline::new(base.clone());

        pipeline.set_gain_db(-6.0);
        pipeline.resolve().unwrap();

        // Re-setting the same gain and resolving again must not attenuate
        // twice: the chain always reruns from the base buffer.
        pipeline.set_gain_db(-6.0);
        let twice = pipeline.edit_buffer().unwrap().clone();
        assert_eq!(twice, base.apply_gain(-6.0));

        // And returning the gain to neutral restores the base exactly.
        pipeline.set_gain_db(0.0);
        assert_eq!(pipeline.edit_buffer().unwrap(), &base);
    }

    #[test]
    fn test_base_replacement_invalidates() {
        let mut pipeline = EffectPipeline::new(counting_buffer(100));
        pipeline.resolve().unwrap();
        pipeline.set_base(counting_buffer(200));
        assert!(!pipeline.is_valid());
        assert_eq!(pipeline.edit_buffer().unwrap().frames(), 200);
    }

    #[test]
    fn test_invalid_multiplier_keeps_pipeline_invalid() {
        let mut pipeline = EffectPipeline::new(counting_buffer(100));
        pipeline.set_freq_multiplier(-1.0);
        assert!(pipeline.resolve().is_err());
        assert!(!pipeline.is_valid());

        // Fixing the parameter recovers
        pipeline.set_freq_multiplier(2.0);
        assert!(pipeline.resolve().is_ok());
        assert_eq!(pipeline.edit_buffer().unwrap().frames(), 50);
    }

    #[test]
    fn test_fixed_order_gain_before_resample() {
        // Chain order is observable through lengths: resample halves the
        // clip regardless of gain, and echoes extend it afterwards.
        let mut pipeline = EffectPipeline::new(counting_buffer(1000));
        pipeline.set_gain_db(-10.0);
        pipeline.set_freq_multiplier(2.0);
        pipeline.set_echo_count(1);
        pipeline.set_echo_delay_secs(100.0 / DEFAULT_SAMPLE_RATE as f32);

        let edit = pipeline.edit_buffer().unwrap();
        assert_eq!(edit.frames(), 100 + 500);
    }

    #[test]
    fn test_silence_pipeline_scenario() {
        // 1 second of mono silence through the full stack: gain and echoes
        // of silence stay silent, the half-rate resample and two echoes set
        // the final length.
        let rate = DEFAULT_SAMPLE_RATE;
        let base = SampleBuffer::silence(rate as usize, ChannelLayout::Mono, rate);
        let mut pipeline = EffectPipeline::new(base);
        pipeline.set_gain_db(-10.0);
        pipeline.set_freq_multiplier(0.5);
        pipeline.set_echo_count(2);
        pipeline.set_echo_delay_secs(0.3);
        pipeline.set_echo_attenuation_db(-4.0);

        let edit = pipeline.edit_buffer().unwrap();
        let expected_min = 2 * rate as usize + (0.3 * 2.0 * rate as f64) as usize;
        assert!(edit.frames() >= expected_min);
        assert!(edit.samples.iter().flatten().all(|&s| s == 0));
    }

    #[test]
    fn test_shifting_resample_selected_by_rate() {
        let mut pipeline = EffectPipeline::new(counting_buffer(200));
        pipeline.set_freq_multiplier(1.0);
        pipeline.set_freq_shift_rate(2.0);

        let direct = pipeline
            .base()
            .change_frequency_shifting(1.0, 2.0)
            .unwrap();
        assert_eq!(pipeline.edit_buffer().unwrap(), &direct);
    }
}
