//! Effect parameter set
//!
//! One strongly-typed struct replaces the loose per-slider state of a UI:
//! every field has a defined neutral value, and neutrality is always tested
//! through an epsilon, never by exact float comparison.

use serde::{Deserialize, Serialize};

use crate::engine::buffer::PARAM_EPSILON;
use crate::error::{ForgeError, Result};

/// Parameters for the effect pipeline
///
/// Defaults are all-neutral: resolving a pipeline with default parameters
/// reproduces the base buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    /// Gain offset in decibels (0 = no change)
    pub gain_db: f32,
    /// Frequency multiplier (> 0; 1 = no change; < 1 stretches the clip)
    pub freq_multiplier: f32,
    /// Per-second increment applied to the multiplier over the clip (0 = constant)
    pub freq_shift_rate: f32,
    /// Delay between echoes in seconds
    pub echo_delay_secs: f32,
    /// Number of echoes (0 disables)
    pub echo_count: u32,
    /// Gain applied cumulatively per echo, in decibels
    pub echo_attenuation_db: f32,
    /// Stutter-gate rate in plops per second (0 disables)
    pub plop_rate: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            gain_db: 0.0,
            freq_multiplier: 1.0,
            freq_shift_rate: 0.0,
            echo_delay_secs: 0.3,
            echo_count: 0,
            echo_attenuation_db: -4.0,
            plop_rate: 0.0,
        }
    }
}

impl EffectParams {
    /// Validate parameters are within their legal ranges
    pub fn validate(&self) -> Result<()> {
        if self.freq_multiplier <= 0.0 {
            return Err(ForgeError::InvalidParameter {
                param: "freq_multiplier".to_string(),
                value: self.freq_multiplier.to_string(),
                expected: "> 0".to_string(),
            });
        }
        if self.echo_delay_secs < 0.0 {
            return Err(ForgeError::InvalidParameter {
                param: "echo_delay_secs".to_string(),
                value: self.echo_delay_secs.to_string(),
                expected: ">= 0".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the gain stage would change any sample
    pub fn has_gain(&self) -> bool {
        self.gain_db.abs() >= PARAM_EPSILON
    }

    /// Whether the resample stage runs with a constant multiplier
    pub fn is_constant_rate(&self) -> bool {
        self.freq_shift_rate.abs() < PARAM_EPSILON
    }

    /// Whether the constant-rate resample would change anything
    pub fn has_frequency_change(&self) -> bool {
        (self.freq_multiplier - 1.0).abs() >= PARAM_EPSILON
    }
}
