//! Clipforge - Buffered Audio Clip Editor
//!
//! Clipforge edits short, fully-buffered audio clips by applying a chain of
//! parametric effects (gain, resampling/pitch-shift, echo, stutter-gating)
//! to an in-memory multi-channel integer sample buffer, then persists the
//! result as uncompressed PCM WAV.
//!
//! # Architecture
//!
//! Two strictly layered components:
//! - [`engine::SampleBuffer`]: owned fixed-point sample matrix with pure
//!   buffer-to-buffer transforms
//! - [`dsp::EffectPipeline`]: owns one base buffer and a parameter set,
//!   derives the edit buffer lazily behind a dirty flag

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;

pub use error::{ForgeError, Result};
