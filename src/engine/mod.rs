//! Sample Engine Module
//!
//! Core clip editing engine:
//! - Sample buffer and its transforms
//! - WAV encode/decode and tone synthesis

pub mod buffer;
pub mod io;

pub use buffer::{ChannelLayout, SampleBuffer, DEFAULT_SAMPLE_RATE, SAMPLE_MAX, SAMPLE_MIN};
pub use io::{load_or_silence, load_wav, save_wav, sine_wave};
