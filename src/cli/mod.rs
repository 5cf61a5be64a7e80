//! CLI Module
//!
//! Command-line surface standing in for a GUI: it produces parameter values
//! and hands them to the pipeline.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clipforge - buffered audio clip editor
#[derive(Parser, Debug)]
#[command(name = "clipforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply an effect chain to a clip and write the result
    Render {
        /// Output WAV path
        output: PathBuf,

        /// Input WAV file; a 440 Hz test tone is synthesized when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON preset file with the full parameter set
        #[arg(long)]
        params: Option<PathBuf>,

        /// Gain offset in dB
        #[arg(long)]
        gain_db: Option<f32>,

        /// Frequency multiplier (> 0; < 1 stretches the clip)
        #[arg(long)]
        freq: Option<f32>,

        /// Frequency shift in multiplier units per second
        #[arg(long)]
        freq_shift: Option<f32>,

        /// Number of echoes
        #[arg(long)]
        echo_count: Option<u32>,

        /// Delay between echoes in seconds
        #[arg(long)]
        echo_delay: Option<f32>,

        /// Gain change per echo in dB
        #[arg(long)]
        echo_gain: Option<f32>,

        /// Stutter-gate rate in plops per second
        #[arg(long)]
        plop_rate: Option<f32>,
    },

    /// Write a full-scale sine test tone
    Sine {
        /// Output WAV path
        output: PathBuf,

        /// Tone frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        freq: f32,

        /// Duration in seconds
        #[arg(long, default_value_t = 1.0)]
        duration: f32,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 22050)]
        sample_rate: u32,
    },

    /// Print format metadata for a WAV file
    Info {
        /// Path to the WAV file
        path: PathBuf,
    },
}
