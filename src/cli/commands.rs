//! CLI command handlers

use std::fs;
use std::path::Path;

use log::info;

use crate::dsp::{EffectParams, EffectPipeline};
use crate::engine::buffer::DEFAULT_SAMPLE_RATE;
use crate::engine::io::{load_or_silence, load_wav, save_wav, sine_wave};
use crate::error::Result;

/// Render a clip through the effect pipeline and save it
#[allow(clippy::too_many_arguments)]
pub fn render(
    output: &Path,
    input: Option<&Path>,
    preset: Option<&Path>,
    gain_db: Option<f32>,
    freq: Option<f32>,
    freq_shift: Option<f32>,
    echo_count: Option<u32>,
    echo_delay: Option<f32>,
    echo_gain: Option<f32>,
    plop_rate: Option<f32>,
) -> Result<()> {
    let base = match input {
        Some(path) => {
            let buffer = load_or_silence(path);
            info!(
                "loaded {}: {} frames, {} channel(s) at {} Hz",
                path.display(),
                buffer.frames(),
                buffer.channels(),
                buffer.sample_rate
            );
            buffer
        }
        None => {
            info!("no input given, synthesizing a 1s 440 Hz tone");
            sine_wave(440.0, 1.0, DEFAULT_SAMPLE_RATE)
        }
    };

    let mut params = match preset {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<EffectParams>(&text)?
        }
        None => EffectParams::default(),
    };

    // Flags override preset values field by field
    if let Some(v) = gain_db {
        params.gain_db = v;
    }
    if let Some(v) = freq {
        params.freq_multiplier = v;
    }
    if let Some(v) = freq_shift {
        params.freq_shift_rate = v;
    }
    if let Some(v) = echo_count {
        params.echo_count = v;
    }
    if let Some(v) = echo_delay {
        params.echo_delay_secs = v;
    }
    if let Some(v) = echo_gain {
        params.echo_attenuation_db = v;
    }
    if let Some(v) = plop_rate {
        params.plop_rate = v;
    }

    let mut pipeline = EffectPipeline::new(base);
    pipeline.set_params(params);
    pipeline.save(output)?;

    let edit = pipeline.edit_buffer()?;
    info!(
        "wrote {}: {} frames ({:.3}s)",
        output.display(),
        edit.frames(),
        edit.duration_secs()
    );
    Ok(())
}

/// Write a sine test tone to a WAV file
pub fn sine(output: &Path, freq: f32, duration: f32, sample_rate: u32) -> Result<()> {
    let buffer = sine_wave(freq, duration, sample_rate);
    save_wav(&buffer, output)?;
    info!(
        "wrote {}: {:.1} Hz tone, {} frames",
        output.display(),
        freq,
        buffer.frames()
    );
    Ok(())
}

/// Print format metadata for a WAV file
pub fn show_info(path: &Path) -> Result<()> {
    let buffer = load_wav(path)?;
    println!("file:        {}", path.display());
    println!("channels:    {}", buffer.channels());
    println!("sample rate: {} Hz", buffer.sample_rate);
    println!("frames:      {}", buffer.frames());
    println!("duration:    {:.3}s", buffer.duration_secs());
    println!(
        "range:       [{}, {}]",
        buffer.sample_min, buffer.sample_max
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render_default_tone() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.wav");

        render(
            &output,
            None,
            None,
            Some(-6.0),
            Some(2.0),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();

        let rendered = load_wav(&output).unwrap();
        // 1s at 22050 Hz halved by the frequency doubling
        assert_eq!(rendered.frames(), 11025);
    }

    #[test]
    fn test_render_with_preset_file() {
        let dir = tempdir().unwrap();
        let preset = dir.path().join("preset.json");
        let output = dir.path().join("out.wav");

        fs::write(&preset, r#"{"freq_multiplier": 0.5}"#).unwrap();
        render(
            &output, None, Some(&preset), None, None, None, None, None, None, None,
        )
        .unwrap();

        let rendered = load_wav(&output).unwrap();
        assert_eq!(rendered.frames(), 44100);
    }

    #[test]
    fn test_sine_command() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("tone.wav");

        sine(&output, 880.0, 0.25, 44100).unwrap();
        let tone = load_wav(&output).unwrap();
        assert_eq!(tone.sample_rate, 44100);
        assert_eq!(tone.frames(), 11025);
    }
}
