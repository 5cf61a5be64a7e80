//! Clipforge CLI - Buffered Audio Clip Editor
//!
//! Command-line interface for the Clipforge effect engine.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use clipforge::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Clipforge v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd).context("command failed"),
        None => {
            println!("Clipforge v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> clipforge::Result<()> {
    match cmd {
        Commands::Render {
            output,
            input,
            params,
            gain_db,
            freq,
            freq_shift,
            echo_count,
            echo_delay,
            echo_gain,
            plop_rate,
        } => commands::render(
            &output,
            input.as_deref(),
            params.as_deref(),
            gain_db,
            freq,
            freq_shift,
            echo_count,
            echo_delay,
            echo_gain,
            plop_rate,
        ),
        Commands::Sine {
            output,
            freq,
            duration,
            sample_rate,
        } => commands::sine(&output, freq, duration, sample_rate),
        Commands::Info { path } => commands::show_info(&path),
    }
}
