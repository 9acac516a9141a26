// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::Algorithm;

/// Command-line arguments for `vlam-launch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "vlam-launch",
    version,
    about = "Launch and supervise the fiducial VLAM pipeline (visualizer, driver, localizer, mapper).",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the launch config file (TOML).
    ///
    /// If omitted, the built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Estimation backend for the localizer and mapper.
    #[arg(long, value_parser = parse_algorithm, value_name = "legacy|alternate")]
    pub algorithm: Option<Algorithm>,

    /// Map file used both for loading and saving.
    #[arg(long, value_name = "PATH")]
    pub map_path: Option<String>,

    /// Build a new map instead of localizing against the existing one.
    #[arg(long, value_name = "BOOL")]
    pub make_map: Option<bool>,

    /// Physical marker side length in metres.
    #[arg(long, value_name = "METRES")]
    pub marker_length: Option<f64>,

    /// How long to wait for graceful shutdown before killing (e.g. "5s").
    #[arg(long, value_name = "DURATION")]
    pub grace_period: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VLAM_LAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the launch plan, but don't start any process.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    s.parse()
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
