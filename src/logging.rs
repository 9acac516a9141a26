// src/logging.rs

//! Global `tracing` subscriber for the launcher.
//!
//! The filter comes from `--log-level` when given. Otherwise
//! `VLAM_LAUNCH_LOG` is read as an `EnvFilter` directive string (for example
//! `info,vlam_launch::supervisor=debug`). With neither, the level is `info`.
//!
//! Output goes to stderr. Children launched with `screen` output share stdout.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

const ENV_VAR: &str = "VLAM_LAUNCH_LOG";

/// Install the subscriber. Fails on a malformed `VLAM_LAUNCH_LOG` or when
/// called twice.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(ENV_VAR).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(directive(level)));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(spec) => {
            EnvFilter::try_new(spec).with_context(|| format!("invalid {ENV_VAR} value '{spec}'"))
        }
        None => Ok(EnvFilter::new("info")),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
