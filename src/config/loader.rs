// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::Result;

/// Parse a config file without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLaunchConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&contents)?)
}

pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LaunchConfig> {
    LaunchConfig::try_from(load_from_path(path)?)
}

/// Build the effective configuration for a CLI invocation.
///
/// - Reads `--config` if given, otherwise starts from the built-in defaults.
/// - Applies CLI overrides on top of the file values.
/// - Validates the result.
pub fn load_for_cli(args: &CliArgs) -> Result<LaunchConfig> {
    let mut raw = match args.config.as_deref() {
        Some(path) => {
            debug!(path, "loading launch config");
            load_from_path(path)?
        }
        None => {
            debug!("no --config given; using built-in defaults");
            RawLaunchConfig::default()
        }
    };

    apply_cli_overrides(&mut raw, args);
    LaunchConfig::try_from(raw)
}

fn apply_cli_overrides(raw: &mut RawLaunchConfig, args: &CliArgs) {
    if let Some(algorithm) = args.algorithm {
        raw.shared.algorithm = algorithm;
    }
    if let Some(ref map_path) = args.map_path {
        raw.shared.map_path = map_path.clone();
    }
    if let Some(make_map) = args.make_map {
        raw.shared.make_map = make_map;
    }
    if let Some(marker_length) = args.marker_length {
        raw.shared.marker_length = marker_length;
    }
    if let Some(ref grace) = args.grace_period {
        raw.supervisor.grace_period = grace.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Algorithm;

    #[test]
    fn cli_values_win_over_defaults() {
        let args = CliArgs {
            algorithm: Some(Algorithm::Legacy),
            map_path: Some("/tmp/m.yaml".into()),
            grace_period: Some("2s".into()),
            ..CliArgs::default()
        };
        let cfg = load_for_cli(&args).unwrap();
        assert_eq!(cfg.shared.algorithm, Algorithm::Legacy);
        assert_eq!(cfg.shared.map_path, "/tmp/m.yaml");
        assert_eq!(cfg.supervisor.grace_period.as_secs(), 2);
    }

    #[test]
    fn invalid_cli_marker_length_fails_validation() {
        let args = CliArgs {
            marker_length: Some(0.0),
            ..CliArgs::default()
        };
        assert!(load_for_cli(&args).is_err());
    }
}
