// src/params/shared.rs

use serde::Deserialize;

use crate::errors::{LaunchError, Result};
use crate::types::Algorithm;

/// Top-level knobs that feed more than one process.
///
/// This is the `[shared]` section of the launch config. It is built once and
/// then only read; every parameter derived from it is written by
/// [`ParameterResolver`](crate::params::ParameterResolver) from this single
/// value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SharedConfig {
    /// Estimation backend for localizer and mapper.
    pub algorithm: Algorithm,

    /// Map file, used for loading an existing map and saving the updated one.
    pub map_path: String,

    /// Build a new map (`true`) or localize against the existing one.
    pub make_map: bool,

    /// Physical marker side length in metres.
    pub marker_length: f64,

    /// Corner measurement standard deviation, in pixels.
    pub corner_measurement_sigma: f64,

    /// Follow `/clock` instead of wall time.
    pub use_sim_time: bool,

    /// Whether the perception nodes publish their transforms.
    pub publish_tfs: bool,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Alternate,
            map_path: "cfg/fiducial_marker_locations_test_sam.yaml".to_string(),
            make_map: false,
            marker_length: 0.1627,
            corner_measurement_sigma: 1.0,
            use_sim_time: false,
            publish_tfs: true,
        }
    }
}

impl SharedConfig {
    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        ensure_positive_finite("shared.marker_length", self.marker_length)?;
        ensure_positive_finite(
            "shared.corner_measurement_sigma",
            self.corner_measurement_sigma,
        )?;
        if self.map_path.trim().is_empty() {
            return Err(LaunchError::invalid("shared.map_path must be non-empty"));
        }
        Ok(())
    }
}

pub(crate) fn ensure_positive_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LaunchError::invalid(format!(
            "{field} must be a positive finite number (got {value})"
        )));
    }
    Ok(())
}
