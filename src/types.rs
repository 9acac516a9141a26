// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Canonical role name type used throughout the crate (e.g. `"driver"`).
pub type RoleName = String;

/// Roles of the stock pipeline, in their declared start order.
pub mod roles {
    pub const VISUALIZER: &str = "visualizer";
    pub const DRIVER: &str = "driver";
    pub const LOCALIZER: &str = "localizer";
    pub const MAPPER: &str = "mapper";

    pub const ALL: [&str; 4] = [VISUALIZER, DRIVER, LOCALIZER, MAPPER];
}

/// Which estimation backend the perception nodes run.
///
/// - `Legacy`: the OpenCV solver (`sam_not_cv = 0`).
/// - `Alternate`: the smoothing-and-mapping solver (`sam_not_cv = 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Legacy,
    #[default]
    Alternate,
}

impl Algorithm {
    /// Integer flag the nodes declare for algorithm selection.
    pub fn sam_not_cv(self) -> i64 {
        match self {
            Algorithm::Legacy => 0,
            Algorithm::Alternate => 1,
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Algorithm::Legacy),
            "alternate" => Ok(Algorithm::Alternate),
            other => Err(format!(
                "invalid algorithm: {other} (expected \"legacy\" or \"alternate\")"
            )),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Legacy => f.write_str("legacy"),
            Algorithm::Alternate => f.write_str("alternate"),
        }
    }
}

/// Where a process's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Inherit the launcher's console.
    #[default]
    Screen,
    /// Pipe into the launcher and re-emit each line as a `tracing` event.
    Captured,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Screen => f.write_str("screen"),
            OutputMode::Captured => f.write_str("captured"),
        }
    }
}

/// Parse a simple duration string like `"5s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
