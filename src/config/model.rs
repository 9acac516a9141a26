// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::params::{ParameterValue, SharedConfig};
use crate::plan::Catalogue;
use crate::types::{OutputMode, RoleName};

/// Per-role parameter overrides: `[overrides.<role>]` tables of scalars.
pub type Overrides = BTreeMap<RoleName, BTreeMap<String, ParameterValue>>;

/// Launch configuration as read from a TOML file.
///
/// ```toml
/// [shared]
/// algorithm = "alternate"
/// map_path = "/cfg/map.yaml"
/// make_map = false
/// marker_length = 0.1627
/// corner_measurement_sigma = 1.0
///
/// [driver]
/// drone_ip = "192.168.0.30"
///
/// [supervisor]
/// grace_period = "5s"
///
/// [overrides.localizer]
/// publish_image_marked = 0
/// ```
///
/// All sections are optional; the defaults reproduce the stock test launch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLaunchConfig {
    pub shared: SharedConfig,
    pub visualizer: VisualizerSettings,
    pub driver: DriverSettings,
    pub localizer: LocalizerSettings,
    pub mapper: MapperSettings,
    pub supervisor: SupervisorSection,
    /// Catalogue edits from `[process.<role>]`.
    pub process: BTreeMap<RoleName, ProcessOverride>,
    pub overrides: Overrides,
}

/// Validated configuration. Construct via `LaunchConfig::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub shared: SharedConfig,
    pub settings: ProcessSettings,
    pub overrides: Overrides,
    pub catalogue: Catalogue,
    pub supervisor: SupervisorOptions,
}

/// Role-specific settings that are not shared between processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessSettings {
    pub visualizer: VisualizerSettings,
    pub driver: DriverSettings,
    pub localizer: LocalizerSettings,
    pub mapper: MapperSettings,
}

/// `[visualizer]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    /// Display config handed to the visualizer with `-d`.
    pub rviz_config: String,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            rviz_config: "cfg/fiducial_vlam.rviz".to_string(),
        }
    }
}

/// `[driver]` section: where to reach the drone.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub drone_ip: String,
    pub drone_port: u16,
    pub command_port: u16,
    pub data_port: u16,
    pub video_port: u16,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            drone_ip: "192.168.0.30".to_string(),
            drone_port: 8889,
            command_port: 11002,
            data_port: 13002,
            video_port: 14002,
        }
    }
}

/// `[localizer]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalizerSettings {
    /// Stamp outgoing messages with the current time rather than the image time.
    pub stamp_msgs_with_current_time: bool,
    pub publish_tfs_per_marker: bool,
    pub publish_image_marked: bool,
    /// Initial z of the map frame, in metres.
    pub map_init_pose_z: f64,
}

impl Default for LocalizerSettings {
    fn default() -> Self {
        Self {
            stamp_msgs_with_current_time: true,
            publish_tfs_per_marker: false,
            publish_image_marked: true,
            map_init_pose_z: -0.035,
        }
    }
}

/// `[mapper]` section. Unset options are left to the node's own defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    pub publish_marker_visualizations: Option<bool>,
    pub marker_map_publish_frequency_hz: Option<f64>,
    /// 0: seed from a marker of the loaded map, 1: seed from `map_init_id`
    /// at the origin, 2: seed from the first observed marker.
    pub map_init_style: Option<i64>,
    pub map_init_id: Option<i64>,
}

/// `[supervisor]` section, durations as strings like `"5s"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorSection {
    pub grace_period: String,
    pub startup_window: String,
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            grace_period: "5s".to_string(),
            startup_window: "100ms".to_string(),
        }
    }
}

/// Parsed supervisor timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// How long graceful stop may take before processes are killed.
    pub grace_period: Duration,
    /// How long a fresh process must survive before it counts as running.
    pub startup_window: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(5),
            startup_window: Duration::from_millis(100),
        }
    }
}

/// `[process.<role>]` section: replace or add a catalogue entry.
///
/// Either `package` + `executable` (a ROS node) or `program` + `args` (a
/// plain command) may be given, not both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessOverride {
    pub package: Option<String>,
    pub executable: Option<String>,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub output: Option<OutputMode>,
}
