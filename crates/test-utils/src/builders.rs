#![allow(dead_code)]

use std::time::Duration;

use vlam_launch::config::{LaunchConfig, ProcessOverride, RawLaunchConfig};
use vlam_launch::params::{ParameterSet, ParameterValue};
use vlam_launch::plan::{LaunchPlan, LaunchTarget, ProcessSpec};
use vlam_launch::types::{Algorithm, OutputMode};

/// Builder for `LaunchConfig` to simplify test setup.
///
/// Starts from the built-in defaults; `build()` runs full validation.
pub struct LaunchConfigBuilder {
    config: RawLaunchConfig,
}

impl LaunchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawLaunchConfig::default(),
        }
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.shared.algorithm = algorithm;
        self
    }

    pub fn map_path(mut self, path: &str) -> Self {
        self.config.shared.map_path = path.to_string();
        self
    }

    pub fn make_map(mut self, make_map: bool) -> Self {
        self.config.shared.make_map = make_map;
        self
    }

    pub fn marker_length(mut self, len: f64) -> Self {
        self.config.shared.marker_length = len;
        self
    }

    pub fn corner_measurement_sigma(mut self, sigma: f64) -> Self {
        self.config.shared.corner_measurement_sigma = sigma;
        self
    }

    pub fn grace_period(mut self, grace: &str) -> Self {
        self.config.supervisor.grace_period = grace.to_string();
        self
    }

    pub fn startup_window(mut self, window: &str) -> Self {
        self.config.supervisor.startup_window = window.to_string();
        self
    }

    pub fn with_override(mut self, role: &str, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.config
            .overrides
            .entry(role.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }

    /// Replace the role's target with a plain command.
    pub fn with_command(mut self, role: &str, program: &str, args: &[&str]) -> Self {
        self.config.process.insert(
            role.to_string(),
            ProcessOverride {
                program: Some(program.to_string()),
                args: Some(args.iter().map(|a| a.to_string()).collect()),
                ..ProcessOverride::default()
            },
        );
        self
    }

    pub fn build(self) -> LaunchConfig {
        LaunchConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for LaunchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A spec that runs `program` directly, with no parameters.
pub fn command_spec(role: &str, program: &str) -> ProcessSpec {
    ProcessSpec::new(
        role.to_string(),
        LaunchTarget::Command {
            program: program.to_string(),
            args: vec![],
        },
        ParameterSet::empty(),
        OutputMode::Screen,
    )
}

/// A plan of parameterless command specs, one per role.
pub fn plan_for(roles: &[&str]) -> LaunchPlan {
    LaunchPlan::from_specs(
        roles
            .iter()
            .map(|r| command_spec(r, &format!("/opt/fake/{r}")))
            .collect(),
    )
}

pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
