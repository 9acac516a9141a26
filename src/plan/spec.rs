// src/plan/spec.rs

use std::fmt;

use crate::params::ParameterSet;
use crate::types::{OutputMode, RoleName};

/// What to execute for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// A ROS node, started as `ros2 run <package> <executable> --ros-args ...`.
    Node { package: String, executable: String },
    /// A plain program. `{name}` inside an argument is replaced by the
    /// string form of parameter `name`.
    Command { program: String, args: Vec<String> },
}

impl fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchTarget::Node {
                package,
                executable,
            } => write!(f, "{package}/{executable}"),
            LaunchTarget::Command { program, .. } => f.write_str(program),
        }
    }
}

/// Immutable descriptor of one launchable process.
///
/// Fields are private, so a spec cannot change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSpec {
    role: RoleName,
    target: LaunchTarget,
    parameters: ParameterSet,
    output: OutputMode,
}

impl ProcessSpec {
    pub fn new(
        role: RoleName,
        target: LaunchTarget,
        parameters: ParameterSet,
        output: OutputMode,
    ) -> Self {
        Self {
            role,
            target,
            parameters,
            output,
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn target(&self) -> &LaunchTarget {
        &self.target
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }
}
