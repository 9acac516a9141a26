// src/plan/command_line.rs

//! Rendering a [`ProcessSpec`] into a program and argument vector.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{LaunchError, Result};
use crate::params::ParameterSet;
use crate::plan::{LaunchTarget, ProcessSpec};

/// Fully rendered invocation of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

/// Names referenced as `{name}` in `arg`.
fn placeholders(arg: &str) -> impl Iterator<Item = &str> {
    placeholder_re()
        .captures_iter(arg)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Every distinct placeholder in `args` that `params` does not define, in
/// first-use order.
fn unresolved<'a>(args: &'a [String], params: &ParameterSet) -> Vec<&'a str> {
    let mut missing = Vec::new();
    for name in args.iter().flat_map(|a| placeholders(a)) {
        if !params.contains(name) && !missing.contains(&name) {
            missing.push(name);
        }
    }
    missing
}

fn substitute(arg: &str, params: &ParameterSet) -> String {
    placeholder_re()
        .replace_all(arg, |caps: &regex::Captures<'_>| {
            params
                .get(&caps[1])
                .map(ToString::to_string)
                .unwrap_or_default()
        })
        .into_owned()
}

impl CommandLine {
    /// Render `spec`.
    ///
    /// ROS nodes receive every parameter as `-p name:=value`, in parameter-set
    /// order. Plain commands receive their static args with placeholders
    /// filled in.
    pub fn render(spec: &ProcessSpec) -> Result<Self> {
        match spec.target() {
            LaunchTarget::Node {
                package,
                executable,
            } => {
                let mut args = vec!["run".to_string(), package.clone(), executable.clone()];
                if !spec.parameters().is_empty() {
                    args.push("--ros-args".to_string());
                    for (name, value) in spec.parameters().iter() {
                        args.push("-p".to_string());
                        args.push(format!("{name}:={value}"));
                    }
                }
                Ok(Self {
                    program: "ros2".to_string(),
                    args,
                })
            }
            LaunchTarget::Command { program, args } => {
                let missing = unresolved(args, spec.parameters());
                if !missing.is_empty() {
                    return Err(LaunchError::invalid(format!(
                        "{} arguments reference unknown parameters: {}",
                        spec.role(),
                        missing.join(", ")
                    )));
                }
                let args = args.iter().map(|a| substitute(a, spec.parameters())).collect();
                Ok(Self {
                    program: program.clone(),
                    args,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSetBuilder;
    use crate::types::OutputMode;

    #[test]
    fn node_parameters_render_as_ros_args() {
        let params = ParameterSetBuilder::new()
            .set("sam_not_cv", 1i64)
            .set("marker_length", 0.1627)
            .set("use_sim_time", false)
            .build()
            .unwrap();
        let spec = ProcessSpec::new(
            "localizer".into(),
            LaunchTarget::Node {
                package: "fiducial_vlam".into(),
                executable: "vloc_node".into(),
            },
            params,
            OutputMode::Screen,
        );

        let cmd = CommandLine::render(&spec).unwrap();
        assert_eq!(
            cmd.to_string(),
            "ros2 run fiducial_vlam vloc_node --ros-args -p sam_not_cv:=1 -p marker_length:=0.1627 -p use_sim_time:=false"
        );
    }

    #[test]
    fn command_placeholders_are_substituted() {
        let params = ParameterSetBuilder::new()
            .set("rviz_config", "/cfg/vlam.rviz")
            .build()
            .unwrap();
        let spec = ProcessSpec::new(
            "visualizer".into(),
            LaunchTarget::Command {
                program: "rviz2".into(),
                args: vec!["-d".into(), "{rviz_config}".into()],
            },
            params,
            OutputMode::Screen,
        );

        let cmd = CommandLine::render(&spec).unwrap();
        assert_eq!(cmd.program, "rviz2");
        assert_eq!(cmd.args, vec!["-d", "/cfg/vlam.rviz"]);
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let spec = ProcessSpec::new(
            "visualizer".into(),
            LaunchTarget::Command {
                program: "rviz2".into(),
                args: vec!["-d".into(), "{nope}".into()],
            },
            ParameterSet::empty(),
            OutputMode::Screen,
        );
        assert!(matches!(
            CommandLine::render(&spec),
            Err(LaunchError::InvalidConfiguration(msg)) if msg.contains("nope")
        ));
    }

    #[test]
    fn every_unknown_placeholder_is_reported() {
        let params = ParameterSetBuilder::new()
            .set("known", 1i64)
            .build()
            .unwrap();
        let spec = ProcessSpec::new(
            "recorder".into(),
            LaunchTarget::Command {
                program: "ros2".into(),
                args: vec![
                    "bag".into(),
                    "--out={dir}/{known}".into(),
                    "--topics={topics}".into(),
                    "{dir}".into(),
                ],
            },
            params,
            OutputMode::Screen,
        );
        let err = CommandLine::render(&spec).unwrap_err();
        assert!(matches!(
            err,
            LaunchError::InvalidConfiguration(msg)
                if msg.contains("recorder") && msg.ends_with("dir, topics")
        ));
    }

    #[test]
    fn placeholders_lists_names() {
        assert_eq!(
            placeholders("--a={x}/{y_2}").collect::<Vec<_>>(),
            vec!["x", "y_2"]
        );
    }
}
