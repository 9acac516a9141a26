// src/plan/catalogue.rs

//! Static identity of each role: what to run and where its output goes.

use tracing::debug;

use crate::config::model::ProcessOverride;
use crate::errors::{LaunchError, Result};
use crate::plan::LaunchTarget;
use crate::types::{roles, OutputMode, RoleName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueEntry {
    pub role: RoleName,
    pub target: LaunchTarget,
    pub output: OutputMode,
}

/// Ordered list of known roles. Order is the advisory start order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::fiducial_vlam()
    }
}

impl Catalogue {
    pub fn new(entries: Vec<CatalogueEntry>) -> Self {
        Self { entries }
    }

    /// The stock pipeline: visualizer, drone driver, localizer, mapper.
    pub fn fiducial_vlam() -> Self {
        let node = |package: &str, executable: &str| LaunchTarget::Node {
            package: package.to_string(),
            executable: executable.to_string(),
        };

        Self::new(vec![
            CatalogueEntry {
                role: roles::VISUALIZER.to_string(),
                target: LaunchTarget::Command {
                    program: "rviz2".to_string(),
                    args: vec!["-d".to_string(), "{rviz_config}".to_string()],
                },
                output: OutputMode::Screen,
            },
            CatalogueEntry {
                role: roles::DRIVER.to_string(),
                target: node("tello_driver", "tello_driver"),
                output: OutputMode::Screen,
            },
            CatalogueEntry {
                role: roles::LOCALIZER.to_string(),
                target: node("fiducial_vlam", "vloc_node"),
                output: OutputMode::Screen,
            },
            CatalogueEntry {
                role: roles::MAPPER.to_string(),
                target: node("fiducial_vlam", "vmap_node"),
                output: OutputMode::Screen,
            },
        ])
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    pub fn get(&self, role: &str) -> Option<&CatalogueEntry> {
        self.entries.iter().find(|e| e.role == role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.role.as_str())
    }

    /// Apply a `[process.<role>]` section.
    ///
    /// Known roles are edited in place; unknown roles are appended and must
    /// then give a complete target.
    pub fn apply_override(&mut self, role: &str, ov: &ProcessOverride) -> Result<()> {
        let is_node = ov.package.is_some() || ov.executable.is_some();
        let is_command = ov.program.is_some() || ov.args.is_some();
        if is_node && is_command {
            return Err(LaunchError::invalid(format!(
                "[process.{role}] mixes package/executable with program/args"
            )));
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.role == role) {
            debug!(role, "editing catalogue entry");
            entry.target = merge_target(role, Some(&entry.target), ov)?;
            if let Some(output) = ov.output {
                entry.output = output;
            }
            return Ok(());
        }

        debug!(role, "adding catalogue entry");
        let target = merge_target(role, None, ov)?;
        self.entries.push(CatalogueEntry {
            role: role.to_string(),
            target,
            output: ov.output.unwrap_or_default(),
        });
        Ok(())
    }
}

fn merge_target(
    role: &str,
    existing: Option<&LaunchTarget>,
    ov: &ProcessOverride,
) -> Result<LaunchTarget> {
    let incomplete = || {
        LaunchError::invalid(format!(
            "[process.{role}] needs either package and executable, or program"
        ))
    };

    if ov.package.is_some() || ov.executable.is_some() {
        let (old_pkg, old_exe) = match existing {
            Some(LaunchTarget::Node {
                package,
                executable,
            }) => (Some(package.clone()), Some(executable.clone())),
            _ => (None, None),
        };
        let package = ov.package.clone().or(old_pkg).ok_or_else(incomplete)?;
        let executable = ov.executable.clone().or(old_exe).ok_or_else(incomplete)?;
        return Ok(LaunchTarget::Node {
            package,
            executable,
        });
    }

    if ov.program.is_some() || ov.args.is_some() {
        let (old_prog, old_args) = match existing {
            Some(LaunchTarget::Command { program, args }) => {
                (Some(program.clone()), Some(args.clone()))
            }
            _ => (None, None),
        };
        let program = ov.program.clone().or(old_prog).ok_or_else(incomplete)?;
        let args = ov.args.clone().or(old_args).unwrap_or_default();
        return Ok(LaunchTarget::Command { program, args });
    }

    existing.cloned().ok_or_else(incomplete)
}
