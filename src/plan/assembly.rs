// src/plan/assembly.rs

use tracing::debug;

use crate::errors::{LaunchError, Result};
use crate::params::ResolvedParameters;
use crate::plan::{Catalogue, CommandLine, ProcessSpec};

/// Ordered set of processes to start together.
///
/// Order follows the catalogue and is advisory only: the supervisor starts
/// every spec at once and never waits for one to be up before another.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    specs: Vec<ProcessSpec>,
}

impl LaunchPlan {
    /// Combine resolver output with the catalogue.
    ///
    /// Fails with `UnknownRole` if `resolved` has a role the catalogue lacks,
    /// and with `MissingRole` if the catalogue has a role `resolved` lacks.
    /// Every spec's command line is rendered once here so argument errors
    /// surface before anything is spawned.
    pub fn assemble(mut resolved: ResolvedParameters, catalogue: &Catalogue) -> Result<Self> {
        if let Some(role) = resolved.keys().find(|r| catalogue.get(r).is_none()) {
            return Err(LaunchError::UnknownRole(role.clone()));
        }

        let mut specs = Vec::with_capacity(catalogue.entries().len());
        for entry in catalogue.entries() {
            let parameters = resolved
                .remove(&entry.role)
                .ok_or_else(|| LaunchError::MissingRole(entry.role.clone()))?;

            let spec = ProcessSpec::new(
                entry.role.clone(),
                entry.target.clone(),
                parameters,
                entry.output,
            );
            let cmd = CommandLine::render(&spec)?;
            debug!(role = %entry.role, %cmd, output = %entry.output, "assembled process spec");
            specs.push(spec);
        }

        Ok(Self { specs })
    }

    /// Build a plan from already-constructed specs (used by tests and tools).
    pub fn from_specs(specs: Vec<ProcessSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[ProcessSpec] {
        &self.specs
    }

    pub fn get(&self, role: &str) -> Option<&ProcessSpec> {
        self.specs.iter().find(|s| s.role() == role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.role())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn into_specs(self) -> Vec<ProcessSpec> {
        self.specs
    }
}
