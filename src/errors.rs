// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::time::Duration;

use thiserror::Error;

use crate::types::RoleName;

#[derive(Error, Debug)]
pub enum LaunchError {
    /// A top-level setting violates its domain. Nothing has been spawned.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The resolver produced parameters for a role the catalogue does not describe.
    #[error("Unknown role: '{0}' has parameters but no catalogue entry")]
    UnknownRole(RoleName),

    /// The catalogue expects a role the resolver did not produce.
    #[error("Missing role: catalogue expects '{0}' but no parameters were resolved for it")]
    MissingRole(RoleName),

    #[error("Spawn failed for '{role}': {reason}")]
    SpawnFailed { role: RoleName, reason: String },

    /// Non-fatal: the process ignored graceful stop and was killed.
    #[error("Shutdown timeout: '{role}' did not stop within {grace:?} and was killed")]
    ShutdownTimeout { role: RoleName, grace: Duration },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaunchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LaunchError::InvalidConfiguration(msg.into())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LaunchError>;
