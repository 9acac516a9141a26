// src/config/mod.rs

//! Configuration loading and validation for vlam-launch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate domain constraints (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_cli, load_from_path};
pub use model::{
    DriverSettings, LaunchConfig, LocalizerSettings, MapperSettings, Overrides, ProcessOverride,
    ProcessSettings, RawLaunchConfig, SupervisorOptions, SupervisorSection, VisualizerSettings,
};
