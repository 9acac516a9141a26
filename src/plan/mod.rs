// src/plan/mod.rs

//! Launch plan data model.
//!
//! - [`spec`] holds the immutable [`ProcessSpec`] and its [`LaunchTarget`].
//! - [`catalogue`] lists each role's executable identity and output policy.
//! - [`command_line`] renders a spec into the argv handed to the OS.
//! - [`assembly`] joins resolver output with the catalogue into a
//!   [`LaunchPlan`].

pub mod assembly;
pub mod catalogue;
pub mod command_line;
pub mod spec;

pub use assembly::LaunchPlan;
pub use catalogue::{Catalogue, CatalogueEntry};
pub use command_line::CommandLine;
pub use spec::{LaunchTarget, ProcessSpec};
