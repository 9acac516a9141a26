// src/exec/mod.rs

//! Process execution layer.
//!
//! This module actually runs the processes of a launch plan, using
//! `tokio::process::Command`, and reports back to the supervisor via
//! [`SupervisorEvent`](crate::supervisor::SupervisorEvent)s.
//!
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `RealProcessBackend`, which tests replace with a fake.
//! - [`process_runner`] starts one process and watches it until it exits.

pub mod backend;
pub mod process_runner;

pub use backend::{BackendFuture, ProcessBackend, RealProcessBackend};
pub use process_runner::ControlSignal;
