// src/supervisor/mod.rs

//! Group supervision for a [`LaunchPlan`].
//!
//! The pure state machine lives in [`core`]; the async shell that talks to a
//! [`ProcessBackend`](crate::exec::ProcessBackend) and the event channel is
//! in [`runtime`]. [`handle`] holds per-process state and [`report`] the
//! terminal summary handed to the caller.

use std::fmt;
use std::time::Duration;

use crate::plan::{LaunchPlan, ProcessSpec};
use crate::types::RoleName;

pub mod core;
pub mod handle;
pub mod report;
pub mod runtime;

pub use self::core::{SupervisorCore, SupervisorStep};
pub use handle::{FailureReason, ProcessHandle, ProcessState, Transition};
pub use report::{LaunchReport, ProcessSummary, TeardownCause};
pub use runtime::{Supervisor, SupervisorHandle};

/// Lifecycle of the whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Idle,
    Launching,
    AllRunning,
    Terminating,
    Terminated,
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupState::Idle => "idle",
            GroupState::Launching => "launching",
            GroupState::AllRunning => "all-running",
            GroupState::Terminating => "terminating",
            GroupState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Events flowing into the supervisor from the backend, timers and callers.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// Start every process of the plan.
    StartRequested(LaunchPlan),
    /// The process has a pid and survived its startup window.
    ProcessStarted { role: RoleName, pid: u32 },
    /// The OS reported the process's exit.
    ProcessExited { role: RoleName, code: i32 },
    /// The process could not be started, or its exit could not be observed.
    ProcessFailed {
        role: RoleName,
        reason: FailureReason,
    },
    /// Explicit stop (Ctrl-C, caller request).
    StopRequested,
    /// The grace period armed at teardown has passed.
    GraceElapsed,
}

/// Instruction produced by the core for the IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisorCommand {
    Spawn(ProcessSpec),
    SignalStop(RoleName),
    ForceKill(RoleName),
    /// Deliver `GraceElapsed` after this long.
    ArmGraceTimer(Duration),
}
