// src/supervisor/report.rs

use std::fmt;
use std::time::Duration;

use anyhow::anyhow;

use crate::errors::LaunchError;
use crate::supervisor::{FailureReason, ProcessHandle, ProcessState, Transition};
use crate::types::RoleName;

/// What made the group tear down. Recorded once, at the first trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownCause {
    StopRequested,
    ProcessExited { role: RoleName, code: i32 },
    ProcessFailed { role: RoleName, reason: FailureReason },
}

impl fmt::Display for TeardownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownCause::StopRequested => f.write_str("stop requested"),
            TeardownCause::ProcessExited { role, code } => {
                write!(f, "'{role}' exited unexpectedly with code {code}")
            }
            TeardownCause::ProcessFailed { role, reason } => write!(f, "'{role}' {reason}"),
        }
    }
}

/// Final view of one process.
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub role: RoleName,
    pub pid: Option<u32>,
    pub final_state: ProcessState,
    pub killed: bool,
    pub history: Vec<Transition>,
}

impl From<&ProcessHandle> for ProcessSummary {
    fn from(h: &ProcessHandle) -> Self {
        Self {
            role: h.role().to_string(),
            pid: h.pid(),
            final_state: h.state().clone(),
            killed: h.was_killed(),
            history: h.history().to_vec(),
        }
    }
}

/// Terminal report produced once the group reached `Terminated`.
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub cause: TeardownCause,
    pub processes: Vec<ProcessSummary>,
    /// Roles that ignored graceful stop and were killed.
    pub killed_after_grace: Vec<RoleName>,
    pub grace_period: Duration,
}

impl LaunchReport {
    /// `true` when teardown was requested and no process needed killing.
    pub fn is_clean(&self) -> bool {
        self.cause == TeardownCause::StopRequested && self.killed_after_grace.is_empty()
    }

    pub fn process(&self, role: &str) -> Option<&ProcessSummary> {
        self.processes.iter().find(|p| p.role == role)
    }

    /// The failure that triggered teardown, if teardown was not requested.
    pub fn error(&self) -> Option<LaunchError> {
        match &self.cause {
            TeardownCause::StopRequested => None,
            TeardownCause::ProcessFailed {
                role,
                reason: FailureReason::SpawnFailed(msg),
            } => Some(LaunchError::SpawnFailed {
                role: role.clone(),
                reason: msg.clone(),
            }),
            other => Some(LaunchError::Other(anyhow!("{other}"))),
        }
    }

    /// `ShutdownTimeout` warnings, one per killed role.
    pub fn warnings(&self) -> Vec<LaunchError> {
        self.killed_after_grace
            .iter()
            .map(|role| LaunchError::ShutdownTimeout {
                role: role.clone(),
                grace: self.grace_period,
            })
            .collect()
    }
}
