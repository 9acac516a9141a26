// src/supervisor/handle.rs

//! Per-process runtime state.

use std::fmt;
use std::time::Instant;

use crate::plan::ProcessSpec;

/// Why a process ended without an exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The OS refused to start it (missing executable, permission denied, ...).
    SpawnFailed(String),
    /// It was started but its exit status could not be collected.
    Lost(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::SpawnFailed(msg) => write!(f, "spawn failed: {msg}"),
            FailureReason::Lost(msg) => write!(f, "lost: {msg}"),
        }
    }
}

/// Lifecycle of one process.
///
/// `Pending -> Starting -> Running -> {Exited | Failed}`. A process may also
/// go straight from `Starting` to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    Pending,
    Starting,
    Running,
    Exited(i32),
    Failed(FailureReason),
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Exited(_) | ProcessState::Failed(_))
    }

    /// Starting or Running: there may be a live OS process behind it.
    pub fn is_live(&self) -> bool {
        matches!(self, ProcessState::Starting | ProcessState::Running)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Pending => f.write_str("pending"),
            ProcessState::Starting => f.write_str("starting"),
            ProcessState::Running => f.write_str("running"),
            ProcessState::Exited(code) => write!(f, "exited({code})"),
            ProcessState::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}

/// A state entered at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ProcessState,
    pub at: Instant,
}

/// Binds a [`ProcessSpec`] to its live process and lifecycle.
///
/// Owned by [`SupervisorCore`](crate::supervisor::SupervisorCore); other
/// components only see it through shared references.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    spec: ProcessSpec,
    pid: Option<u32>,
    history: Vec<Transition>,
    pub(crate) stop_requested: bool,
    pub(crate) killed: bool,
}

impl ProcessHandle {
    pub(crate) fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
            pid: None,
            history: vec![Transition {
                state: ProcessState::Pending,
                at: Instant::now(),
            }],
            stop_requested: false,
            killed: false,
        }
    }

    pub fn role(&self) -> &str {
        self.spec.role()
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&self) -> &ProcessState {
        // `history` always holds the initial Pending entry.
        &self.history[self.history.len() - 1].state
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Whether the process ever reached `Starting`.
    pub fn was_started(&self) -> bool {
        self.history
            .iter()
            .any(|t| t.state == ProcessState::Starting)
    }

    /// Whether graceful stop was ignored and the process had to be killed.
    pub fn was_killed(&self) -> bool {
        self.killed
    }

    pub(crate) fn set_pid(&mut self, pid: u32) {
        self.pid = Some(pid);
    }

    pub(crate) fn enter(&mut self, state: ProcessState) {
        self.history.push(Transition {
            state,
            at: Instant::now(),
        });
    }
}
