// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The supervisor talks to a `ProcessBackend` instead of spawning processes
//! itself. Outcomes (started, exited, failed) are never returned from these
//! calls; the backend reports them later as [`SupervisorEvent`]s on the
//! channel it was built with.
//!
//! - `RealProcessBackend` spawns OS processes, one Tokio task per process.
//! - Tests provide their own backend that simulates start/exit events.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::Result;
use crate::plan::ProcessSpec;
use crate::supervisor::SupervisorEvent;
use crate::types::RoleName;

use super::process_runner::{ControlSignal, run_process};

pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait abstracting how processes are started and stopped.
pub trait ProcessBackend: Send {
    /// Start the process described by `spec`.
    ///
    /// Exactly one terminal event (`ProcessExited` or `ProcessFailed`) must
    /// eventually follow for every spec passed here, optionally preceded by
    /// one `ProcessStarted`.
    fn spawn(&mut self, spec: ProcessSpec) -> BackendFuture<'_>;

    /// Ask the process to stop gracefully.
    fn signal_stop(&mut self, role: RoleName) -> BackendFuture<'_>;

    /// Stop the process forcefully.
    fn force_kill(&mut self, role: RoleName) -> BackendFuture<'_>;
}

/// Real backend used in production.
pub struct RealProcessBackend {
    events: mpsc::Sender<SupervisorEvent>,
    startup_window: Duration,
    active: HashMap<RoleName, mpsc::UnboundedSender<ControlSignal>>,
}

impl RealProcessBackend {
    pub fn new(events: mpsc::Sender<SupervisorEvent>, startup_window: Duration) -> Self {
        Self {
            events,
            startup_window,
            active: HashMap::new(),
        }
    }

    fn send_control(&self, role: &str, signal: ControlSignal) {
        match self.active.get(role) {
            Some(tx) => {
                if tx.send(signal).is_err() {
                    debug!(role, ?signal, "process runner already finished");
                }
            }
            None => debug!(role, ?signal, "no process runner for role"),
        }
    }
}

impl ProcessBackend for RealProcessBackend {
    fn spawn(&mut self, spec: ProcessSpec) -> BackendFuture<'_> {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        self.active.insert(spec.role().to_string(), control_tx);

        let events = self.events.clone();
        let window = self.startup_window;
        Box::pin(async move {
            tokio::spawn(run_process(spec, events, control_rx, window));
            Ok(())
        })
    }

    fn signal_stop(&mut self, role: RoleName) -> BackendFuture<'_> {
        self.send_control(&role, ControlSignal::Stop);
        Box::pin(async { Ok(()) })
    }

    fn force_kill(&mut self, role: RoleName) -> BackendFuture<'_> {
        self.send_control(&role, ControlSignal::Kill);
        Box::pin(async { Ok(()) })
    }
}
