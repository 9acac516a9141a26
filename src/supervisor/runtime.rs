// src/supervisor/runtime.rs

use std::collections::VecDeque;
use std::fmt;

use anyhow::anyhow;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::{LaunchError, Result};
use crate::exec::ProcessBackend;
use crate::plan::LaunchPlan;

use super::core::SupervisorCore;
use super::{FailureReason, GroupState, LaunchReport, SupervisorCommand, SupervisorEvent};

/// Drives [`SupervisorCore`] from the event channel and carries out its
/// commands through a [`ProcessBackend`].
///
/// All lifecycle rules live in the core; this type only moves events in and
/// commands out, arms grace timers, and publishes the group state.
pub struct Supervisor<B: ProcessBackend> {
    core: SupervisorCore,
    event_tx: mpsc::Sender<SupervisorEvent>,
    event_rx: mpsc::Receiver<SupervisorEvent>,
    backend: B,
    state_tx: watch::Sender<GroupState>,
}

impl<B: ProcessBackend> fmt::Debug for Supervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    /// `event_tx`/`event_rx` must be the two ends of the channel the backend
    /// reports on.
    pub fn new(
        core: SupervisorCore,
        event_tx: mpsc::Sender<SupervisorEvent>,
        event_rx: mpsc::Receiver<SupervisorEvent>,
        backend: B,
    ) -> Self {
        let (state_tx, _) = watch::channel(core.group_state());
        Self {
            core,
            event_tx,
            event_rx,
            backend,
            state_tx,
        }
    }

    /// A cloneable handle for stop requests and state observation.
    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle {
            events: self.event_tx.clone(),
            state: self.state_tx.subscribe(),
        }
    }

    /// Launch `plan` and supervise it until the group reaches `Terminated`.
    pub async fn run(mut self, plan: LaunchPlan) -> Result<LaunchReport> {
        info!("supervisor started");

        let mut pending = VecDeque::from([SupervisorEvent::StartRequested(plan)]);

        loop {
            let event = match pending.pop_front() {
                Some(e) => e,
                None => match self.event_rx.recv().await {
                    Some(e) => e,
                    None => {
                        return Err(LaunchError::Other(anyhow!(
                            "supervisor event channel closed before teardown completed"
                        )));
                    }
                },
            };

            debug!(?event, "supervisor received event");

            let step = self.core.step(event);
            for command in step.commands {
                if let Some(follow_up) = self.execute_command(command).await {
                    pending.push_back(follow_up);
                }
            }

            self.state_tx.send_replace(self.core.group_state());

            if !step.keep_running {
                break;
            }
        }

        let report = self
            .core
            .report()
            .ok_or_else(|| LaunchError::Other(anyhow!("supervisor stopped before termination")))?;

        for warning in report.warnings() {
            warn!(%warning, "forced termination");
        }
        info!(cause = %report.cause, "supervisor finished");

        Ok(report)
    }

    /// Execute a single command from the core. Backend errors come back as
    /// follow-up events so the core still sees a terminal state.
    async fn execute_command(&mut self, command: SupervisorCommand) -> Option<SupervisorEvent> {
        match command {
            SupervisorCommand::Spawn(spec) => {
                let role = spec.role().to_string();
                if let Err(e) = self.backend.spawn(spec).await {
                    return Some(SupervisorEvent::ProcessFailed {
                        role,
                        reason: FailureReason::SpawnFailed(e.to_string()),
                    });
                }
            }
            SupervisorCommand::SignalStop(role) => {
                debug!(role = %role, "requesting graceful stop");
                if let Err(e) = self.backend.signal_stop(role.clone()).await {
                    warn!(role = %role, error = %e, "graceful stop request failed");
                }
            }
            SupervisorCommand::ForceKill(role) => {
                if let Err(e) = self.backend.force_kill(role.clone()).await {
                    warn!(role = %role, error = %e, "kill request failed");
                }
            }
            SupervisorCommand::ArmGraceTimer(grace) => {
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    let _ = tx.send(SupervisorEvent::GraceElapsed).await;
                });
            }
        }
        None
    }
}

/// Caller-side view of a running [`Supervisor`].
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    events: mpsc::Sender<SupervisorEvent>,
    state: watch::Receiver<GroupState>,
}

impl SupervisorHandle {
    /// Request teardown. Has no effect once teardown is under way or done.
    pub async fn stop(&self) {
        if self.events.send(SupervisorEvent::StopRequested).await.is_err() {
            debug!("stop requested after supervisor finished");
        }
    }

    pub fn state(&self) -> GroupState {
        *self.state.borrow()
    }

    /// Wait until every process is running.
    ///
    /// Returns `false` if the group went into teardown instead.
    pub async fn wait_until_running(&mut self) -> bool {
        match self
            .state
            .wait_for(|s| {
                matches!(
                    s,
                    GroupState::AllRunning | GroupState::Terminating | GroupState::Terminated
                )
            })
            .await
        {
            Ok(s) => *s == GroupState::AllRunning,
            Err(_) => false,
        }
    }

    /// Wait until the group is `Terminated` (or the supervisor is gone).
    pub async fn wait_terminated(&mut self) {
        let _ = self
            .state
            .wait_for(|s| *s == GroupState::Terminated)
            .await;
    }
}
