// src/supervisor/core.rs

//! Pure supervisor state machine.
//!
//! [`SupervisorCore`] consumes [`SupervisorEvent`]s and returns the
//! [`SupervisorCommand`]s the IO shell should carry out. It owns the group
//! state and the process handle table, and performs no IO, so every
//! lifecycle rule can be unit tested without Tokio or real processes.

use tracing::{debug, error, info, warn};

use crate::config::model::SupervisorOptions;
use crate::plan::LaunchPlan;
use crate::supervisor::{
    FailureReason, GroupState, LaunchReport, ProcessHandle, ProcessState, ProcessSummary,
    SupervisorCommand, SupervisorEvent, TeardownCause,
};
use crate::types::RoleName;

/// Result of feeding one event to the core.
#[derive(Debug, Clone, Default)]
pub struct SupervisorStep {
    pub commands: Vec<SupervisorCommand>,
    /// `false` once the group is `Terminated`.
    pub keep_running: bool,
}

/// Teardown escalation, advanced by each `GraceElapsed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escalation {
    /// Graceful stop sent, waiting for the grace period.
    Signaled,
    /// Kill sent, waiting one more grace period for the exit to be reported.
    Killed,
}

#[derive(Debug)]
pub struct SupervisorCore {
    options: SupervisorOptions,
    group: GroupState,
    handles: Vec<ProcessHandle>,
    cause: Option<TeardownCause>,
    escalation: Option<Escalation>,
    killed_after_grace: Vec<RoleName>,
}

impl SupervisorCore {
    pub fn new(options: SupervisorOptions) -> Self {
        Self {
            options,
            group: GroupState::Idle,
            handles: Vec::new(),
            cause: None,
            escalation: None,
            killed_after_grace: Vec::new(),
        }
    }

    pub fn group_state(&self) -> GroupState {
        self.group
    }

    pub fn handles(&self) -> &[ProcessHandle] {
        &self.handles
    }

    pub fn handle(&self, role: &str) -> Option<&ProcessHandle> {
        self.handles.iter().find(|h| h.role() == role)
    }

    pub fn cause(&self) -> Option<&TeardownCause> {
        self.cause.as_ref()
    }

    /// The terminal report, available once the group is `Terminated`.
    pub fn report(&self) -> Option<LaunchReport> {
        if self.group != GroupState::Terminated {
            return None;
        }
        Some(LaunchReport {
            cause: self.cause.clone().unwrap_or(TeardownCause::StopRequested),
            processes: self.handles.iter().map(ProcessSummary::from).collect(),
            killed_after_grace: self.killed_after_grace.clone(),
            grace_period: self.options.grace_period,
        })
    }

    pub fn step(&mut self, event: SupervisorEvent) -> SupervisorStep {
        let mut commands = Vec::new();

        match event {
            SupervisorEvent::StartRequested(plan) => self.on_start(plan, &mut commands),
            SupervisorEvent::ProcessStarted { role, pid } => {
                self.on_started(&role, pid, &mut commands)
            }
            SupervisorEvent::ProcessExited { role, code } => {
                self.on_terminal(&role, ProcessState::Exited(code), &mut commands)
            }
            SupervisorEvent::ProcessFailed { role, reason } => {
                self.on_terminal(&role, ProcessState::Failed(reason), &mut commands)
            }
            SupervisorEvent::StopRequested => match self.group {
                GroupState::Launching | GroupState::AllRunning => {
                    info!(group = %self.group, "stop requested");
                    self.begin_teardown(TeardownCause::StopRequested, &mut commands);
                }
                other => debug!(group = %other, "stop request ignored"),
            },
            SupervisorEvent::GraceElapsed => self.on_grace_elapsed(&mut commands),
        }

        self.evaluate_group();

        SupervisorStep {
            commands,
            keep_running: self.group != GroupState::Terminated,
        }
    }

    fn on_start(&mut self, plan: LaunchPlan, commands: &mut Vec<SupervisorCommand>) {
        if self.group != GroupState::Idle {
            warn!(group = %self.group, "start requested while not idle; ignoring");
            return;
        }

        info!(processes = plan.len(), "launching process group");
        self.group = GroupState::Launching;

        for spec in plan.into_specs() {
            let mut handle = ProcessHandle::new(spec);
            handle.enter(ProcessState::Starting);
            commands.push(SupervisorCommand::Spawn(handle.spec().clone()));
            self.handles.push(handle);
        }
    }

    fn on_started(&mut self, role: &str, pid: u32, commands: &mut Vec<SupervisorCommand>) {
        let terminating = self.group == GroupState::Terminating;
        let Some(handle) = self.handle_mut(role) else {
            warn!(role, pid, "start reported for unknown role");
            return;
        };

        if *handle.state() != ProcessState::Starting {
            debug!(role, pid, state = %handle.state(), "duplicate or late start report ignored");
            return;
        }

        handle.set_pid(pid);
        handle.enter(ProcessState::Running);
        info!(role, pid, "process running");

        if terminating && !handle.stop_requested {
            handle.stop_requested = true;
            commands.push(SupervisorCommand::SignalStop(role.to_string()));
        }
    }

    fn on_terminal(
        &mut self,
        role: &str,
        state: ProcessState,
        commands: &mut Vec<SupervisorCommand>,
    ) {
        let group = self.group;
        let Some(handle) = self.handle_mut(role) else {
            warn!(role, %state, "exit reported for unknown role");
            return;
        };

        if handle.state().is_terminal() {
            debug!(role, %state, "process already terminal; ignoring report");
            return;
        }

        let expected = handle.stop_requested;
        handle.enter(state.clone());

        if expected {
            info!(role, %state, "process stopped");
        } else {
            match &state {
                ProcessState::Failed(reason) => error!(role, %reason, "process failed"),
                other => warn!(role, state = %other, "process exited unexpectedly"),
            }
        }

        if matches!(group, GroupState::Launching | GroupState::AllRunning) {
            let cause = match state {
                ProcessState::Failed(reason) => TeardownCause::ProcessFailed {
                    role: role.to_string(),
                    reason,
                },
                ProcessState::Exited(code) => TeardownCause::ProcessExited {
                    role: role.to_string(),
                    code,
                },
                _ => return,
            };
            self.begin_teardown(cause, commands);
        }
    }

    /// Enter `Terminating`. Only ever runs once per supervisor.
    fn begin_teardown(&mut self, cause: TeardownCause, commands: &mut Vec<SupervisorCommand>) {
        info!(%cause, "tearing down process group");
        self.group = GroupState::Terminating;
        self.cause = Some(cause);
        self.escalation = Some(Escalation::Signaled);

        let mut signaled = 0usize;
        for handle in self.handles.iter_mut() {
            if handle.state().is_live() && !handle.stop_requested {
                handle.stop_requested = true;
                commands.push(SupervisorCommand::SignalStop(handle.role().to_string()));
                signaled += 1;
            }
        }

        if signaled > 0 {
            commands.push(SupervisorCommand::ArmGraceTimer(self.options.grace_period));
        }
    }

    fn on_grace_elapsed(&mut self, commands: &mut Vec<SupervisorCommand>) {
        if self.group != GroupState::Terminating {
            debug!(group = %self.group, "grace timer fired outside teardown; ignoring");
            return;
        }

        match self.escalation {
            Some(Escalation::Signaled) => {
                for handle in self.handles.iter_mut() {
                    if handle.state().is_live() {
                        warn!(
                            role = handle.role(),
                            grace = ?self.options.grace_period,
                            "process ignored graceful stop; killing"
                        );
                        handle.killed = true;
                        self.killed_after_grace.push(handle.role().to_string());
                        commands.push(SupervisorCommand::ForceKill(handle.role().to_string()));
                    }
                }
                if !commands.is_empty() {
                    self.escalation = Some(Escalation::Killed);
                    commands.push(SupervisorCommand::ArmGraceTimer(self.options.grace_period));
                }
            }
            Some(Escalation::Killed) => {
                // Kill was sent a full grace period ago and no exit has been
                // observed; the exit status is unrecoverable.
                for handle in self.handles.iter_mut() {
                    if handle.state().is_live() {
                        error!(role = handle.role(), "no exit observed after kill");
                        handle.enter(ProcessState::Failed(FailureReason::Lost(
                            "no exit observed after kill".to_string(),
                        )));
                    }
                }
            }
            None => {}
        }
    }

    fn evaluate_group(&mut self) {
        match self.group {
            GroupState::Launching
                if self
                    .handles
                    .iter()
                    .all(|h| *h.state() == ProcessState::Running) =>
            {
                info!(processes = self.handles.len(), "all processes running");
                self.group = GroupState::AllRunning;
            }
            GroupState::Terminating if self.handles.iter().all(|h| h.state().is_terminal()) => {
                info!("process group terminated");
                self.group = GroupState::Terminated;
            }
            _ => {}
        }
    }

    fn handle_mut(&mut self, role: &str) -> Option<&mut ProcessHandle> {
        self.handles.iter_mut().find(|h| h.role() == role)
    }
}
