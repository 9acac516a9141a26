// src/exec/process_runner.rs

//! Runs and watches a single OS process.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::plan::{CommandLine, ProcessSpec};
use crate::supervisor::{FailureReason, SupervisorEvent};
use crate::types::OutputMode;

/// Control message from the backend to one process runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Stop,
    Kill,
}

/// Spawn `spec`, report its lifecycle on `events`, and obey `control`.
///
/// Reports at most one `ProcessStarted` and always exactly one terminal
/// event.
pub async fn run_process(
    spec: ProcessSpec,
    events: mpsc::Sender<SupervisorEvent>,
    mut control: mpsc::UnboundedReceiver<ControlSignal>,
    startup_window: Duration,
) {
    let role = spec.role().to_string();

    let mut child = match spawn_child(&spec) {
        Ok(child) => child,
        Err(reason) => {
            warn!(role = %role, %reason, "could not start process");
            send(
                &events,
                SupervisorEvent::ProcessFailed {
                    role,
                    reason: FailureReason::SpawnFailed(reason),
                },
            )
            .await;
            return;
        }
    };

    let pid = child.id().unwrap_or_default();
    debug!(role = %role, pid, "process spawned; waiting out startup window");

    if spec.output() == OutputMode::Captured {
        forward_output(&role, &mut child);
    }

    let startup = tokio::time::sleep(startup_window);
    tokio::pin!(startup);
    let mut confirmed = false;
    let mut control_open = true;

    let terminal = loop {
        tokio::select! {
            status = child.wait() => {
                break match status {
                    Ok(status) => {
                        let code = exit_code(status);
                        info!(role = %role, pid, exit_code = code, "process exited");
                        SupervisorEvent::ProcessExited { role: role.clone(), code }
                    }
                    Err(e) => SupervisorEvent::ProcessFailed {
                        role: role.clone(),
                        reason: FailureReason::Lost(e.to_string()),
                    },
                };
            }

            _ = &mut startup, if !confirmed => {
                confirmed = true;
                send(&events, SupervisorEvent::ProcessStarted { role: role.clone(), pid }).await;
            }

            signal = control.recv(), if control_open => {
                match signal {
                    Some(ControlSignal::Stop) => request_stop(&role, pid, &mut child),
                    Some(ControlSignal::Kill) => kill(&role, pid, &mut child),
                    None => {
                        debug!(role = %role, "control channel closed; killing process");
                        control_open = false;
                        kill(&role, pid, &mut child);
                    }
                }
            }
        }
    };

    // The exit is only reported once nothing the process forked is left.
    sweep_group(&role, pid);
    send(&events, terminal).await;
}

fn spawn_child(spec: &ProcessSpec) -> Result<Child, String> {
    let line = CommandLine::render(spec).map_err(|e| e.to_string())?;
    info!(role = spec.role(), cmd = %line, output = %spec.output(), "starting process");

    let mut cmd = Command::new(&line.program);
    cmd.args(&line.args).stdin(Stdio::null()).kill_on_drop(true);
    // Lead a fresh process group so stop and kill also reach anything the
    // program forks (`ros2 run` execs the node as its own child).
    #[cfg(unix)]
    cmd.process_group(0);

    match spec.output() {
        OutputMode::Screen => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        OutputMode::Captured => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
    }

    cmd.spawn().map_err(|e| format!("{}: {e}", line.program))
}

/// Re-emit captured stdout/stderr lines as tracing events.
fn forward_output(role: &str, child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        spawn_line_forwarder(role.to_string(), "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_forwarder(role.to_string(), "stderr", stderr);
    }
}

fn spawn_line_forwarder<R>(role: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(role = %role, stream, "{}", line);
        }
    });
}

/// Send `signal` to the process group led by `pid`.
#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) -> nix::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    // Pid 0 would address our own group.
    let raw = i32::try_from(pid)
        .ok()
        .filter(|p| *p > 0)
        .ok_or(Errno::ESRCH)?;
    killpg(Pid::from_raw(raw), signal)
}

#[cfg(unix)]
fn request_stop(role: &str, pid: u32, child: &mut Child) {
    use nix::sys::signal::Signal;

    debug!(role, pid, "sending SIGTERM to process group");
    if let Err(e) = signal_group(pid, Signal::SIGTERM) {
        warn!(role, pid, error = %e, "SIGTERM failed; killing instead");
        kill(role, pid, child);
    }
}

#[cfg(not(unix))]
fn request_stop(role: &str, pid: u32, child: &mut Child) {
    kill(role, pid, child);
}

#[cfg(unix)]
fn kill(role: &str, pid: u32, child: &mut Child) {
    use nix::sys::signal::Signal;

    if let Err(e) = signal_group(pid, Signal::SIGKILL) {
        debug!(role, pid, error = %e, "group kill failed; killing the child only");
        if let Err(e) = child.start_kill() {
            warn!(role, error = %e, "failed to kill process");
        }
    }
}

#[cfg(not(unix))]
fn kill(role: &str, _pid: u32, child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!(role, error = %e, "failed to kill process");
    }
}

/// Kill whatever is left in the group after its leader exited.
#[cfg(unix)]
fn sweep_group(role: &str, pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::Signal;

    match signal_group(pid, Signal::SIGKILL) {
        Ok(()) => warn!(role, pid, "killed processes left behind by the exited process"),
        Err(Errno::ESRCH) => {}
        Err(e) => warn!(role, pid, error = %e, "could not clean up process group"),
    }
}

#[cfg(not(unix))]
fn sweep_group(_role: &str, _pid: u32) {}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

async fn send(events: &mpsc::Sender<SupervisorEvent>, event: SupervisorEvent) {
    if events.send(event).await.is_err() {
        debug!("supervisor event channel closed");
    }
}
