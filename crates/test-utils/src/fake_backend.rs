use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use vlam_launch::errors::LaunchError;
use vlam_launch::exec::{BackendFuture, ProcessBackend};
use vlam_launch::plan::ProcessSpec;
use vlam_launch::supervisor::SupervisorEvent;
use vlam_launch::types::RoleName;

/// Exit code reported for a process stopped with SIGTERM.
pub const TERMINATED: i32 = 143;
/// Exit code reported for a process stopped with SIGKILL.
pub const KILLED: i32 = 137;

/// How a fake process reacts to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeBehaviour {
    /// Starts, exits with `TERMINATED` on stop and `KILLED` on kill.
    Start,
    /// `spawn` returns an error.
    FailToSpawn(String),
    /// Starts, ignores graceful stop, exits on kill.
    IgnoreStop,
    /// Starts and never reports an exit.
    Unkillable,
    /// Exits with the given code right after being spawned.
    ExitImmediately(i32),
}

/// Everything the supervisor asked the fake to do, in order.
#[derive(Debug, Default, Clone)]
pub struct FakeLog {
    pub spawned: Vec<RoleName>,
    pub stopped: Vec<RoleName>,
    pub killed: Vec<RoleName>,
}

/// A fake backend that:
/// - records spawn/stop/kill requests
/// - answers them with the events a real process would produce.
pub struct FakeBackend {
    events: mpsc::Sender<SupervisorEvent>,
    behaviours: HashMap<RoleName, FakeBehaviour>,
    log: Arc<Mutex<FakeLog>>,
    next_pid: u32,
}

impl FakeBackend {
    pub fn new(events: mpsc::Sender<SupervisorEvent>) -> Self {
        Self {
            events,
            behaviours: HashMap::new(),
            log: Arc::new(Mutex::new(FakeLog::default())),
            next_pid: 1000,
        }
    }

    /// Roles without an explicit behaviour use `FakeBehaviour::Start`.
    pub fn with_behaviour(mut self, role: &str, behaviour: FakeBehaviour) -> Self {
        self.behaviours.insert(role.to_string(), behaviour);
        self
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }

    fn behaviour(&self, role: &str) -> FakeBehaviour {
        self.behaviours
            .get(role)
            .cloned()
            .unwrap_or(FakeBehaviour::Start)
    }
}

impl ProcessBackend for FakeBackend {
    fn spawn(&mut self, spec: ProcessSpec) -> BackendFuture<'_> {
        let role = spec.role().to_string();
        self.log.lock().unwrap().spawned.push(role.clone());
        self.next_pid += 1;
        let pid = self.next_pid;
        let behaviour = self.behaviour(&role);
        let tx = self.events.clone();

        Box::pin(async move {
            match behaviour {
                FakeBehaviour::FailToSpawn(reason) => {
                    return Err(LaunchError::SpawnFailed { role, reason });
                }
                FakeBehaviour::ExitImmediately(code) => {
                    tx.send(SupervisorEvent::ProcessExited { role, code })
                        .await
                        .map_err(anyhow::Error::from)?;
                }
                FakeBehaviour::Start | FakeBehaviour::IgnoreStop | FakeBehaviour::Unkillable => {
                    tx.send(SupervisorEvent::ProcessStarted { role, pid })
                        .await
                        .map_err(anyhow::Error::from)?;
                }
            }
            Ok(())
        })
    }

    fn signal_stop(&mut self, role: RoleName) -> BackendFuture<'_> {
        self.log.lock().unwrap().stopped.push(role.clone());
        let exits = self.behaviour(&role) == FakeBehaviour::Start;
        let tx = self.events.clone();

        Box::pin(async move {
            if exits {
                tx.send(SupervisorEvent::ProcessExited {
                    role,
                    code: TERMINATED,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }

    fn force_kill(&mut self, role: RoleName) -> BackendFuture<'_> {
        self.log.lock().unwrap().killed.push(role.clone());
        let exits = self.behaviour(&role) != FakeBehaviour::Unkillable;
        let tx = self.events.clone();

        Box::pin(async move {
            if exits {
                tx.send(SupervisorEvent::ProcessExited { role, code: KILLED })
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
