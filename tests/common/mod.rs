#![allow(dead_code)]

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use vlam_launch::config::SupervisorOptions;
use vlam_launch::supervisor::{Supervisor, SupervisorCore, SupervisorEvent};
use vlam_launch_test_utils::fake_backend::FakeBackend;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Path to a file under `demos/`.
pub fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

pub fn options(grace: Duration) -> SupervisorOptions {
    SupervisorOptions {
        grace_period: grace,
        startup_window: Duration::ZERO,
    }
}

/// A supervisor over a fake backend. The returned sender lets a test inject
/// events as if they came from a process.
pub fn fake_supervisor(
    grace: Duration,
    configure: impl FnOnce(FakeBackend) -> FakeBackend,
) -> (
    Supervisor<FakeBackend>,
    mpsc::Sender<SupervisorEvent>,
    std::sync::Arc<std::sync::Mutex<vlam_launch_test_utils::fake_backend::FakeLog>>,
) {
    let (tx, rx) = mpsc::channel::<SupervisorEvent>(64);
    let backend = configure(FakeBackend::new(tx.clone()));
    let log = backend.log();
    let supervisor = Supervisor::new(SupervisorCore::new(options(grace)), tx.clone(), rx, backend);
    (supervisor, tx, log)
}
