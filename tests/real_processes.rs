// tests/real_processes.rs
//
// Runs the supervisor against real `sh` processes.

#![cfg(unix)]

mod common;

use std::time::Duration;

use common::{options, TestResult};
use tokio::sync::mpsc;
use vlam_launch::exec::RealProcessBackend;
use vlam_launch::params::ParameterSet;
use vlam_launch::plan::{LaunchPlan, LaunchTarget, ProcessSpec};
use vlam_launch::supervisor::{
    ProcessState, Supervisor, SupervisorCore, SupervisorEvent, TeardownCause,
};
use vlam_launch::types::OutputMode;
use vlam_launch_test_utils::{init_tracing, with_timeout, with_timeout_of};

fn sh(role: &str, script: &str) -> ProcessSpec {
    ProcessSpec::new(
        role.to_string(),
        LaunchTarget::Command {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
        },
        ParameterSet::empty(),
        OutputMode::Captured,
    )
}

fn real_supervisor(grace: Duration) -> Supervisor<RealProcessBackend> {
    let (tx, rx) = mpsc::channel::<SupervisorEvent>(64);
    let mut opts = options(grace);
    opts.startup_window = Duration::from_millis(50);
    let backend = RealProcessBackend::new(tx.clone(), opts.startup_window);
    Supervisor::new(SupervisorCore::new(opts), tx, rx, backend)
}

#[tokio::test]
async fn crashing_process_takes_down_long_running_siblings() -> TestResult {
    init_tracing();

    let plan = LaunchPlan::from_specs(vec![
        sh("visualizer", "exec sleep 30"),
        sh("driver", "sleep 0.3; exit 4"),
        sh("localizer", "exec sleep 30"),
    ]);
    let report = with_timeout(real_supervisor(Duration::from_secs(2)).run(plan)).await?;

    assert_eq!(
        report.cause,
        TeardownCause::ProcessExited {
            role: "driver".into(),
            code: 4
        }
    );
    for role in ["visualizer", "localizer"] {
        let p = report.process(role).unwrap();
        assert_eq!(p.final_state, ProcessState::Exited(128 + 15), "{role}");
        assert!(!p.killed);
    }
    Ok(())
}

#[tokio::test]
async fn process_trapping_sigterm_is_killed() -> TestResult {
    init_tracing();

    let plan = LaunchPlan::from_specs(vec![
        sh("mapper", "trap '' TERM; while true; do sleep 0.05; done"),
        sh("driver", "sleep 0.3; exit 1"),
    ]);
    let report = with_timeout_of(
        Duration::from_secs(10),
        real_supervisor(Duration::from_millis(300)).run(plan),
    )
    .await?;

    assert_eq!(report.killed_after_grace, vec!["mapper".to_string()]);
    assert_eq!(
        report.process("mapper").unwrap().final_state,
        ProcessState::Exited(128 + 9)
    );
    Ok(())
}

/// Whether `pid` names a live (non-zombie) process.
#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        // The state letter follows the parenthesised command name.
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z" && state != "X"),
        Err(_) => false,
    }
}

/// Give a just-signaled process up to a second to disappear.
#[cfg(target_os = "linux")]
async fn exits_soon(pid: u32) -> bool {
    for _ in 0..50 {
        if !process_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn forked_children_do_not_outlive_teardown() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("node.pid");
    // A wrapper that forks the real work, the way `ros2 run` does.
    let wrapper = format!("sleep 27.1828 & echo $! > {}; wait", pid_file.display());

    let plan = LaunchPlan::from_specs(vec![
        sh("localizer", &wrapper),
        sh("driver", "sleep 0.3; exit 4"),
    ]);
    let report = with_timeout(real_supervisor(Duration::from_secs(2)).run(plan)).await?;

    let p = report.process("localizer").unwrap();
    assert!(p.final_state.is_terminal());
    assert!(!p.killed);

    let node_pid: u32 = std::fs::read_to_string(&pid_file)?.trim().parse()?;
    assert!(exits_soon(node_pid).await, "forked child {node_pid} survived teardown");
    Ok(())
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn children_left_by_an_exited_process_are_cleaned_up() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("stray.pid");
    // The leader exits on its own and leaves a background child behind.
    let script = format!(
        "sleep 27.1828 & echo $! > {}; sleep 0.3; exit 5",
        pid_file.display()
    );

    let plan = LaunchPlan::from_specs(vec![
        sh("mapper", &script),
        sh("visualizer", "exec sleep 30"),
    ]);
    let report = with_timeout(real_supervisor(Duration::from_secs(2)).run(plan)).await?;

    assert_eq!(
        report.cause,
        TeardownCause::ProcessExited {
            role: "mapper".into(),
            code: 5
        }
    );
    let stray: u32 = std::fs::read_to_string(&pid_file)?.trim().parse()?;
    assert!(
        exits_soon(stray).await,
        "background child {stray} survived its parent's exit"
    );
    Ok(())
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() -> TestResult {
    init_tracing();

    let plan = LaunchPlan::from_specs(vec![
        sh("visualizer", "exec sleep 30"),
        ProcessSpec::new(
            "driver".into(),
            LaunchTarget::Command {
                program: "/definitely/not/tello_driver".into(),
                args: vec![],
            },
            ParameterSet::empty(),
            OutputMode::Screen,
        ),
    ]);
    let report = with_timeout(real_supervisor(Duration::from_secs(2)).run(plan)).await?;

    assert!(matches!(
        report.error(),
        Some(vlam_launch::errors::LaunchError::SpawnFailed { ref role, .. }) if role == "driver"
    ));
    assert!(report.process("visualizer").unwrap().final_state.is_terminal());
    Ok(())
}
