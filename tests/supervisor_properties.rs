// tests/supervisor_properties.rs

use std::time::Duration;

use proptest::prelude::*;
use vlam_launch::config::SupervisorOptions;
use vlam_launch::supervisor::{FailureReason, GroupState, SupervisorCore, SupervisorEvent};
use vlam_launch::types::roles;
use vlam_launch_test_utils::builders::plan_for;

// Events a running group can see, with roles picked by index into
// `roles::ALL`.
#[derive(Debug, Clone)]
enum Op {
    Started(usize),
    Exited(usize, i32),
    Failed(usize),
    Stop,
    Grace,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..roles::ALL.len()).prop_map(Op::Started),
        2 => (0..roles::ALL.len(), -1..256i32).prop_map(|(i, c)| Op::Exited(i, c)),
        1 => (0..roles::ALL.len()).prop_map(Op::Failed),
        1 => Just(Op::Stop),
        1 => Just(Op::Grace),
    ]
}

fn to_event(op: &Op) -> SupervisorEvent {
    match *op {
        Op::Started(i) => SupervisorEvent::ProcessStarted {
            role: roles::ALL[i].to_string(),
            pid: 100 + i as u32,
        },
        Op::Exited(i, code) => SupervisorEvent::ProcessExited {
            role: roles::ALL[i].to_string(),
            code,
        },
        Op::Failed(i) => SupervisorEvent::ProcessFailed {
            role: roles::ALL[i].to_string(),
            reason: FailureReason::SpawnFailed("not found".into()),
        },
        Op::Stop => SupervisorEvent::StopRequested,
        Op::Grace => SupervisorEvent::GraceElapsed,
    }
}

fn new_core() -> SupervisorCore {
    SupervisorCore::new(SupervisorOptions {
        grace_period: Duration::from_secs(1),
        startup_window: Duration::ZERO,
    })
}

fn assert_no_orphans(core: &SupervisorCore) -> Result<(), TestCaseError> {
    if core.group_state() == GroupState::Terminated {
        for h in core.handles().iter().filter(|h| h.was_started()) {
            prop_assert!(
                h.state().is_terminal(),
                "{} is {} after Terminated",
                h.role(),
                h.state()
            );
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn terminated_group_has_no_live_handles(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut core = new_core();
        core.step(SupervisorEvent::StartRequested(plan_for(&roles::ALL)));

        let mut first_cause = None;
        for op in &ops {
            core.step(to_event(op));
            assert_no_orphans(&core)?;

            match core.cause() {
                Some(cause) => {
                    if first_cause.is_none() {
                        first_cause = Some(cause.clone());
                    }
                    prop_assert_eq!(first_cause.as_ref(), Some(cause));
                }
                None => prop_assert!(first_cause.is_none()),
            }
        }

        // Stop followed by two grace periods always finishes teardown.
        for event in [
            SupervisorEvent::StopRequested,
            SupervisorEvent::GraceElapsed,
            SupervisorEvent::GraceElapsed,
        ] {
            core.step(event);
            assert_no_orphans(&core)?;
        }
        prop_assert_eq!(core.group_state(), GroupState::Terminated);
        if first_cause.is_some() {
            prop_assert_eq!(core.cause(), first_cause.as_ref());
        }
        prop_assert!(core.report().is_some());
    }

    #[test]
    fn teardown_is_decided_once(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut core = new_core();
        core.step(SupervisorEvent::StartRequested(plan_for(&roles::ALL)));

        let mut entered_teardown = 0usize;
        let mut previous = core.group_state();
        for op in &ops {
            core.step(to_event(op));
            let now = core.group_state();
            if now == GroupState::Terminating && previous != GroupState::Terminating {
                entered_teardown += 1;
            }
            previous = now;
        }
        prop_assert!(entered_teardown <= 1);
    }
}
