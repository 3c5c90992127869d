mod common;
use crate::common::init_tracing;

use std::time::Duration;

use scripthook::engine::{
    CoreCommand, CoreRuntime, Registry, RuntimeEvent, ShutdownCoordinator, ShutdownPhase,
    TaskOutcome, TaskState,
};
use scripthook::events::{KeyCode, KeyEvent};

const STOP: Duration = Duration::from_millis(250);

fn core_with(names: &[&str]) -> CoreRuntime {
    let mut registry = Registry::new();
    for name in names {
        registry.insert(*name);
        registry.mark_running(name);
    }
    CoreRuntime::new(registry, ShutdownCoordinator::new(STOP))
}

fn completed(task: &str, outcome: TaskOutcome) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task: task.to_string(),
        outcome,
    }
}

#[test]
fn host_events_become_fire_commands() {
    init_tracing();
    let mut core = core_with(&["a"]);

    let step = core.step(RuntimeEvent::Tick);
    assert!(step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::FireTick]);

    let key = KeyEvent::press(KeyCode::SPACE);
    let step = core.step(RuntimeEvent::Key(key));
    assert_eq!(step.commands, vec![CoreCommand::FireKey(key)]);
}

#[test]
fn loop_exits_once_last_task_finishes() {
    init_tracing();
    let mut core = core_with(&["a", "b"]);

    let step = core.step(completed("a", TaskOutcome::Returned(None)));
    assert!(step.keep_running);

    let step = core.step(completed("b", TaskOutcome::Failed(anyhow::anyhow!("boom"))));
    assert!(!step.keep_running);

    let summary = core.into_summary();
    assert_eq!(summary.states["a"], TaskState::Completed);
    assert_eq!(summary.states["b"], TaskState::Failed);
    assert_eq!(summary.phase, ShutdownPhase::Idle);
}

#[test]
fn stop_request_cancels_running_tasks_and_arms_timer() {
    init_tracing();
    let mut core = core_with(&["a", "b"]);
    core.step(completed("a", TaskOutcome::Returned(None)));

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(step.keep_running);
    assert_eq!(
        step.commands,
        vec![
            CoreCommand::CancelTasks(vec!["b".to_string()]),
            CoreCommand::ArmShutdownTimer(STOP),
        ]
    );
    assert!(core.registry().is_cancel_requested("b"));

    // A second request while cancelling changes nothing.
    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(step.commands.is_empty());

    let step = core.step(completed("b", TaskOutcome::Cancelled));
    assert!(!step.keep_running);
    assert_eq!(core.coordinator().phase(), ShutdownPhase::AllStopped);

    // A timer that fires after everything stopped is stale.
    let step = core.step(RuntimeEvent::ShutdownTimeoutElapsed);
    assert!(step.commands.is_empty());

    let summary = core.into_summary();
    assert_eq!(summary.states["b"], TaskState::Cancelled);
    assert_eq!(summary.phase, ShutdownPhase::AllStopped);
    assert!(summary.bad_behaving.is_empty());
}

#[test]
fn timeout_marks_stragglers_and_ignores_their_late_completion() {
    init_tracing();
    let mut core = core_with(&["polite", "stubborn"]);

    core.step(RuntimeEvent::ShutdownRequested);
    core.step(completed("polite", TaskOutcome::Cancelled));

    let step = core.step(RuntimeEvent::ShutdownTimeoutElapsed);
    assert!(!step.keep_running);
    assert_eq!(
        step.commands,
        vec![CoreCommand::AbandonTasks(vec!["stubborn".to_string()])]
    );

    // The abandoned task's own result arrives too late to matter.
    core.step(completed("stubborn", TaskOutcome::Returned(None)));

    let summary = core.into_summary();
    assert_eq!(summary.states["polite"], TaskState::Cancelled);
    assert_eq!(summary.states["stubborn"], TaskState::TimedOut);
    assert_eq!(summary.bad_behaving, vec!["stubborn".to_string()]);
    assert_eq!(summary.phase, ShutdownPhase::ForcedStop);
}

#[test]
fn timer_without_a_stop_request_is_ignored() {
    init_tracing();
    let mut core = core_with(&["a"]);

    let step = core.step(RuntimeEvent::ShutdownTimeoutElapsed);
    assert!(step.keep_running);
    assert!(step.commands.is_empty());
    assert_eq!(core.registry().state_of("a"), Some(TaskState::Running));
}

#[test]
fn stop_with_nothing_running_exits_immediately() {
    init_tracing();
    let mut core = core_with(&[]);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
    assert_eq!(core.coordinator().phase(), ShutdownPhase::AllStopped);
}

#[test]
fn panics_and_aborts_are_classified() {
    init_tracing();
    let mut core = core_with(&["p", "x"]);

    core.step(completed("p", TaskOutcome::Panicked("oops".into())));
    core.step(completed("x", TaskOutcome::Aborted));

    let summary = core.into_summary();
    assert_eq!(summary.states["p"], TaskState::Failed);
    assert_eq!(summary.states["x"], TaskState::Cancelled);
}
