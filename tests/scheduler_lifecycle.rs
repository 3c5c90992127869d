mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{fake_scripts, init_tracing, settle, start_domain, unit};

use std::sync::Arc;
use std::time::Duration;

use scripthook::engine::{Registry, RuntimeEvent, ShutdownPhase, TaskState};
use scripthook::events::{Events, KeyCode, KeyEvent, KeyFilter};
use scripthook::exec::{ScriptContext, Scheduler};
use scripthook::loader::{NoopInstaller, ScriptCatalog, ScriptFn, ScriptLoader, ScriptResult};

const STOP: Duration = Duration::from_secs(1);

#[tokio::test]
async fn units_without_entry_points_yield_an_idle_registry() {
    init_tracing();
    let mut catalog = ScriptCatalog::new();
    catalog.declare("one").declare("two").declare("three");
    let config = ConfigFileBuilder::new().build();

    let units = ScriptLoader::new(&catalog, &config, &NoopInstaller).discover();
    assert!(units.is_empty());

    let mut scheduler = Scheduler::new(Arc::new(Events::new()));
    let registry = scheduler.start(units);
    assert!(registry.is_empty());
    assert!(registry.is_idle());
    assert!(scheduler.is_empty());
}

#[tokio::test]
async fn runtime_with_no_tasks_completes_immediately() {
    let domain = start_domain(Vec::new(), STOP);
    let summary = domain.finish().await;
    assert!(summary.states.is_empty());
    assert_eq!(summary.phase, ShutdownPhase::Idle);
}

#[tokio::test]
async fn returning_task_is_completed_and_runtime_goes_idle() {
    init_tracing();
    let domain = start_domain(vec![unit("helper", fake_scripts::returns("ready"))], STOP);

    // No shutdown request: the runtime exits once every task finished.
    let summary = domain.finish().await;
    assert_eq!(summary.states.get("helper"), Some(&TaskState::Completed));
    assert!(summary.bad_behaving.is_empty());
    assert_eq!(summary.phase, ShutdownPhase::Idle);
}

#[tokio::test]
async fn failing_and_panicking_scripts_do_not_affect_others() {
    init_tracing();
    let domain = start_domain(
        vec![
            unit("fails", ScriptFn::arc(fake_scripts::fails)),
            unit("panics", ScriptFn::arc(fake_scripts::panics)),
            unit("fine", fake_scripts::returns("ok")),
        ],
        STOP,
    );

    let summary = domain.finish().await;
    assert_eq!(summary.states.get("fails"), Some(&TaskState::Failed));
    assert_eq!(summary.states.get("panics"), Some(&TaskState::Failed));
    assert_eq!(summary.states.get("fine"), Some(&TaskState::Completed));
}

async fn first_key(ctx: ScriptContext) -> ScriptResult {
    let event = ctx.key(KeyFilter::any().code(KeyCode::ADD)).await?;
    Ok(Some(event.code.to_string()))
}

#[tokio::test]
async fn host_events_are_fired_inside_the_domain() {
    init_tracing();
    let domain = start_domain(vec![unit("listener", ScriptFn::arc(first_key))], STOP);
    settle().await;

    domain.tx.send(RuntimeEvent::Tick).unwrap();
    domain
        .tx
        .send(RuntimeEvent::Key(KeyEvent::release(KeyCode::ADD)))
        .unwrap();

    let summary = domain.finish().await;
    assert_eq!(summary.states.get("listener"), Some(&TaskState::Completed));
}

#[test]
fn registry_records_terminal_state_exactly_once() {
    let mut registry = Registry::new();
    assert!(registry.insert("a"));
    assert!(!registry.insert("a"));
    assert_eq!(registry.state_of("a"), Some(TaskState::Pending));

    registry.mark_running("a");
    assert_eq!(registry.state_of("a"), Some(TaskState::Running));
    assert!(!registry.is_idle());

    assert!(registry.complete("a", TaskState::Completed));
    assert!(!registry.complete("a", TaskState::Failed));
    assert!(!registry.complete("a", TaskState::TimedOut));
    assert_eq!(registry.state_of("a"), Some(TaskState::Completed));
    assert!(registry.is_idle());
}

#[test]
fn cancellation_flag_is_monotonic() {
    let mut registry = Registry::new();
    registry.insert("a");
    registry.mark_running("a");
    assert!(!registry.is_cancel_requested("a"));

    registry.request_cancel(&["a".to_string()]);
    assert!(registry.is_cancel_requested("a"));

    registry.complete("a", TaskState::Cancelled);
    assert!(registry.is_cancel_requested("a"));
}
