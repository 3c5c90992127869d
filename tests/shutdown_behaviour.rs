mod common;
use crate::common::{fake_scripts, init_tracing, settle, start_domain, unit};

use std::time::{Duration, Instant};

use scripthook::engine::{ShutdownPhase, TaskState};
use scripthook::loader::ScriptFn;

#[tokio::test]
async fn cooperative_script_ends_cancelled() {
    init_tracing();
    let domain = start_domain(
        vec![unit("coop", ScriptFn::arc(fake_scripts::cooperative))],
        Duration::from_secs(1),
    );
    settle().await;

    domain.shutdown();
    let summary = domain.finish().await;

    assert_eq!(summary.states.get("coop"), Some(&TaskState::Cancelled));
    assert!(summary.bad_behaving.is_empty());
    assert_eq!(summary.phase, ShutdownPhase::AllStopped);
}

#[tokio::test]
async fn script_may_clean_up_after_cancellation() {
    init_tracing();
    let domain = start_domain(
        vec![unit("tidy", ScriptFn::arc(fake_scripts::cleans_up))],
        Duration::from_secs(1),
    );
    settle().await;

    domain.shutdown();
    let summary = domain.finish().await;
    assert_eq!(summary.states.get("tidy"), Some(&TaskState::Completed));
}

#[tokio::test]
async fn script_ignoring_cancellation_is_timed_out_and_reported() {
    init_tracing();
    let stop_timeout = Duration::from_millis(100);
    let domain = start_domain(
        vec![
            unit("coop", ScriptFn::arc(fake_scripts::cooperative)),
            unit("stubborn", ScriptFn::arc(fake_scripts::ignores_cancel)),
        ],
        stop_timeout,
    );
    settle().await;

    let started = Instant::now();
    domain.shutdown();
    let summary = domain.finish().await;
    let elapsed = started.elapsed();

    assert!(elapsed >= stop_timeout, "forced stop before the timeout: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "shutdown took {elapsed:?}");
    assert_eq!(summary.states.get("coop"), Some(&TaskState::Cancelled));
    assert_eq!(summary.states.get("stubborn"), Some(&TaskState::TimedOut));
    assert_eq!(summary.bad_behaving, vec!["stubborn".to_string()]);
    assert_eq!(summary.phase, ShutdownPhase::ForcedStop);
}

#[tokio::test]
async fn script_swallowing_cancellation_still_times_out() {
    init_tracing();
    let stop_timeout = Duration::from_millis(100);
    let domain = start_domain(
        vec![unit("swallow", ScriptFn::arc(fake_scripts::swallows_cancel))],
        stop_timeout,
    );
    settle().await;

    let started = Instant::now();
    domain.shutdown();
    let summary = domain.finish().await;

    assert!(started.elapsed() >= stop_timeout);
    assert_eq!(summary.states.get("swallow"), Some(&TaskState::TimedOut));
    assert_eq!(summary.bad_behaving, vec!["swallow".to_string()]);
    assert_eq!(summary.phase, ShutdownPhase::ForcedStop);
}

#[tokio::test]
async fn closing_the_host_channel_stops_the_domain() {
    init_tracing();
    let domain = start_domain(
        vec![unit("coop", ScriptFn::arc(fake_scripts::cooperative))],
        Duration::from_secs(1),
    );
    settle().await;

    let common::TestDomain { tx, handle, .. } = domain;
    drop(tx);

    let summary = common::with_timeout(handle).await.unwrap();
    assert_eq!(summary.states.get("coop"), Some(&TaskState::Cancelled));
}
