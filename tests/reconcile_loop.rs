//! Reconciliation cycle and loop behaviour.

use std::time::Duration;

use service_watcher::config::CompareMode;
use service_watcher::inventory::{Endpoint, InventoryError};
use service_watcher::lifecycle::startup::build_reconciler;
use service_watcher::lifecycle::Shutdown;
use service_watcher::reconcile::{ApplyOutcome, CycleOutcome, ReconcileLoop, Reconciler};
use service_watcher::reload::{CommandReloader, ReloadError};
use service_watcher::render::{RenderError, WriteError};
use tokio::sync::mpsc;

mod common;
use common::{cluster_ip, load_balancer, RecordingReloader, ScriptedSource, Step, Workspace, TEMPLATE};

fn web() -> Endpoint {
    Endpoint {
        name: "web".into(),
        namespace: "default".into(),
        address: "10.0.0.1".into(),
    }
}

fn setup(
    steps: Vec<Step>,
    reloader: RecordingReloader,
    ws: &Workspace,
) -> (ScriptedSource, Reconciler<ScriptedSource, RecordingReloader>) {
    let source = ScriptedSource::new(steps);
    let reconciler = build_reconciler(source.clone(), reloader, &ws.config());
    (source, reconciler)
}

#[tokio::test]
async fn test_first_cycle_applies_and_identical_cycle_is_noop() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let (_, reconciler) = setup(
        vec![
            Step::Records(vec![load_balancer("web", "10.0.0.1")]),
            Step::Records(vec![load_balancer("web", "10.0.0.1")]),
        ],
        reloader.clone(),
        &ws,
    );

    let (state, outcome) = reconciler.initialize().await.unwrap();
    assert_eq!(state, vec![web()]);
    assert!(outcome.is_reloaded());
    assert_eq!(reloader.count(), 1);
    assert_eq!(
        ws.rendered().unwrap(),
        "server default/web 10.0.0.1\n# 1 services\n"
    );

    ws.clear_output();
    let (state, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::Unchanged));
    assert_eq!(state, vec![web()]);
    assert_eq!(reloader.count(), 1, "no reload for an unchanged set");
    assert!(ws.rendered().is_none(), "no write for an unchanged set");
}

#[tokio::test]
async fn test_type_change_renders_empty_config() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let (_, reconciler) = setup(
        vec![Step::Records(vec![cluster_ip("web", "10.0.0.1")])],
        reloader.clone(),
        &ws,
    );

    let (state, outcome) = reconciler.reconcile(vec![web()]).await;
    assert!(matches!(outcome, CycleOutcome::Applied(ApplyOutcome::Reloaded(_))));
    assert!(state.is_empty());
    assert_eq!(ws.rendered().unwrap(), "# 0 services\n");
    assert_eq!(reloader.count(), 1);
}

#[tokio::test]
async fn test_fetch_failure_keeps_previous_state() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let a = load_balancer("a", "10.0.0.1");
    let b = load_balancer("b", "10.0.0.2");
    let (source, reconciler) = setup(
        vec![
            Step::Records(vec![a.clone()]),
            Step::Records(vec![a.clone(), b.clone()]),
            Step::Fail,
            Step::Records(vec![a, b]),
        ],
        reloader.clone(),
        &ws,
    );

    let (state, _) = reconciler.reconcile(Vec::new()).await;
    let (state, _) = reconciler.reconcile(state).await;
    assert_eq!(state.len(), 2);
    let after_tick_two = state.clone();

    let (state, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::FetchFailed(_)));
    assert_eq!(state, after_tick_two);

    let (state, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::Unchanged));
    assert_eq!(state, after_tick_two);
    assert_eq!(source.fetch_count(), 4);
    assert_eq!(reloader.count(), 2);
}

#[tokio::test]
async fn test_reorder_is_applied_in_strict_mode() {
    // Same members in a new order: strict comparison re-renders and reloads.
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let (_, reconciler) = setup(
        vec![
            Step::Records(vec![load_balancer("a", "10.0.0.1"), load_balancer("b", "10.0.0.2")]),
            Step::Records(vec![load_balancer("b", "10.0.0.2"), load_balancer("a", "10.0.0.1")]),
        ],
        reloader.clone(),
        &ws,
    );

    let (state, _) = reconciler.initialize().await.unwrap();
    let (state, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::Applied(_)));
    assert_eq!(state[0].name, "b");
    assert_eq!(reloader.count(), 2);
    assert!(ws.rendered().unwrap().starts_with("server default/b"));
}

#[tokio::test]
async fn test_reorder_is_ignored_in_normalized_mode() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let source = ScriptedSource::new(vec![
        Step::Records(vec![load_balancer("a", "10.0.0.1"), load_balancer("b", "10.0.0.2")]),
        Step::Records(vec![load_balancer("b", "10.0.0.2"), load_balancer("a", "10.0.0.1")]),
    ]);
    let mut config = ws.config();
    config.sync.compare = CompareMode::Normalized;
    let reconciler = build_reconciler(source, reloader.clone(), &config);

    let (state, _) = reconciler.initialize().await.unwrap();
    let (state, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::Unchanged));
    assert_eq!(state[0].name, "a", "state keeps the applied order");
    assert_eq!(reloader.count(), 1);
}

#[tokio::test]
async fn test_failed_reload_is_not_retried_for_same_set() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::failing();
    let (_, reconciler) = setup(
        vec![Step::Records(vec![load_balancer("web", "10.0.0.1")])],
        reloader.clone(),
        &ws,
    );

    let (state, outcome) = reconciler.reconcile(Vec::new()).await;
    assert!(matches!(
        outcome,
        CycleOutcome::Applied(ApplyOutcome::ReloadFailed(_))
    ));
    assert_eq!(state, vec![web()]);
    assert!(ws.rendered().is_some(), "config is written before the reload");

    let (_, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::Unchanged));
    assert_eq!(reloader.count(), 1);
}

#[tokio::test]
async fn test_render_failure_skips_write_and_reload() {
    let ws = Workspace::new("{% for s in services %}{{ s.port }}{% endfor %}");
    let reloader = RecordingReloader::default();
    let (_, reconciler) = setup(
        vec![
            Step::Records(vec![load_balancer("web", "10.0.0.1")]),
            Step::Records(vec![load_balancer("web", "10.0.0.1")]),
        ],
        reloader.clone(),
        &ws,
    );

    let (state, outcome) = reconciler.reconcile(Vec::new()).await;
    match outcome {
        CycleOutcome::Applied(ApplyOutcome::RenderFailed(RenderError::Template(_))) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(state, vec![web()], "state advances despite the failure");
    assert!(ws.rendered().is_none());
    assert_eq!(reloader.count(), 0);

    let (_, outcome) = reconciler.reconcile(state).await;
    assert!(matches!(outcome, CycleOutcome::Unchanged));
}

#[tokio::test]
async fn test_missing_template_is_a_render_failure() {
    let ws = Workspace::new(TEMPLATE);
    std::fs::remove_file(&ws.template).unwrap();
    let reloader = RecordingReloader::default();
    let (_, reconciler) = setup(vec![Step::Records(vec![load_balancer("web", "1.2.3.4")])], reloader.clone(), &ws);

    let (_, outcome) = reconciler.reconcile(Vec::new()).await;
    assert!(matches!(
        outcome,
        CycleOutcome::Applied(ApplyOutcome::RenderFailed(RenderError::Load { .. }))
    ));
    assert_eq!(reloader.count(), 0);
}

#[tokio::test]
async fn test_write_failure_skips_reload() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let source = ScriptedSource::new(vec![Step::Records(vec![load_balancer("web", "10.0.0.1")])]);
    let mut config = ws.config();
    config.template.output = ws.dir.path().join("missing").join("config.conf");
    let reconciler = build_reconciler(source, reloader.clone(), &config);

    let (state, outcome) = reconciler.reconcile(Vec::new()).await;
    assert!(matches!(
        outcome,
        CycleOutcome::Applied(ApplyOutcome::WriteFailed(WriteError::Io { .. }))
    ));
    assert_eq!(state.len(), 1);
    assert_eq!(reloader.count(), 0);
}

#[tokio::test]
async fn test_hung_fetch_hits_deadline() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let source = ScriptedSource::new(vec![Step::Hang]);
    let reconciler = build_reconciler(source, reloader.clone(), &ws.config())
        .with_fetch_timeout(Duration::from_millis(50));

    let (state, outcome) = reconciler.reconcile(vec![web()]).await;
    match outcome {
        CycleOutcome::FetchFailed(InventoryError::Timeout(d)) => {
            assert_eq!(d, Duration::from_millis(50))
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(state, vec![web()]);
    assert_eq!(reloader.count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_loop_survives_missing_reload_command() {
    let ws = Workspace::new(TEMPLATE);
    let source = ScriptedSource::new(vec![
        Step::Records(vec![load_balancer("a", "10.0.0.1")]),
        Step::Records(vec![load_balancer("b", "10.0.0.2")]),
        Step::Records(vec![load_balancer("c", "10.0.0.3")]),
    ]);
    let reloader = CommandReloader::new(ws.dir.path().join("no-such-reload.sh"), Duration::from_secs(1));
    let reconciler = build_reconciler(source.clone(), reloader, &ws.config());

    let outcome = reconciler.apply(&[web()]).await;
    assert!(matches!(
        outcome,
        ApplyOutcome::ReloadFailed(ReloadError::Spawn { .. })
    ));

    let shutdown = Shutdown::new();
    let reconcile_loop = ReconcileLoop::new(reconciler, Duration::from_millis(30));
    let handle = tokio::spawn(reconcile_loop.run(Vec::new(), shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(400)).await;
    shutdown.trigger();
    let state = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop should stop after shutdown")
        .unwrap();

    assert!(source.fetch_count() >= 3, "loop kept ticking after reload failures");
    assert_eq!(state[0].name, "c");
    assert!(ws.rendered().unwrap().contains("default/c"));
}

#[tokio::test]
async fn test_template_change_reapplies_current_state() {
    let ws = Workspace::new(TEMPLATE);
    let reloader = RecordingReloader::default();
    let (source, reconciler) = setup(Vec::new(), reloader.clone(), &ws);

    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let reconcile_loop = ReconcileLoop::new(reconciler, Duration::from_secs(3600))
        .with_template_changes(rx);
    let handle = tokio::spawn(reconcile_loop.run(vec![web()], shutdown.subscribe()));

    std::fs::write(&ws.template, "{% for s in services %}{{ s.name }}{% endfor %}\n").unwrap();
    tx.send(()).unwrap();
    tx.send(()).unwrap();

    let mut waited = 0;
    while reloader.count() == 0 && waited < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }
    shutdown.trigger();
    let state = handle.await.unwrap();

    assert_eq!(state, vec![web()]);
    assert_eq!(ws.rendered().unwrap(), "web\n");
    assert_eq!(source.fetch_count(), 0, "template changes do not fetch");
    assert_eq!(reloader.count(), 1, "burst of changes collapses into one apply");
}

#[tokio::test]
async fn test_huge_period_does_not_panic() {
    let ws = Workspace::new(TEMPLATE);
    let (source, reconciler) = setup(Vec::new(), RecordingReloader::default(), &ws);

    let shutdown = Shutdown::new();
    let reconcile_loop = ReconcileLoop::new(reconciler, Duration::from_secs(u64::MAX));
    let handle = tokio::spawn(reconcile_loop.run(vec![web()], shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();
    let state = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop should stop after shutdown")
        .expect("loop task should not panic");

    assert_eq!(state, vec![web()]);
    assert_eq!(source.fetch_count(), 0);
}
