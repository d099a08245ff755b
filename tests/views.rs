mod common;

use std::time::Duration;

use axum::http::StatusCode;
use lookout::system::{LoadClass, Status};
use lookout::view::{self, HighLoadView, MonitorView, NodesView, View};

#[tokio::test]
async fn monitor_merges_stats_and_summary() {
    let (_backend, client) = common::fleet().await;
    let view = MonitorView::new(client);

    assert!(view.snapshot().is_loading());
    assert!(view.refresh().await);

    let snap = view.snapshot();
    assert_eq!(snap.systems.value.len(), 3);
    assert_eq!(snap.summary.value.total, 3);
    assert_eq!(snap.summary.value.online, 2);
    assert_eq!(snap.summary.value.offline, 1);
    assert!(snap.error().is_none());
    assert!(snap.last_update.is_some());

    let rows = snap.rows();
    let high = rows.iter().find(|r| r.id == "2").unwrap();
    assert_eq!(high.load, LoadClass::High);
    assert!(high.reason.contains("CPU: 95.2%"));
    let down = rows.iter().find(|r| r.id == "3").unwrap();
    assert_eq!(down.load, LoadClass::Offline);
}

#[tokio::test]
async fn failing_summary_keeps_stats_and_last_good_summary() {
    let (backend, client) = common::fleet().await;
    let view = MonitorView::new(client);
    view.refresh().await;

    backend
        .fail("/api/systems/summary", StatusCode::SERVICE_UNAVAILABLE, Some("redis down"))
        .await;
    backend
        .update_system("1", |s| s.avg_cpu = 55.0)
        .await;
    view.refresh().await;

    let snap = view.snapshot();
    // stats slice moved on
    assert!(snap.systems.is_ok());
    let one = snap.systems.value.iter().find(|s| s.system.id == "1").unwrap();
    assert_eq!(one.avg_cpu, 55.0);
    // summary slice kept its last good value
    assert_eq!(snap.summary.value.total, 3);
    assert_eq!(snap.summary.error.as_deref(), Some("redis down"));
    assert_eq!(snap.error(), Some("redis down"));

    backend.heal("/api/systems/summary").await;
    view.refresh().await;
    assert!(view.snapshot().error().is_none());
}

#[tokio::test]
async fn unstructured_failure_uses_generic_message() {
    let (backend, client) = common::fleet().await;
    let view = MonitorView::new(client);

    backend
        .fail("/api/systems/stats", StatusCode::BAD_GATEWAY, None)
        .await;
    view.refresh().await;

    let snap = view.snapshot();
    assert!(snap.systems.value.is_empty());
    assert_eq!(snap.systems.error.as_deref(), Some("failed to fetch system stats"));
    assert_eq!(snap.summary.value.total, 3);
}

#[tokio::test]
async fn not_found_clears_the_slice() {
    let (backend, client) = common::fleet().await;
    let view = MonitorView::new(client);
    view.refresh().await;
    assert_eq!(view.snapshot().systems.value.len(), 3);

    backend
        .fail("/api/systems/stats", StatusCode::NOT_FOUND, Some("no such route"))
        .await;
    view.refresh().await;

    let snap = view.snapshot();
    assert!(snap.systems.value.is_empty());
    assert_eq!(snap.summary.value.total, 3);
}

#[tokio::test]
async fn high_load_view_lists_flagged_systems_and_nodes() {
    let (_backend, client) = common::fleet().await;
    let view = HighLoadView::new(client);
    view.refresh().await;

    let snap = view.snapshot();
    let mut ids: Vec<_> = snap.systems.value.iter().map(|s| s.system.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec!["2", "3"]);

    let summary = snap.summary();
    assert_eq!(summary.flagged, 2);
    assert_eq!(summary.high_load, 1);
    assert_eq!(summary.offline, 1);
    assert_eq!(summary.unknown, 0);

    let mut names: Vec<_> = snap.nodes.value.iter().map(|n| n.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["HK-01", "JP-02", "JP-03"]);
    assert!(!snap.all_clear());
}

#[tokio::test]
async fn high_load_nodes_failure_does_not_blank_systems() {
    let (backend, client) = common::fleet().await;
    let view = HighLoadView::new(client);

    backend
        .fail("/api/nodes/load-status", StatusCode::SERVICE_UNAVAILABLE, Some("node service unavailable"))
        .await;
    view.refresh().await;

    let snap = view.snapshot();
    assert_eq!(snap.systems.value.len(), 2);
    assert!(snap.systems.is_ok());
    assert!(snap.nodes.value.is_empty());
    assert_eq!(snap.nodes.error.as_deref(), Some("node service unavailable"));
}

#[tokio::test]
async fn all_clear_when_nothing_is_flagged() {
    let (backend, client) = common::fleet().await;
    backend
        .update_system("2", |s| s.load_status = lookout::system::LoadStatus::Normal)
        .await;
    backend.update_system("3", |s| s.system.status = Status::Up).await;

    let view = HighLoadView::new(client);
    view.refresh().await;
    let snap = view.snapshot();
    assert!(snap.all_clear());
    assert_eq!(snap.summary().flagged, 0);
}

#[tokio::test]
async fn nodes_view_tolerates_per_system_failures() {
    let (backend, client) = common::fleet().await;
    client.put_alias("1", "Singapore").await.unwrap();
    backend
        .fail("/api/systems/2/nodes", StatusCode::INTERNAL_SERVER_ERROR, Some("redis down"))
        .await;
    backend
        .fail("/api/systems/3/alias", StatusCode::INTERNAL_SERVER_ERROR, None)
        .await;

    let view = NodesView::new(client);
    assert!(view.refresh().await);
    let snap = view.snapshot();

    assert_eq!(snap.systems.value.len(), 3);
    assert!(snap.systems.is_ok());

    let one = snap.entry("1").unwrap();
    assert_eq!(one.display_name(), "Singapore");
    assert_eq!(one.nodes.total_online, 40);

    let two = snap.entry("2").unwrap();
    assert!(two.nodes.nodes.is_empty());
    assert_eq!(two.nodes.system_name, "srv-2");

    let three = snap.entry("3").unwrap();
    assert!(three.alias.is_none());
    assert_eq!(three.display_name(), "srv-3");
    assert_eq!(three.nodes.nodes.len(), 1);

    assert_eq!(snap.total_online(), 40);
}

#[tokio::test]
async fn nodes_view_keeps_last_list_when_listing_fails() {
    let (backend, client) = common::fleet().await;
    let view = NodesView::new(client);
    view.refresh().await;

    backend
        .fail("/api/systems", StatusCode::INTERNAL_SERVER_ERROR, Some("database locked"))
        .await;
    view.refresh().await;

    let snap = view.snapshot();
    assert_eq!(snap.systems.value.len(), 3);
    assert_eq!(snap.systems.error.as_deref(), Some("database locked"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let view = MonitorView::new(lookout::Client::new("http://127.0.0.1:1/api"));
    view.refresh().await;
    let snap = view.snapshot();
    assert!(snap.systems.value.is_empty());
    assert!(snap.error().unwrap().starts_with("error reaching backend"));
}

#[tokio::test]
async fn mounted_view_polls_until_unmounted() {
    let (backend, client) = common::fleet().await;
    let mounted = view::mount(MonitorView::new(client), Duration::from_millis(50));

    tokio::time::sleep(Duration::from_millis(180)).await;
    let view = mounted.view().clone();
    assert!(mounted.ticks() >= 3);
    assert_eq!(view.snapshot().systems.value.len(), 3);

    mounted.unmount().await;
    // let ticks spawned before the stop settle
    tokio::time::sleep(Duration::from_millis(100)).await;
    let seen = backend.count("GET", "/api/systems/stats").await;

    // a refresh finishing after teardown never lands
    backend.update_system("1", |s| s.avg_cpu = 99.0).await;
    assert!(!view.refresh().await);
    let one_cpu = view
        .snapshot()
        .systems
        .value
        .iter()
        .find(|s| s.system.id == "1")
        .map(|s| s.avg_cpu);
    assert_eq!(one_cpu, Some(20.0));

    tokio::time::sleep(Duration::from_millis(200)).await;
    // only the manual refresh above reached the backend
    assert_eq!(backend.count("GET", "/api/systems/stats").await, seen + 1);
}
