mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use lookout::node::NodeRef;
use lookout::system::Status;
use lookout::Error;

#[tokio::test]
async fn lists_systems_and_stats() {
    let (_backend, client) = common::fleet().await;

    let systems = client.list_systems().await.unwrap();
    assert_eq!(systems.len(), 3);
    assert_eq!(systems[2].status, Status::Down);

    let stats = client.systems_stats().await.unwrap();
    let high = stats.iter().find(|s| s.system.id == "2").unwrap();
    assert_eq!(high.avg_cpu, 95.2);
    assert_eq!(high.net_sent_mbps(), 8.0);
}

#[tokio::test]
async fn alias_round_trip() {
    let (_backend, client) = common::fleet().await;
    assert!(client.get_alias("1").await.unwrap().is_none());

    let saved = client.put_alias("1", "edge").await.unwrap().unwrap();
    assert_eq!(saved.system_id, "1");
    assert_eq!(client.get_alias("1").await.unwrap().unwrap().alias, "edge");

    client.delete_alias("1").await.unwrap();
    let again = client.delete_alias("1").await;
    assert_matches!(again, Err(Error::StatusCodeError(StatusCode::NOT_FOUND, m)) if m == "alias not found");
}

#[tokio::test]
async fn alias_for_unknown_system_is_not_found() {
    let (_backend, client) = common::fleet().await;
    let err = client.put_alias("42", "ghost").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "system not found");
}

#[tokio::test]
async fn remove_missing_tag_is_not_found() {
    let (_backend, client) = common::fleet().await;
    let err = client
        .remove_tag("1", &NodeRef::new("vmess", 5))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn thresholds_list_only_stored_entries() {
    let (_backend, client) = common::fleet().await;
    assert!(client.list_thresholds().await.unwrap().is_empty());

    let mut t = client.get_threshold("3").await.unwrap();
    t.cpu_alert_limit = 70.0;
    client.put_threshold("3", &t).await.unwrap();

    let all = client.list_thresholds().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].system_id, "3");
    assert_eq!(all[0].cpu_alert_limit, 70.0);

    client.delete_threshold("3").await.unwrap();
    assert!(client.list_thresholds().await.unwrap().is_empty());
}

#[tokio::test]
async fn nodes_for_unknown_system_is_not_found() {
    let (_backend, client) = common::fleet().await;
    assert!(client.system_nodes("9").await.unwrap_err().is_not_found());

    let info = client.system_nodes("2").await.unwrap();
    assert_eq!(info.total_online, 340);
    assert_eq!(info.nodes.len(), 2);
}

#[tokio::test]
async fn fallback_message_per_operation() {
    let (backend, client) = common::fleet().await;
    backend
        .fail("/api/systems/1/tags", StatusCode::INTERNAL_SERVER_ERROR, None)
        .await;

    let err = client.add_tag("1", &NodeRef::new("vmess", 1)).await.unwrap_err();
    assert_eq!(err.message(), "failed to add tag");
    let err = client.get_tags("1").await.unwrap_err();
    assert_eq!(err.message(), "failed to fetch tags");
}

#[tokio::test]
async fn reserved_characters_in_system_id_stay_in_one_segment() {
    let (backend, client) = common::fleet().await;
    backend
        .add_system(common::stats("eu/1?x", Status::Up, lookout::system::LoadStatus::Normal, 10.0))
        .await;

    client.put_alias("eu/1?x", "Frankfurt").await.unwrap();
    assert_eq!(backend.alias("eu/1?x").await.unwrap().alias, "Frankfurt");
    assert_eq!(backend.count("PUT", "/api/systems/eu%2F1%3Fx/alias").await, 1);
    assert!(client.get_threshold("eu/1?x").await.is_ok());
}
