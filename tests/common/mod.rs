#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use lookout::mock::{self, Backend};
use lookout::node::ServiceNode;
use lookout::system::{LoadStatus, Status, System, SystemStats};
use lookout::Client;

pub fn stats(id: &str, status: Status, load_status: LoadStatus, cpu: f64) -> SystemStats {
    SystemStats {
        system: System {
            id: id.to_string(),
            name: format!("srv-{}", id),
            host: format!("10.0.0.{}", id),
            port: "45876".to_string(),
            status,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        },
        avg_cpu: cpu,
        avg_mem_pct: 40.0,
        avg_net_sent: 1.0,
        avg_net_recv: 2.0,
        online_users: 25,
        last_update: Some(Utc::now()),
        load_status,
    }
}

pub fn node(name: &str, id: i64, online: i64) -> ServiceNode {
    ServiceNode {
        name: name.to_string(),
        id,
        node_type: "vmess".to_string(),
        online,
        last_update: Utc::now().timestamp(),
    }
}

/// Three systems: 1 healthy, 2 up and under high load, 3 down.
pub async fn fleet() -> (Arc<Backend>, Client) {
    let backend = Arc::new(Backend::new());
    backend
        .add_system(stats("1", Status::Up, LoadStatus::Normal, 20.0))
        .await;
    backend
        .add_system(stats("2", Status::Up, LoadStatus::High, 95.2))
        .await;
    backend
        .add_system(stats("3", Status::Down, LoadStatus::Normal, 0.0))
        .await;
    backend
        .set_nodes("2", vec![node("JP-02", 21, 212), node("JP-03", 22, 128)])
        .await;
    backend.set_nodes("3", vec![node("HK-01", 31, 0)]).await;
    backend.set_nodes("1", vec![node("SG-01", 11, 40)]).await;

    let (base, _handle) = mock::spawn(backend.clone())
        .await
        .expect("mock backend should bind");
    (backend, Client::new(&base))
}
