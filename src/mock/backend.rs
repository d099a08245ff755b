use std::collections::{HashMap, VecDeque};

use axum::http::StatusCode;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::node::{HighLoadNode, NodeLoad, NodeLoadResponse, NodeRef, NodeTag, ServiceNode, SystemNodeInfo};
use crate::system::{
    LoadStatus, Status, System, SystemAlias, SystemStats, SystemSummary, SystemThreshold,
};

/// Oldest requests are dropped past this many.
pub const REQUEST_LOG_CAP: usize = 1024;

/// A canned failure for one request path.
#[derive(Debug, Clone)]
pub struct Fault {
    pub status: StatusCode,
    /// `None` answers with a body that carries no `error` field.
    pub message: Option<String>,
}

/// In-memory stand-in for the monitoring backend.
///
/// Lock order, when more than one is needed: `state`, `faults`, `requests`.
#[derive(Debug, Default)]
pub struct Backend {
    pub(crate) state: Mutex<MockState>,
    faults: Mutex<HashMap<String, Fault>>,
    requests: Mutex<VecDeque<String>>,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub systems: Vec<SystemStats>,
    pub aliases: HashMap<String, SystemAlias>,
    pub tags: Vec<NodeTag>,
    pub thresholds: HashMap<String, SystemThreshold>,
    pub nodes: HashMap<String, Vec<ServiceNode>>,
    next_id: u64,
}

impl MockState {
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn system(&self, id: &str) -> Option<&SystemStats> {
        self.systems.iter().find(|s| s.system.id == id)
    }

    pub fn summary(&self) -> SystemSummary {
        let mut summary = SystemSummary {
            total: self.systems.len() as i64,
            ..Default::default()
        };
        for s in &self.systems {
            match s.system.status {
                Status::Up => summary.online += 1,
                Status::Down => summary.offline += 1,
                Status::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    pub fn node_info(&self, system: &System) -> SystemNodeInfo {
        let nodes = self.nodes.get(&system.id).cloned().unwrap_or_default();
        SystemNodeInfo {
            system_id: system.id.clone(),
            system_name: system.name.clone(),
            alias: self.aliases.get(&system.id).map(|a| a.alias.clone()),
            total_online: nodes.iter().map(|n| n.online).sum(),
            nodes,
        }
    }

    pub fn high_load_nodes(&self) -> Vec<HighLoadNode> {
        self.systems
            .iter()
            .filter(|s| s.load_status == LoadStatus::High || s.system.status != Status::Up)
            .flat_map(|s| self.nodes.get(&s.system.id).cloned().unwrap_or_default())
            .map(|n| HighLoadNode {
                name: n.name,
                node_type: n.node_type,
                id: n.id,
                online: n.online,
            })
            .collect()
    }

    pub fn node_load(&self, node: &NodeRef) -> NodeLoadResponse {
        let tag = self
            .tags
            .iter()
            .find(|t| t.tag_type == node.node_type && t.tag_id == node.id);
        let load_status = match tag.and_then(|t| self.system(&t.system_id)) {
            None => NodeLoad::NotFound,
            Some(s) if s.system.status != Status::Up => NodeLoad::High,
            Some(s) if s.last_update.is_none() => NodeLoad::NoData,
            Some(s) if s.load_status == LoadStatus::High => NodeLoad::High,
            Some(_) => NodeLoad::Normal,
        };
        NodeLoadResponse {
            node_type: node.node_type.clone(),
            id: node.id,
            load_status,
        }
    }
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small fleet for demo mode.
    pub async fn demo() -> Self {
        let backend = Self::new();
        let fleet = [
            ("1", "tokyo-edge-1", "10.0.1.11", Status::Up, LoadStatus::Normal, 37.5, 52.1, 120),
            ("2", "tokyo-edge-2", "10.0.1.12", Status::Up, LoadStatus::High, 95.2, 71.0, 340),
            ("3", "hk-relay-1", "10.0.2.21", Status::Down, LoadStatus::Normal, 0.0, 0.0, 0),
            ("4", "sg-relay-1", "10.0.3.31", Status::Up, LoadStatus::Normal, 12.0, 33.3, 48),
        ];
        for (id, name, host, status, load_status, cpu, mem, users) in fleet {
            backend
                .add_system(SystemStats {
                    system: System {
                        id: id.to_string(),
                        name: name.to_string(),
                        host: host.to_string(),
                        port: "45876".to_string(),
                        status,
                        created_at: Some(Utc::now()),
                        updated_at: Some(Utc::now()),
                    },
                    avg_cpu: cpu,
                    avg_mem_pct: mem,
                    avg_net_sent: 3.2,
                    avg_net_recv: 5.7,
                    online_users: users,
                    last_update: Some(Utc::now()),
                    load_status,
                })
                .await;
        }
        backend
            .set_nodes(
                "2",
                vec![
                    service_node("JP-02 vmess", "vmess", 21, 212),
                    service_node("JP-02 trojan", "trojan", 22, 128),
                ],
            )
            .await;
        backend
            .set_nodes("3", vec![service_node("HK-01 vmess", "vmess", 31, 0)])
            .await;
        backend
            .set_nodes("1", vec![service_node("JP-01 vmess", "vmess", 11, 120)])
            .await;
        backend
    }

    pub async fn add_system(&self, stats: SystemStats) {
        let mut state = self.state.lock().await;
        state.systems.retain(|s| s.system.id != stats.system.id);
        state.systems.push(stats);
    }

    /// Apply `f` to a stored system, e.g. to flip its status between polls.
    pub async fn update_system<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut SystemStats),
    {
        let mut state = self.state.lock().await;
        match state.systems.iter_mut().find(|s| s.system.id == id) {
            Some(s) => {
                f(s);
                true
            }
            None => false,
        }
    }

    pub async fn set_nodes(&self, system_id: &str, nodes: Vec<ServiceNode>) {
        let mut state = self.state.lock().await;
        state.nodes.insert(system_id.to_string(), nodes);
    }

    pub async fn alias(&self, system_id: &str) -> Option<SystemAlias> {
        self.state.lock().await.aliases.get(system_id).cloned()
    }

    pub async fn tags(&self, system_id: &str) -> Vec<NodeTag> {
        let state = self.state.lock().await;
        state
            .tags
            .iter()
            .filter(|t| t.system_id == system_id)
            .cloned()
            .collect()
    }

    pub async fn threshold(&self, system_id: &str) -> Option<SystemThreshold> {
        self.state.lock().await.thresholds.get(system_id).cloned()
    }

    /// Answer every request to `path` (e.g. `/api/systems/summary`) with
    /// `status` until cleared.
    pub async fn fail(&self, path: &str, status: StatusCode, message: Option<&str>) {
        let fault = Fault {
            status,
            message: message.map(str::to_string),
        };
        self.faults.lock().await.insert(path.to_string(), fault);
    }

    pub async fn heal(&self, path: &str) {
        self.faults.lock().await.remove(path);
    }

    pub(crate) async fn fault_for(&self, path: &str) -> Option<Fault> {
        self.faults.lock().await.get(path).cloned()
    }

    pub(crate) async fn record(&self, line: String) {
        let mut requests = self.requests.lock().await;
        if requests.len() == REQUEST_LOG_CAP {
            requests.pop_front();
        }
        requests.push_back(line);
    }

    /// The most recent requests, oldest first, as `"METHOD /path"`.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.iter().cloned().collect()
    }

    pub async fn count(&self, method: &str, path: &str) -> usize {
        let line = format!("{} {}", method, path);
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| **r == line)
            .count()
    }
}

fn service_node(name: &str, node_type: &str, id: i64, online: i64) -> ServiceNode {
    ServiceNode {
        name: name.to_string(),
        id,
        node_type: node_type.to_string(),
        online,
        last_update: Utc::now().timestamp(),
    }
}
