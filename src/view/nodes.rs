use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use super::slice::Slice;
use super::store::ViewStore;
use super::View;
use crate::client::Client;
use crate::node::SystemNodeInfo;
use crate::system::{System, SystemAlias};

/// A system with its alias and node info. Lookups that failed show up as
/// "no alias" and "no nodes".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SystemEntry {
    pub system: System,
    pub alias: Option<SystemAlias>,
    pub nodes: SystemNodeInfo,
}

impl SystemEntry {
    pub fn display_name(&self) -> &str {
        match &self.alias {
            Some(a) if !a.alias.trim().is_empty() => &a.alias,
            _ => &self.system.name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodesSnapshot {
    pub systems: Slice<Vec<SystemEntry>>,
}

impl NodesSnapshot {
    pub fn total_online(&self) -> i64 {
        self.systems.value.iter().map(|e| e.nodes.total_online).sum()
    }

    pub fn entry(&self, system_id: &str) -> Option<&SystemEntry> {
        self.systems.value.iter().find(|e| e.system.id == system_id)
    }
}

#[derive(Debug)]
pub struct NodesView {
    client: Client,
    store: ViewStore<NodesSnapshot>,
}

impl NodesView {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(NodesView {
            client,
            store: ViewStore::new("nodes", NodesSnapshot::default()),
        })
    }

    pub fn snapshot(&self) -> Arc<NodesSnapshot> {
        self.store.snapshot()
    }

    async fn entry(&self, system: System) -> SystemEntry {
        let (alias, nodes) = tokio::join!(
            self.client.get_alias(&system.id),
            self.client.system_nodes(&system.id)
        );

        let alias = alias.unwrap_or_else(|e| {
            warn!("[NODES] alias lookup for {} failed: {}", system.id, e);
            None
        });
        let nodes = nodes.unwrap_or_else(|e| {
            warn!("[NODES] node lookup for {} failed: {}", system.id, e);
            SystemNodeInfo::empty(&system.id, &system.name)
        });

        SystemEntry {
            system,
            alias,
            nodes,
        }
    }
}

impl View for NodesView {
    const NAME: &'static str = "nodes";

    async fn refresh(&self) -> bool {
        let generation = self.store.begin();
        let entries = match self.client.list_systems().await {
            Ok(systems) => Ok(join_all(systems.into_iter().map(|s| self.entry(s))).await),
            Err(e) => {
                warn!("[NODES] system list fetch #{} failed: {}", generation, e);
                Err(e)
            }
        };

        let changed = self.store.update(|cur| {
            cur.systems
                .applied(generation, &entries)
                .map(|systems| NodesSnapshot { systems })
        });
        debug!("[NODES] refresh #{} applied: {}", generation, changed);
        changed
    }

    fn teardown(&self) {
        self.store.teardown();
    }
}
