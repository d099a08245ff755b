use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::row::SystemRow;
use super::slice::Slice;
use super::store::ViewStore;
use super::View;
use crate::client::Client;
use crate::error::Result;
use crate::node::HighLoadNode;
use crate::system::{classify_stats, LoadClass, Status, SystemStats};

/// Counts over the flagged systems. `high_load + offline + unknown == flagged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighLoadSummary {
    pub flagged: usize,
    /// Up, and the backend says high.
    pub high_load: usize,
    /// Status `down`.
    pub offline: usize,
    /// Neither up nor down.
    pub unknown: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HighLoadSnapshot {
    /// Only systems that are not up or are under high load.
    pub systems: Slice<Vec<SystemStats>>,
    pub nodes: Slice<Vec<HighLoadNode>>,
    pub last_update: Option<DateTime<Utc>>,
}

impl HighLoadSnapshot {
    pub fn summary(&self) -> HighLoadSummary {
        summarize(&self.systems.value)
    }

    pub fn rows(&self) -> Vec<SystemRow> {
        self.systems.value.iter().map(SystemRow::from).collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.systems
            .error
            .as_deref()
            .or(self.nodes.error.as_deref())
    }

    pub fn all_clear(&self) -> bool {
        self.systems.is_loaded() && self.systems.value.is_empty()
    }
}

pub fn is_flagged(stats: &SystemStats) -> bool {
    classify_stats(stats) != LoadClass::Normal
}

pub fn summarize(flagged: &[SystemStats]) -> HighLoadSummary {
    let mut summary = HighLoadSummary::default();
    for s in flagged.iter().filter(|s| is_flagged(s)) {
        summary.flagged += 1;
        match s.system.status {
            Status::Up => summary.high_load += 1,
            Status::Down => summary.offline += 1,
            Status::Unknown => summary.unknown += 1,
        }
    }
    summary
}

#[derive(Debug)]
pub struct HighLoadView {
    client: Client,
    store: ViewStore<HighLoadSnapshot>,
}

impl HighLoadView {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(HighLoadView {
            client,
            store: ViewStore::new("high-load", HighLoadSnapshot::default()),
        })
    }

    pub fn snapshot(&self) -> Arc<HighLoadSnapshot> {
        self.store.snapshot()
    }

    async fn flagged_systems(&self) -> Result<Vec<SystemStats>> {
        let all = self.client.systems_stats().await?;
        Ok(all.into_iter().filter(is_flagged).collect())
    }
}

impl View for HighLoadView {
    const NAME: &'static str = "high-load";

    async fn refresh(&self) -> bool {
        let generation = self.store.begin();
        let (systems, nodes) = tokio::join!(self.flagged_systems(), self.client.high_load_nodes());

        if let Err(e) = &systems {
            warn!("[HIGHLOAD] stats fetch #{} failed: {}", generation, e);
        }
        if let Err(e) = &nodes {
            warn!("[HIGHLOAD] node fetch #{} failed: {}", generation, e);
        }

        let changed = self.store.update(|cur| {
            let next_systems = cur.systems.applied(generation, &systems);
            let next_nodes = cur.nodes.applied(generation, &nodes);
            if next_systems.is_none() && next_nodes.is_none() {
                return None;
            }
            let any_ok = systems.is_ok() || nodes.is_ok();
            Some(HighLoadSnapshot {
                systems: next_systems.unwrap_or_else(|| cur.systems.clone()),
                nodes: next_nodes.unwrap_or_else(|| cur.nodes.clone()),
                last_update: if any_ok { Some(Utc::now()) } else { cur.last_update },
            })
        });
        debug!("[HIGHLOAD] refresh #{} applied: {}", generation, changed);
        changed
    }

    fn teardown(&self) {
        self.store.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{LoadStatus, System};

    fn stats(id: &str, status: Status, load_status: LoadStatus) -> SystemStats {
        SystemStats {
            system: System {
                id: id.into(),
                status,
                ..Default::default()
            },
            load_status,
            ..Default::default()
        }
    }

    #[test]
    fn summary_parts_add_up() {
        let systems = vec![
            stats("1", Status::Up, LoadStatus::High),
            stats("2", Status::Down, LoadStatus::Normal),
            stats("3", Status::Unknown, LoadStatus::High),
            stats("4", Status::Up, LoadStatus::Normal),
            stats("5", Status::Down, LoadStatus::High),
        ];
        let s = summarize(&systems);
        assert_eq!(s.flagged, 4);
        assert_eq!(s.high_load, 1);
        assert_eq!(s.offline, 2);
        assert_eq!(s.unknown, 1);
        assert_eq!(s.high_load + s.offline + s.unknown, s.flagged);
    }

    #[test]
    fn healthy_systems_are_not_flagged() {
        assert!(!is_flagged(&stats("1", Status::Up, LoadStatus::Normal)));
        assert!(!is_flagged(&stats("1", Status::Up, LoadStatus::Unknown)));
        assert!(is_flagged(&stats("1", Status::Up, LoadStatus::High)));
        assert!(is_flagged(&stats("1", Status::Down, LoadStatus::Normal)));
    }
}
