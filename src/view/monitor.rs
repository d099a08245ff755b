use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::row::SystemRow;
use super::slice::Slice;
use super::store::ViewStore;
use super::View;
use crate::client::Client;
use crate::system::{SystemStats, SystemSummary};

/// Every system with its averaged metrics, plus the backend's counts.
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    pub systems: Slice<Vec<SystemStats>>,
    pub summary: Slice<SystemSummary>,
    pub last_update: Option<DateTime<Utc>>,
}

impl MonitorSnapshot {
    pub fn rows(&self) -> Vec<SystemRow> {
        self.systems.value.iter().map(SystemRow::from).collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.systems
            .error
            .as_deref()
            .or(self.summary.error.as_deref())
    }

    pub fn is_loading(&self) -> bool {
        !self.systems.is_loaded() && self.systems.error.is_none()
    }
}

#[derive(Debug)]
pub struct MonitorView {
    client: Client,
    store: ViewStore<MonitorSnapshot>,
}

impl MonitorView {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(MonitorView {
            client,
            store: ViewStore::new("monitor", MonitorSnapshot::default()),
        })
    }

    pub fn snapshot(&self) -> Arc<MonitorSnapshot> {
        self.store.snapshot()
    }
}

impl View for MonitorView {
    const NAME: &'static str = "monitor";

    async fn refresh(&self) -> bool {
        let generation = self.store.begin();
        let (systems, summary) =
            tokio::join!(self.client.systems_stats(), self.client.systems_summary());

        if let Err(e) = &systems {
            warn!("[MONITOR] stats fetch #{} failed: {}", generation, e);
        }
        if let Err(e) = &summary {
            warn!("[MONITOR] summary fetch #{} failed: {}", generation, e);
        }

        let changed = self.store.update(|cur| {
            let next_systems = cur.systems.applied(generation, &systems);
            let next_summary = cur.summary.applied(generation, &summary);
            if next_systems.is_none() && next_summary.is_none() {
                return None;
            }
            let any_ok = systems.is_ok() || summary.is_ok();
            Some(MonitorSnapshot {
                systems: next_systems.unwrap_or_else(|| cur.systems.clone()),
                summary: next_summary.unwrap_or_else(|| cur.summary.clone()),
                last_update: if any_ok { Some(Utc::now()) } else { cur.last_update },
            })
        });
        debug!("[MONITOR] refresh #{} applied: {}", generation, changed);
        changed
    }

    fn teardown(&self) {
        self.store.teardown();
    }
}
