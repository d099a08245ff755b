use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Connectivity as reported by the backend. The dashboard never computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Status::Up => write!(f, "up"),
            Status::Down => write!(f, "down"),
            Status::Unknown => write!(f, "unknown"),
        }
    }
}

/// Backend-computed resource pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Normal,
    High,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct System {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    pub host: String,
    #[serde(default, deserialize_with = "de_id")]
    pub port: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A system with its averaged metrics. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(flatten)]
    pub system: System,
    #[serde(default)]
    pub avg_cpu: f64,
    #[serde(default)]
    pub avg_mem_pct: f64,
    /// MB/s
    #[serde(default)]
    pub avg_net_sent: f64,
    /// MB/s
    #[serde(default)]
    pub avg_net_recv: f64,
    #[serde(default)]
    pub online_users: i64,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub load_status: LoadStatus,
}

impl SystemStats {
    pub fn net_sent_mbps(&self) -> f64 {
        self.avg_net_sent * 8.0
    }

    pub fn net_recv_mbps(&self) -> f64 {
        self.avg_net_recv * 8.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemSummary {
    pub total: i64,
    pub online: i64,
    pub offline: i64,
    pub unknown: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemAlias {
    #[serde(default)]
    pub id: u64,
    #[serde(deserialize_with = "de_id")]
    pub system_id: String,
    pub alias: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Backend ids show up both as JSON strings and as numbers.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_accept_numeric_ids_and_unknown_statuses() {
        let raw = r#"{
            "id": 7, "name": "edge-1", "host": "10.0.0.7", "port": "8443",
            "status": "maintenance",
            "avg_cpu": 95.2, "avg_mem_pct": 41.0,
            "avg_net_sent": 1.5, "avg_net_recv": 0.25,
            "online_users": 12,
            "last_update": "2026-10-16T08:00:00Z",
            "load_status": "overloaded"
        }"#;
        let stats: SystemStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.system.id, "7");
        assert_eq!(stats.system.status, Status::Unknown);
        assert_eq!(stats.load_status, LoadStatus::Unknown);
        assert_eq!(stats.net_sent_mbps(), 12.0);
        assert_eq!(stats.net_recv_mbps(), 2.0);
        assert!(stats.last_update.is_some());
    }

    #[test]
    fn missing_metrics_default_to_zero() {
        let raw = r#"{"id": "abc", "name": "db", "host": "db.local", "status": "up"}"#;
        let stats: SystemStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.system.status, Status::Up);
        assert_eq!(stats.avg_cpu, 0.0);
        assert_eq!(stats.load_status, LoadStatus::Normal);
        assert_eq!(stats.last_update, None);
    }
}
