use std::fmt::{self, Display, Formatter};

use crate::system::{self, Connectivity, LoadClass, SystemStats};

/// Display strings derived from one [`SystemStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct SystemRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub connectivity: Connectivity,
    pub status_label: &'static str,
    pub load: LoadClass,
    pub cpu: String,
    pub memory: String,
    pub net_up_mbps: String,
    pub net_down_mbps: String,
    pub online_users: i64,
    pub last_update: String,
    pub reason: String,
}

impl From<&SystemStats> for SystemRow {
    fn from(stats: &SystemStats) -> Self {
        let s = &stats.system;
        SystemRow {
            id: s.id.clone(),
            name: s.name.clone(),
            address: format!("{}:{}", s.host, s.port),
            connectivity: system::connectivity(s.status),
            status_label: system::classify::status_label(s.status),
            load: system::classify_stats(stats),
            cpu: format!("{:.1}%", stats.avg_cpu),
            memory: format!("{:.1}%", stats.avg_mem_pct),
            net_up_mbps: format!("{:.2}", stats.net_sent_mbps()),
            net_down_mbps: format!("{:.2}", stats.net_recv_mbps()),
            online_users: stats.online_users,
            last_update: stats
                .last_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "no data".to_string()),
            reason: system::load_reason(stats),
        }
    }
}

impl Display for SystemRow {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{:<20} {:<21} {:<12} {:<9} cpu {:>6} mem {:>6} users {:>5} up {:>9} down {:>9} Mbps  {}",
            self.name,
            self.address,
            self.status_label,
            self.load.label(),
            self.cpu,
            self.memory,
            self.online_users,
            self.net_up_mbps,
            self.net_down_mbps,
            self.last_update,
        )
    }
}
