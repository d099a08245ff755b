use std::fmt::{self, Display, Formatter};

use super::system::{LoadStatus, Status, SystemStats};

// Explanation only. The backend decides `load_status`; these never do.
pub const REASON_CPU_PCT: f64 = 90.0;
pub const REASON_MEM_PCT: f64 = 90.0;
pub const REASON_ONLINE_USERS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    Online,
    Offline,
    Unknown,
}

impl Display for Connectivity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Connectivity::Online => write!(f, "online"),
            Connectivity::Offline => write!(f, "offline"),
            Connectivity::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadClass {
    Offline,
    High,
    Normal,
}

impl LoadClass {
    pub fn label(&self) -> &'static str {
        match self {
            LoadClass::Offline => "offline",
            LoadClass::High => "high load",
            LoadClass::Normal => "normal",
        }
    }
}

impl Display for LoadClass {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn connectivity(status: Status) -> Connectivity {
    match status {
        Status::Up => Connectivity::Online,
        Status::Down => Connectivity::Offline,
        Status::Unknown => Connectivity::Unknown,
    }
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Up => "online",
        Status::Down => "offline/down",
        Status::Unknown => "unknown",
    }
}

/// Anything not `up` is offline, whatever the load says.
pub fn classify(status: Status, load_status: LoadStatus) -> LoadClass {
    if status != Status::Up {
        return LoadClass::Offline;
    }
    match load_status {
        LoadStatus::High => LoadClass::High,
        LoadStatus::Normal | LoadStatus::Unknown => LoadClass::Normal,
    }
}

pub fn classify_stats(stats: &SystemStats) -> LoadClass {
    classify(stats.system.status, stats.load_status)
}

/// Human-readable "why is this flagged" text, built from the raw metrics.
pub fn load_reason(stats: &SystemStats) -> String {
    if stats.system.status != Status::Up {
        return "server offline".to_string();
    }

    let mut reasons = Vec::new();
    if stats.avg_cpu > REASON_CPU_PCT {
        reasons.push(format!("CPU: {:.1}%", stats.avg_cpu));
    }
    if stats.avg_mem_pct > REASON_MEM_PCT {
        reasons.push(format!("Memory: {:.1}%", stats.avg_mem_pct));
    }
    if stats.online_users > REASON_ONLINE_USERS {
        reasons.push(format!("Online users: {}", stats.online_users));
    }

    if reasons.is_empty() {
        "other".to_string()
    } else {
        reasons.join(", ")
    }
}
