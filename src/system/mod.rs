pub mod classify;
mod system;
mod threshold;

pub use classify::{classify, classify_stats, connectivity, load_reason, Connectivity, LoadClass};
pub use system::{LoadStatus, Status, System, SystemAlias, SystemStats, SystemSummary};
pub(crate) use system::de_id;
pub use threshold::{
    coerce_input, normalize_net_max, SystemThreshold, ThresholdField, NET_MAX_FALLBACK_MBPS,
};
