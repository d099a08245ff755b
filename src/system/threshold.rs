use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::system::de_id;

/// Substituted for a network maximum typed as a fraction instead of Mbps.
pub const NET_MAX_FALLBACK_MBPS: f64 = 2000.0;

fn default_online_users_limit() -> i64 {
    300
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemThreshold {
    #[serde(default)]
    pub id: u64,
    #[serde(deserialize_with = "de_id")]
    pub system_id: String,
    pub cpu_alert_limit: f64,
    pub mem_alert_limit: f64,
    /// Mbps
    pub net_up_max: f64,
    /// Mbps
    pub net_down_max: f64,
    /// Percent of `net_up_max`.
    pub net_up_alert: f64,
    /// Percent of `net_down_max`.
    pub net_down_alert: f64,
    #[serde(default = "default_online_users_limit")]
    pub online_users_limit: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SystemThreshold {
    /// What the backend hands out for a system nobody configured yet.
    pub fn defaults_for(system_id: &str) -> Self {
        SystemThreshold {
            id: 0,
            system_id: system_id.to_string(),
            cpu_alert_limit: 90.0,
            mem_alert_limit: 90.0,
            net_up_max: 0.0,
            net_down_max: 0.0,
            net_up_alert: 80.0,
            net_down_alert: 80.0,
            online_users_limit: default_online_users_limit(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn get(&self, field: ThresholdField) -> f64 {
        match field {
            ThresholdField::CpuAlertLimit => self.cpu_alert_limit,
            ThresholdField::MemAlertLimit => self.mem_alert_limit,
            ThresholdField::NetUpMax => self.net_up_max,
            ThresholdField::NetDownMax => self.net_down_max,
            ThresholdField::NetUpAlert => self.net_up_alert,
            ThresholdField::NetDownAlert => self.net_down_alert,
        }
    }

    /// Store a keystroke's worth of input, coerced on the spot.
    pub fn set(&mut self, field: ThresholdField, raw: &str) {
        let value = coerce_input(raw);
        match field {
            ThresholdField::CpuAlertLimit => self.cpu_alert_limit = value,
            ThresholdField::MemAlertLimit => self.mem_alert_limit = value,
            ThresholdField::NetUpMax => self.net_up_max = value,
            ThresholdField::NetDownMax => self.net_down_max = value,
            ThresholdField::NetUpAlert => self.net_up_alert = value,
            ThresholdField::NetDownAlert => self.net_down_alert = value,
        }
    }

    /// The payload actually submitted. Only the network maxima are touched.
    pub fn normalized(&self) -> Self {
        Self {
            net_up_max: normalize_net_max("net_up_max", self.net_up_max),
            net_down_max: normalize_net_max("net_down_max", self.net_down_max),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdField {
    CpuAlertLimit,
    MemAlertLimit,
    NetUpMax,
    NetDownMax,
    NetUpAlert,
    NetDownAlert,
}

/// Non-numeric, empty, non-finite and negative input all become 0.
pub fn coerce_input(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Values strictly between 0 and 1 were almost certainly not meant as Mbps.
pub fn normalize_net_max(field: &str, value: f64) -> f64 {
    if value > 0.0 && value < 1.0 {
        info!(
            "[THRESHOLD] {} adjusted from {} to {} Mbps",
            field, value, NET_MAX_FALLBACK_MBPS
        );
        return NET_MAX_FALLBACK_MBPS;
    }
    value
}
