use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::error::{Error, Result};

pub const LOCAL_API_BASE: &str = "http://localhost:8080/api";

const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;
const DEFAULT_HIGH_LOAD_INTERVAL_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DEMO_PORT: u16 = 8080;

/// Runtime configuration, resolved once at startup and handed to every view.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute base URL of the backend API, without a trailing slash.
    pub api_base: String,
    pub stats_interval: Duration,
    pub high_load_interval: Duration,
    pub request_timeout: Duration,
    /// Boot the in-memory backend and point `api_base` at it.
    pub demo: bool,
    pub demo_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: LOCAL_API_BASE.to_string(),
            stats_interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
            high_load_interval: Duration::from_secs(DEFAULT_HIGH_LOAD_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            demo: false,
            demo_port: DEFAULT_DEMO_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// | Env Var                           | Default                     |
    /// |-----------------------------------|-----------------------------|
    /// | `LOOKOUT_API_BASE`                | resolved from origin        |
    /// | `LOOKOUT_ORIGIN`                  | unset (local development)   |
    /// | `LOOKOUT_PRODUCTION`              | `false`                     |
    /// | `LOOKOUT_STATS_INTERVAL_SECS`     | `5`                         |
    /// | `LOOKOUT_HIGH_LOAD_INTERVAL_SECS` | `10`                        |
    /// | `LOOKOUT_REQUEST_TIMEOUT_SECS`    | `10`                        |
    /// | `LOOKOUT_DEMO`                    | `false`                     |
    /// | `LOOKOUT_DEMO_PORT`               | `8080`                      |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = parse_flag(&lookup, "LOOKOUT_PRODUCTION")?;
        let api_base = match lookup("LOOKOUT_API_BASE") {
            Some(base) if !base.trim().is_empty() => base.trim().trim_end_matches('/').to_string(),
            _ => resolve_api_base(lookup("LOOKOUT_ORIGIN").as_deref(), production)?,
        };

        let secs = |key: &str, default: u64| -> Result<Duration> {
            let value = parse_number(&lookup, key, default)?;
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be positive", key)));
            }
            Ok(Duration::from_secs(value))
        };

        let demo_port = parse_number(&lookup, "LOOKOUT_DEMO_PORT", DEFAULT_DEMO_PORT as u64)?;
        let demo_port = u16::try_from(demo_port)
            .map_err(|_| Error::InvalidConfig("LOOKOUT_DEMO_PORT must be a valid port".into()))?;

        Ok(Config {
            api_base,
            stats_interval: secs("LOOKOUT_STATS_INTERVAL_SECS", DEFAULT_STATS_INTERVAL_SECS)?,
            high_load_interval: secs(
                "LOOKOUT_HIGH_LOAD_INTERVAL_SECS",
                DEFAULT_HIGH_LOAD_INTERVAL_SECS,
            )?,
            request_timeout: secs("LOOKOUT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            demo: parse_flag(&lookup, "LOOKOUT_DEMO")?,
            demo_port,
        })
    }
}

/// Pick the API base for the origin the dashboard is served from.
///
/// Local development talks to the backend on its own port; anything else is
/// served same-origin under `/api`.
pub fn resolve_api_base(origin: Option<&str>, production: bool) -> Result<String> {
    let origin = match origin.map(str::trim).filter(|o| !o.is_empty()) {
        Some(origin) => origin,
        None => {
            if production {
                warn!("[CONFIG] production build without LOOKOUT_ORIGIN, using local API base");
            }
            return Ok(LOCAL_API_BASE.to_string());
        }
    };

    let url = Url::parse(origin)
        .map_err(|e| Error::InvalidConfig(format!("LOOKOUT_ORIGIN {:?}: {}", origin, e)))?;
    let local = matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
    );
    if local && !production {
        return Ok(LOCAL_API_BASE.to_string());
    }

    let api = url
        .join("/api")
        .map_err(|e| Error::InvalidConfig(format!("LOOKOUT_ORIGIN {:?}: {}", origin, e)))?;
    Ok(api.as_str().trim_end_matches('/').to_string())
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(Error::InvalidConfig(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("{} must be a number, got {:?}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn local_origin_uses_backend_port() {
        assert_eq!(resolve_api_base(None, false).unwrap(), LOCAL_API_BASE);
        assert_eq!(
            resolve_api_base(Some("http://localhost:3000"), false).unwrap(),
            LOCAL_API_BASE
        );
        assert_eq!(
            resolve_api_base(Some("http://127.0.0.1:3000"), false).unwrap(),
            LOCAL_API_BASE
        );
    }

    #[test]
    fn remote_origin_is_same_origin_api() {
        assert_eq!(
            resolve_api_base(Some("https://dash.example.com"), false).unwrap(),
            "https://dash.example.com/api"
        );
        assert_eq!(
            resolve_api_base(Some("https://dash.example.com/some/page"), false).unwrap(),
            "https://dash.example.com/api"
        );
    }

    #[test]
    fn production_on_localhost_is_same_origin() {
        assert_eq!(
            resolve_api_base(Some("http://localhost:8000"), true).unwrap(),
            "http://localhost:8000/api"
        );
    }

    #[test]
    fn garbage_origin_is_a_config_error() {
        assert!(resolve_api_base(Some("not a url"), false).is_err());
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(env(&[])).unwrap();
        assert_eq!(config.api_base, LOCAL_API_BASE);
        assert_eq!(config.stats_interval, Duration::from_secs(5));
        assert_eq!(config.high_load_interval, Duration::from_secs(10));
        assert!(!config.demo);
    }

    #[test]
    fn explicit_api_base_wins() {
        let config = Config::from_lookup(env(&[
            ("LOOKOUT_API_BASE", "http://monitor.internal:9000/api/"),
            ("LOOKOUT_ORIGIN", "https://dash.example.com"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://monitor.internal:9000/api");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(Config::from_lookup(env(&[("LOOKOUT_STATS_INTERVAL_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(env(&[("LOOKOUT_STATS_INTERVAL_SECS", "0")])).is_err());
        assert!(Config::from_lookup(env(&[("LOOKOUT_DEMO_PORT", "70000")])).is_err());
        assert!(Config::from_lookup(env(&[("LOOKOUT_DEMO", "maybe")])).is_err());
    }
}
