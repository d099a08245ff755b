use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::node::{HighLoadNode, HighLoadNodesBody, NodeLoadResponse, NodeRef, NodeTag, SystemNodeInfo};
use crate::system::{System, SystemAlias, SystemStats, SystemSummary, SystemThreshold};

/// Typed access to the monitoring backend's REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    base: String,
}

#[derive(Deserialize)]
struct SystemsBody<T> {
    #[serde(default = "Option::default")]
    systems: Option<Vec<T>>,
}

#[derive(Deserialize)]
struct AliasBody {
    #[serde(default)]
    alias: Option<SystemAlias>,
}

#[derive(Serialize)]
struct AliasRequest<'a> {
    alias: &'a str,
}

#[derive(Deserialize)]
struct TagsBody {
    #[serde(default)]
    tags: Option<Vec<NodeTag>>,
}

#[derive(Deserialize)]
struct ThresholdsBody {
    #[serde(default)]
    thresholds: Option<Vec<SystemThreshold>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl Client {
    pub fn new(base: &str) -> Self {
        Client {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(Error::ErrorReachingBackend)?;
        Ok(Client {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_timeout(base: &str, timeout: Duration) -> Result<Self> {
        Self::from_config(&Config {
            api_base: base.to_string(),
            request_timeout: timeout,
            ..Config::default()
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    // systems

    pub async fn list_systems(&self) -> Result<Vec<System>> {
        let body: SystemsBody<System> = self
            .get("/systems", "failed to fetch system list")
            .await?;
        Ok(body.systems.unwrap_or_default())
    }

    pub async fn systems_stats(&self) -> Result<Vec<SystemStats>> {
        let body: SystemsBody<SystemStats> = self
            .get("/systems/stats", "failed to fetch system stats")
            .await?;
        Ok(body.systems.unwrap_or_default())
    }

    pub async fn systems_summary(&self) -> Result<SystemSummary> {
        self.get("/systems/summary", "failed to fetch system summary")
            .await
    }

    // aliases

    /// `Ok(None)` when the system simply has no alias.
    pub async fn get_alias(&self, system_id: &str) -> Result<Option<SystemAlias>> {
        let path = system_path(system_id, "alias")?;
        let body: AliasBody = self.get(&path, "failed to fetch alias").await?;
        Ok(body.alias)
    }

    pub async fn put_alias(&self, system_id: &str, alias: &str) -> Result<Option<SystemAlias>> {
        let path = system_path(system_id, "alias")?;
        let res = self
            .send(Method::PUT, &path, Some(&AliasRequest { alias }), "failed to set alias")
            .await?;
        let body: AliasBody = decode(res).await?;
        Ok(body.alias)
    }

    pub async fn delete_alias(&self, system_id: &str) -> Result<()> {
        let path = system_path(system_id, "alias")?;
        self.send::<()>(Method::DELETE, &path, None, "failed to delete alias")
            .await?;
        Ok(())
    }

    // tags

    pub async fn get_tags(&self, system_id: &str) -> Result<Vec<NodeTag>> {
        let path = system_path(system_id, "tags")?;
        let body: TagsBody = self.get(&path, "failed to fetch tags").await?;
        Ok(body.tags.unwrap_or_default())
    }

    pub async fn add_tag(&self, system_id: &str, tag: &NodeRef) -> Result<()> {
        let path = system_path(system_id, "tags")?;
        self.send(Method::POST, &path, Some(tag), "failed to add tag")
            .await?;
        Ok(())
    }

    pub async fn remove_tag(&self, system_id: &str, tag: &NodeRef) -> Result<()> {
        let path = system_path(system_id, "tags")?;
        self.send(Method::DELETE, &path, Some(tag), "failed to remove tag")
            .await?;
        Ok(())
    }

    // thresholds

    pub async fn get_threshold(&self, system_id: &str) -> Result<SystemThreshold> {
        let path = system_path(system_id, "threshold")?;
        self.get(&path, "failed to fetch threshold").await
    }

    /// Sends `threshold` as given; normalization is the caller's job.
    pub async fn put_threshold(&self, system_id: &str, threshold: &SystemThreshold) -> Result<()> {
        let path = system_path(system_id, "threshold")?;
        self.send(Method::PUT, &path, Some(threshold), "failed to save threshold")
            .await?;
        Ok(())
    }

    pub async fn delete_threshold(&self, system_id: &str) -> Result<()> {
        let path = system_path(system_id, "threshold")?;
        self.send::<()>(Method::DELETE, &path, None, "failed to reset threshold")
            .await?;
        Ok(())
    }

    pub async fn list_thresholds(&self) -> Result<Vec<SystemThreshold>> {
        let body: ThresholdsBody = self
            .get("/thresholds", "failed to fetch thresholds")
            .await?;
        Ok(body.thresholds.unwrap_or_default())
    }

    // nodes

    pub async fn system_nodes(&self, system_id: &str) -> Result<SystemNodeInfo> {
        let path = system_path(system_id, "nodes")?;
        self.get(&path, "failed to fetch node info").await
    }

    pub async fn high_load_nodes(&self) -> Result<Vec<HighLoadNode>> {
        let body: HighLoadNodesBody = self
            .get("/nodes/load-status", "failed to fetch high-load nodes")
            .await?;
        Ok(body.into_nodes())
    }

    pub async fn node_load_status(&self, nodes: &[NodeRef]) -> Result<Vec<NodeLoadResponse>> {
        let res = self
            .send(Method::POST, "/nodes/load-status", Some(nodes), "load status query failed")
            .await?;
        let answers: Option<Vec<NodeLoadResponse>> = decode(res).await?;
        Ok(answers.unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T> {
        let res = self.send::<()>(Method::GET, path, None, fallback).await?;
        decode(res).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base, path);
        debug!("[CLIENT] {} {}", method, url);
        let mut req: RequestBuilder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|e| {
            error!("[CLIENT] Error reaching {}: {}", url, e);
            Error::ErrorReachingBackend(e)
        })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = error_message(&text, fallback);
            debug!("[CLIENT] {} {} -> {}: {}", method, url, status, message);
            return Err(Error::StatusCodeError(status, message));
        }
        Ok(res)
    }
}

/// `/systems/{id}/{leaf}` with the id percent-encoded as one path segment.
fn system_path(system_id: &str, leaf: &str) -> Result<String> {
    let mut url = Url::parse("http://localhost/").map_err(|e| Error::InvalidInput(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidInput(format!("invalid system id {:?}", system_id)))?
        .pop_if_empty()
        .extend(["systems", system_id, leaf]);
    Ok(url.path().to_string())
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    res.json::<T>()
        .await
        .map_err(|e| Error::ErrorDecodingResponse(e.to_string()))
}

/// The backend's `{error}` verbatim, or the caller's generic message.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
