use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::backend::Backend;
use crate::node::{NodeRef, NodeTag};
use crate::system::{System, SystemAlias, SystemThreshold};

type AppState = State<Arc<Backend>>;
type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

pub struct Api {
    address: String,
    port: u16,
    router: Router,
}

impl Api {
    pub async fn start(self) -> std::io::Result<()> {
        let socket = format!("{}:{}", self.address, self.port);
        let listener = TcpListener::bind(&socket).await?;
        info!("[MOCK] backend listening on {}", socket);
        axum::serve(listener, self.router).await
    }
}

pub fn setup(address: &str, port: u16, backend: Arc<Backend>) -> Api {
    Api {
        address: address.to_string(),
        port,
        router: router(backend),
    }
}

/// Serve `backend` on an ephemeral local port. Returns the API base URL.
pub async fn spawn(backend: Arc<Backend>) -> std::io::Result<(String, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let router = router(backend);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("[MOCK] backend stopped: {}", e);
        }
    });
    Ok((format!("http://{}/api", addr), handle))
}

pub fn router(backend: Arc<Backend>) -> Router {
    let api = Router::new()
        .route("/systems", get(list_systems))
        .route("/systems/summary", get(summary))
        .route("/systems/stats", get(stats))
        .route(
            "/systems/{id}/alias",
            get(get_alias).put(put_alias).delete(delete_alias),
        )
        .route(
            "/systems/{id}/tags",
            get(get_tags).post(add_tag).delete(remove_tag),
        )
        .route(
            "/systems/{id}/threshold",
            get(get_threshold).put(put_threshold).delete(delete_threshold),
        )
        .route("/systems/{id}/nodes", get(system_nodes))
        .route("/thresholds", get(list_thresholds))
        .route("/nodes/load-status", get(high_load_nodes).post(node_load_status));

    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record_and_inject))
        .with_state(backend)
}

async fn record_and_inject(State(b): AppState, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    b.record(format!("{} {}", req.method(), path)).await;

    if let Some(fault) = b.fault_for(&path).await {
        let body = match fault.message {
            Some(message) => json!({ "error": message }),
            None => json!({ "status": fault.status.as_u16() }),
        };
        return (fault.status, Json(body)).into_response();
    }
    next.run(req).await
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn require_id(id: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if id.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "system id must not be empty"));
    }
    Ok(())
}

async fn list_systems(State(b): AppState) -> Json<Value> {
    let state = b.state.lock().await;
    let systems: Vec<System> = state.systems.iter().map(|s| s.system.clone()).collect();
    Json(json!({ "systems": systems }))
}

async fn summary(State(b): AppState) -> Json<Value> {
    Json(json!(b.state.lock().await.summary()))
}

async fn stats(State(b): AppState) -> Json<Value> {
    Json(json!({ "systems": b.state.lock().await.systems }))
}

// aliases

#[derive(Deserialize)]
struct AliasRequest {
    alias: String,
}

async fn get_alias(State(b): AppState, Path(id): Path<String>) -> ApiResult<Value> {
    require_id(&id)?;
    let state = b.state.lock().await;
    Ok(Json(json!({ "alias": state.aliases.get(&id) })))
}

async fn put_alias(
    State(b): AppState,
    Path(id): Path<String>,
    Json(req): Json<AliasRequest>,
) -> ApiResult<Value> {
    require_id(&id)?;
    let alias = req.alias.trim();
    if alias.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "alias must not be empty"));
    }

    let mut state = b.state.lock().await;
    if state.system(&id).is_none() {
        return Err(api_error(StatusCode::NOT_FOUND, "system not found"));
    }
    let now = Utc::now();
    let record = match state.aliases.get(&id).cloned() {
        Some(existing) => SystemAlias {
            alias: alias.to_string(),
            updated_at: Some(now),
            ..existing
        },
        None => SystemAlias {
            id: state.next_id(),
            system_id: id.clone(),
            alias: alias.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        },
    };
    state.aliases.insert(id.clone(), record.clone());
    info!("[MOCK] alias for {} set to {:?}", id, record.alias);
    Ok(Json(json!({ "success": "alias saved", "alias": record })))
}

async fn delete_alias(State(b): AppState, Path(id): Path<String>) -> ApiResult<Value> {
    require_id(&id)?;
    let mut state = b.state.lock().await;
    match state.aliases.remove(&id) {
        Some(_) => Ok(Json(json!({ "success": "alias deleted" }))),
        None => Err(api_error(StatusCode::NOT_FOUND, "alias not found")),
    }
}

// tags

async fn get_tags(State(b): AppState, Path(id): Path<String>) -> ApiResult<Value> {
    require_id(&id)?;
    let state = b.state.lock().await;
    let tags: Vec<&NodeTag> = state.tags.iter().filter(|t| t.system_id == id).collect();
    Ok(Json(json!({ "tags": tags })))
}

async fn add_tag(
    State(b): AppState,
    Path(id): Path<String>,
    Json(req): Json<NodeRef>,
) -> ApiResult<Value> {
    require_id(&id)?;
    let mut state = b.state.lock().await;
    let exists = state
        .tags
        .iter()
        .any(|t| t.system_id == id && t.tag_type == req.node_type && t.tag_id == req.id);
    if exists {
        return Err(api_error(StatusCode::CONFLICT, "tag already exists"));
    }
    let now = Utc::now();
    let tag = NodeTag {
        id: state.next_id(),
        system_id: id,
        tag_type: req.node_type,
        tag_id: req.id,
        created_at: Some(now),
        updated_at: Some(now),
    };
    state.tags.push(tag);
    Ok(Json(json!({ "success": "ok" })))
}

async fn remove_tag(
    State(b): AppState,
    Path(id): Path<String>,
    Json(req): Json<NodeRef>,
) -> ApiResult<Value> {
    require_id(&id)?;
    let mut state = b.state.lock().await;
    let before = state.tags.len();
    state
        .tags
        .retain(|t| !(t.system_id == id && t.tag_type == req.node_type && t.tag_id == req.id));
    if state.tags.len() == before {
        return Err(api_error(StatusCode::NOT_FOUND, "tag not found"));
    }
    Ok(Json(json!({ "success": "ok" })))
}

// thresholds

async fn get_threshold(State(b): AppState, Path(id): Path<String>) -> ApiResult<SystemThreshold> {
    require_id(&id)?;
    let state = b.state.lock().await;
    if state.system(&id).is_none() {
        return Err(api_error(StatusCode::NOT_FOUND, "system not found"));
    }
    let threshold = state
        .thresholds
        .get(&id)
        .cloned()
        .unwrap_or_else(|| SystemThreshold::defaults_for(&id));
    Ok(Json(threshold))
}

async fn put_threshold(
    State(b): AppState,
    Path(id): Path<String>,
    Json(mut t): Json<SystemThreshold>,
) -> ApiResult<SystemThreshold> {
    require_id(&id)?;
    let percentages = [
        (t.cpu_alert_limit, "cpu limit must be between 0 and 100"),
        (t.mem_alert_limit, "memory limit must be between 0 and 100"),
        (t.net_up_alert, "upload alert must be between 0 and 100"),
        (t.net_down_alert, "download alert must be between 0 and 100"),
    ];
    for (value, message) in percentages {
        if !(0.0..=100.0).contains(&value) {
            return Err(api_error(StatusCode::BAD_REQUEST, message));
        }
    }

    let mut state = b.state.lock().await;
    if state.system(&id).is_none() {
        return Err(api_error(StatusCode::NOT_FOUND, "system not found"));
    }
    let now = Utc::now();
    let existing = state.thresholds.get(&id).cloned();
    t.id = match &existing {
        Some(e) => e.id,
        None => state.next_id(),
    };
    t.system_id = id.clone();
    t.created_at = existing.and_then(|e| e.created_at).or(Some(now));
    t.updated_at = Some(now);
    state.thresholds.insert(id, t.clone());
    Ok(Json(t))
}

async fn delete_threshold(State(b): AppState, Path(id): Path<String>) -> ApiResult<Value> {
    require_id(&id)?;
    b.state.lock().await.thresholds.remove(&id);
    Ok(Json(json!({ "message": "threshold deleted" })))
}

async fn list_thresholds(State(b): AppState) -> Json<Value> {
    let state = b.state.lock().await;
    let thresholds: Vec<&SystemThreshold> = state.thresholds.values().collect();
    Json(json!({ "thresholds": thresholds }))
}

// nodes

async fn system_nodes(State(b): AppState, Path(id): Path<String>) -> ApiResult<Value> {
    require_id(&id)?;
    let state = b.state.lock().await;
    match state.system(&id) {
        Some(s) => Ok(Json(json!(state.node_info(&s.system)))),
        None => Err(api_error(StatusCode::NOT_FOUND, "system not found")),
    }
}

async fn high_load_nodes(State(b): AppState) -> Json<Value> {
    Json(json!(b.state.lock().await.high_load_nodes()))
}

async fn node_load_status(State(b): AppState, Json(nodes): Json<Vec<NodeRef>>) -> Json<Value> {
    let state = b.state.lock().await;
    let answers: Vec<_> = nodes.iter().map(|n| state.node_load(n)).collect();
    Json(json!(answers))
}
