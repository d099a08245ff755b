use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lookout::mock;
use lookout::view::{self, HighLoadView, MonitorView};
use lookout::{Client, Config};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if config.demo {
        let (mhost, mport) = ("127.0.0.1", config.demo_port);
        let backend = Arc::new(mock::Backend::demo().await);
        let api = mock::setup(mhost, mport, backend);
        tokio::spawn(async move {
            if let Err(e) = api.start().await {
                error!("[MOCK] failed to start: {}", e);
            }
        });
        config.api_base = format!("http://{}:{}/api", mhost, mport);
    }

    info!("Starting lookout against {}", config.api_base);

    let client = match Client::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let monitor = view::mount(MonitorView::new(client.clone()), config.stats_interval);
    let high_load = view::mount(HighLoadView::new(client), config.high_load_interval);

    let mut render = tokio::time::interval(config.stats_interval);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = render.tick() => {
                render_monitor(monitor.view());
                render_high_load(high_load.view());
            }
        }
    }

    info!("Shutting down");
    monitor.unmount().await;
    high_load.unmount().await;
}

fn render_monitor(view: &MonitorView) {
    let snap = view.snapshot();
    if snap.is_loading() {
        info!("[MONITOR] loading...");
        return;
    }
    if let Some(e) = snap.error() {
        warn!("[MONITOR] {}", e);
    }
    let s = &snap.summary.value;
    info!(
        "[MONITOR] total {} online {} offline {} unknown {}",
        s.total, s.online, s.offline, s.unknown
    );
    for row in snap.rows() {
        info!("[MONITOR] {}", row);
    }
}

fn render_high_load(view: &HighLoadView) {
    let snap = view.snapshot();
    if let Some(e) = snap.error() {
        warn!("[HIGHLOAD] {}", e);
    }
    if snap.all_clear() {
        info!("[HIGHLOAD] no flagged servers");
        return;
    }
    let s = snap.summary();
    info!(
        "[HIGHLOAD] flagged {} (high load {}, offline {}, unknown {})",
        s.flagged, s.high_load, s.offline, s.unknown
    );
    for row in snap.rows() {
        info!("[HIGHLOAD] {} | {}", row, row.reason);
    }
    for node in &snap.nodes.value {
        info!(
            "[HIGHLOAD] node {} ({} #{}) online {}",
            node.name, node.node_type, node.id, node.online
        );
    }
}
