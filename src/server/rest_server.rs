use anyhow::Result;
use axum::{routing::get, Json, Router, extract::State};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::common::config::Settings;
use crate::rest::network::{get_health_report, get_network};
use crate::storage::shared_store_impl::SharedStoreImpl;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub shared_store: Arc<SharedStoreImpl>,
    /// Epoch millis of the owning process's last completed cycle.
    pub last_cycle_ms: Arc<AtomicI64>,
}

/// Read-only liveness and inspection surface. Not part of the coordination
/// protocol: peers never talk to each other over HTTP.
pub async fn rest_server_start(port: u16, state: AppState) -> Result<()> {
    log::info!("Starting rest api server on port {}...", port);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/network", get(get_network))
        .route("/healthReport", get(get_health_report))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app).await.map_err(|e| {
        error!("Failed to start server: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

async fn healthz(State(st): State<AppState>) -> Json<serde_json::Value> {
    let last_cycle = st.last_cycle_ms.load(Ordering::SeqCst);
    let age_seconds = if last_cycle == 0 {
        None
    } else {
        Some((chrono::Utc::now().timestamp_millis() - last_cycle) as f64 / 1000.0)
    };
    Json(serde_json::json!({
        "status": "ok",
        "lastCycleAgeSeconds": age_seconds,
        "config": {
            "syncIntervalSecs": st.settings.sync_interval_secs,
        }
    }))
}
