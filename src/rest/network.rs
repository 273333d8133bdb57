use axum::{
    extract::State,
    Json,
};
use crate::common::layout::{consolidated_status_path, health_report_path};
use crate::server::rest_server::AppState;
use crate::traits::shared_store::SharedStore;

/// Last consolidated view, or null when the consolidator has not run yet.
pub async fn get_network(State(st): State<AppState>) -> Json<serde_json::Value> {
    let view = st
        .shared_store
        .read(&consolidated_status_path())
        .await
        .unwrap_or_else(|e| {
            log::warn!("could not read consolidated view: {:?}", e);
            None
        });
    Json(serde_json::json!({
        "network": view,
    }))
}

pub async fn get_health_report(State(st): State<AppState>) -> Json<serde_json::Value> {
    let report = st
        .shared_store
        .read(&health_report_path())
        .await
        .unwrap_or_else(|e| {
            log::warn!("could not read health report: {:?}", e);
            None
        });
    Json(serde_json::json!({
        "healthReport": report,
    }))
}
