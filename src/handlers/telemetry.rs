//! Dashboard telemetry endpoints

use crate::error::AppError;
use crate::http_server::AppState;
use crate::monitoring::{
    sample::{self, Alert, LogEntry},
    DashboardMetrics, DashboardSettings, NetworkAnalysis, NetworkStats, SettingsUpdate,
    SystemStatus,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};

pub async fn metrics() -> Json<DashboardMetrics> {
    Json(DashboardMetrics::current())
}

pub async fn alerts() -> Json<Vec<Alert>> {
    Json(sample::alerts())
}

pub async fn logs() -> Json<Vec<LogEntry>> {
    Json(sample::logs())
}

pub async fn system_status() -> Json<SystemStatus> {
    match tokio::task::spawn_blocking(SystemStatus::collect_or_fallback).await {
        Ok(status) => Json(status),
        Err(e) => {
            error!(error = %e, "Host sampling task failed");
            Json(SystemStatus::fallback())
        }
    }
}

pub async fn get_settings(State(state): State<AppState>) -> Json<DashboardSettings> {
    Json(state.settings.get().await)
}

pub async fn update_settings(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let update = body
        .ok()
        .and_then(|Json(body)| SettingsUpdate::from_json(&body))
        .ok_or_else(|| AppError::bad_request("Invalid settings payload"))?;

    let settings = state.settings.update(update).await;
    info!(?settings, "Settings updated");

    Ok(Json(json!({
        "status": "success",
        "message": "Settings updated successfully"
    })))
}

pub async fn network_stats() -> Json<NetworkStats> {
    Json(NetworkStats::sample(&mut rand::thread_rng()))
}

pub async fn network_analyze(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<NetworkAnalysis>, AppError> {
    match body {
        Ok(Json(body)) if body.get("request").and_then(Value::as_str) == Some("analyze") => {
            Ok(Json(NetworkAnalysis::sample(&mut rand::thread_rng())))
        }
        _ => Err(AppError::bad_request("Invalid request")),
    }
}
