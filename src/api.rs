//! HTTP API for the queue dashboard

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::monitor::{QueueMonitor, RefreshOutcome};
use crate::queue::{EfficiencyReport, ForecastPoint, HistoryEntry, QueueAnalytics};

const MAX_FORECAST_DAYS: u32 = 365;
const MAX_HISTORY_DAYS: u32 = 3650;

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: String,
    pub message: String,
}

pub fn router(monitor: Arc<QueueMonitor>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/queue/api/data", get(get_queue_data))
        .route("/queue/api/forecast", get(get_forecast))
        .route("/queue/api/history", get(get_history))
        .route("/queue/api/efficiency", get(get_efficiency))
        .route("/queue/api/update", post(post_update))
        .with_state(monitor)
}

async fn health_check() -> &'static str {
    "OK"
}

pub async fn get_queue_data(
    State(monitor): State<Arc<QueueMonitor>>,
) -> Result<Json<QueueAnalytics>, StatusCode> {
    monitor
        .analytics(Utc::now())
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_forecast(
    Query(params): Query<DaysQuery>,
    State(monitor): State<Arc<QueueMonitor>>,
) -> Result<Json<Vec<ForecastPoint>>, StatusCode> {
    let days = params
        .days
        .unwrap_or(monitor.analyzer().config().forecast_days)
        .min(MAX_FORECAST_DAYS);

    monitor
        .forecast(days, Utc::now())
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_history(
    Query(params): Query<DaysQuery>,
    State(monitor): State<Arc<QueueMonitor>>,
) -> Result<Json<Vec<HistoryEntry>>, StatusCode> {
    let days = params
        .days
        .unwrap_or(monitor.analyzer().config().history_days)
        .min(MAX_HISTORY_DAYS);

    monitor
        .history(days, Utc::now())
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_efficiency(
    State(monitor): State<Arc<QueueMonitor>>,
) -> Result<Json<EfficiencyReport>, StatusCode> {
    monitor
        .efficiency(Utc::now())
        .map(Json)
        .map_err(internal_error)
}

/// Trigger a refresh outside the poll schedule.
pub async fn post_update(
    State(monitor): State<Arc<QueueMonitor>>,
) -> Result<(StatusCode, Json<UpdateResponse>), StatusCode> {
    match monitor.refresh().await.map_err(internal_error)? {
        RefreshOutcome::Recorded(_) => Ok((
            StatusCode::OK,
            Json(UpdateResponse {
                status: "success".into(),
                message: "Queue data updated successfully".into(),
            }),
        )),
        RefreshOutcome::SourceUnavailable(reason) => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UpdateResponse {
                status: "unavailable".into(),
                message: reason,
            }),
        )),
    }
}

fn internal_error(e: anyhow::Error) -> StatusCode {
    error!(error = %e, "Queue history unavailable");
    StatusCode::INTERNAL_SERVER_ERROR
}
