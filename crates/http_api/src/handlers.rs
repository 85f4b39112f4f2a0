use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::errors::HttpError;
use crate::requests::{
    EmptyRequest, NodeRequest, PlantRequest, RecentParametersRequest, WindowRequest,
};
use crate::state::HttpState;

const DEFAULT_RECENT_LIMIT: u32 = 6;

pub async fn checkpoint_latest(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = state.app_state.services.readings.latest_checkpoint()?;
    Ok(Json(response))
}

pub async fn checkpoint_previous_change(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = state
        .app_state
        .services
        .readings
        .previous_document_change()?;
    Ok(Json(response))
}

pub async fn last_reading(
    State(state): State<HttpState>,
    Json(req): Json<NodeRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = state.app_state.services.readings.last_reading(&req.node)?;
    Ok(Json(response))
}

pub async fn aggregates(
    State(state): State<HttpState>,
    Json(req): Json<WindowRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = state.app_state.services.readings.aggregates(req.hours)?;
    Ok(Json(response))
}

pub async fn node_status(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = state.app_state.services.readings.node_status()?;
    Ok(Json(response))
}

pub async fn parameters_latest(
    State(state): State<HttpState>,
    Json(req): Json<PlantRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = state.app_state.services.parameters.latest(&req.plant)?;
    Ok(Json(response))
}

pub async fn parameters_recent(
    State(state): State<HttpState>,
    Json(req): Json<RecentParametersRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = req.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let response = state
        .app_state
        .services
        .parameters
        .recent(limit, req.manual_only)?;
    Ok(Json(response))
}

pub async fn market_online(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let market = state.app_state.services.market.clone();
    let response = tokio::task::spawn_blocking(move || market.online()).await??;
    Ok(Json(response))
}

pub async fn tick(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let ingest = state.app_state.services.ingest.clone();
    let report = tokio::task::spawn_blocking(move || ingest.tick()).await??;
    info!(
        hour_epoch = report.hour_epoch,
        failed = report.failed_nodes(),
        "manual tick finished"
    );
    Ok(Json(report))
}

pub async fn not_found() -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        "not found",
        Some("not_found".to_string()),
    )
}
