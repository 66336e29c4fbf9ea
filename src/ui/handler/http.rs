//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomCode,
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of resident rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let summaries = state.directory_usecase.summaries().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> =
        summaries.iter().map(RoomSummaryDto::from).collect();

    Json(room_summaries)
}

/// Get room detail by code
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    // 形式不正のコードは未知のルームと同じ扱い
    let code = RoomCode::new(code).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.directory_usecase.detail(&code).await {
        Some(snapshot) => Ok(Json(RoomDetailDto::from(&snapshot))),
        None => Err(StatusCode::NOT_FOUND),
    }
}
