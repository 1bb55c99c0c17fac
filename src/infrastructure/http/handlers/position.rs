//! Playback Position HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{GetPosition, SavePosition};
use crate::infrastructure::http::dto::{
    GetPositionResponse, SavePositionRequest, SavePositionResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::RequestContext;
use crate::infrastructure::http::state::AppState;

/// 保存播放位置
pub async fn save_position(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    payload: Result<Json<SavePositionRequest>, JsonRejection>,
) -> Result<Json<SavePositionResponse>, ApiError> {
    let Json(req) = payload?;
    let file_id = req
        .file_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("file_id is required".to_string()))?;

    let record = state
        .save_position_handler
        .handle(SavePosition {
            owner: ctx.session_id,
            file_id,
            position: req.position,
        })
        .await?;

    Ok(Json(record.into()))
}

/// 获取上次播放位置，从未保存过时为 0.0
pub async fn get_position(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(file_id): Path<String>,
) -> Result<Json<GetPositionResponse>, ApiError> {
    let result = state
        .get_position_handler
        .handle(GetPosition {
            owner: ctx.session_id,
            file_id,
        })
        .await?;

    Ok(Json(GetPositionResponse {
        success: true,
        position: result.position,
        last_played_at: result.last_played_at.map(|ts| ts.to_rfc3339()),
    }))
}
