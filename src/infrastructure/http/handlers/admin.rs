//! Voice Command Mapping Admin Handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::{
    CreateVoiceCommandMapping, DeleteVoiceCommandMapping, ListVoiceCommandMappings,
};
use crate::infrastructure::http::dto::{
    CreateVoiceCommandRequest, MessageResponse, VoiceCommandCreatedResponse,
    VoiceCommandFilter, VoiceCommandListResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出指令映射
pub async fn list_voice_commands(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<VoiceCommandFilter>,
) -> Result<Json<VoiceCommandListResponse>, ApiError> {
    let mappings = state
        .list_voice_commands_handler
        .handle(ListVoiceCommandMappings {
            owner: filter.owner,
        })
        .await?;

    Ok(Json(VoiceCommandListResponse {
        success: true,
        commands: mappings.into_iter().map(Into::into).collect(),
    }))
}

/// 创建指令映射
pub async fn create_voice_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateVoiceCommandRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VoiceCommandCreatedResponse>), ApiError> {
    let Json(req) = payload?;
    let mapping = state
        .create_voice_command_handler
        .handle(CreateVoiceCommandMapping {
            command: req.command,
            action: req.action,
            owner: req.owner,
            is_active: req.is_active,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(VoiceCommandCreatedResponse {
            success: true,
            command: mapping.into(),
        }),
    ))
}

/// 删除指令映射
pub async fn delete_voice_command(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .delete_voice_command_handler
        .handle(DeleteVoiceCommandMapping { id })
        .await?;

    Ok(Json(MessageResponse::ok("Voice command deleted")))
}
