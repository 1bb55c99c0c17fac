//! Voice Command HTTP Handlers

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use std::sync::Arc;

use crate::application::RecognizeVoiceCommand;
use crate::infrastructure::http::dto::VoiceCommandResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::RequestContext;
use crate::infrastructure::http::state::AppState;

/// 识别语音指令
///
/// 请求体为浏览器录制的音频；识别失败、未匹配等以 200 `{success: false}` 返回
pub async fn voice_command(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<VoiceCommandResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    tracing::debug!(session_id = %ctx.session_id, "Listening for voice command");

    let sample = state.capture.capture(body, content_type).await?;

    let action = state
        .recognize_voice_handler
        .handle(RecognizeVoiceCommand { sample })
        .await?;

    Ok(Json(VoiceCommandResponse {
        success: true,
        command: action.as_str(),
        message: action.message(),
    }))
}
