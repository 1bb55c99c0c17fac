//! Session HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::CleanupSession;
use crate::infrastructure::http::dto::MessageResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::RequestContext;
use crate::infrastructure::http::state::AppState;

/// 清理当前会话的文件与播放位置
pub async fn cleanup_session(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .cleanup_session_handler
        .handle(CleanupSession {
            session_id: ctx.session_id,
            expire: false,
        })
        .await?;

    Ok(Json(MessageResponse::ok(
        "セッションファイルがクリーンアップされました",
    )))
}
