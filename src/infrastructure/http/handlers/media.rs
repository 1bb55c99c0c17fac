//! Media HTTP Handlers
//!
//! 以流的方式输出上传的音频文件

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{MediaFile, OpenMediaFile, StorageArea};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::RequestContext;
use crate::infrastructure::http::state::AppState;

async fn stream_media(media: MediaFile) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(&media.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open audio file: {}", e)))?;

    // 以磁盘上的实际大小为准
    let file_size = file
        .metadata()
        .await
        .map(|m| m.len())
        .unwrap_or(media.file_size);

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media.content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 会话临时文件，只对所属会话可见
pub async fn temp_upload_media(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let media = state
        .open_media_file_handler
        .handle(OpenMediaFile {
            session_id: ctx.session_id,
            area: StorageArea::TempUploads,
            filename,
        })
        .await?;

    stream_media(media).await
}

/// 音乐库文件
pub async fn library_media(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let media = state
        .open_media_file_handler
        .handle(OpenMediaFile {
            session_id: ctx.session_id,
            area: StorageArea::Music,
            filename,
        })
        .await?;

    stream_media(media).await
}
