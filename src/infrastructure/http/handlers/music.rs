//! Music HTTP Handlers
//!
//! 上传、删除、读取会话文件与音乐库文件

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    ApplicationError, DeleteLibraryFile, DeleteSessionFile, GetFileData, GetFileUrl,
    GetLibraryFileUrl, ListLibrary, ListSessionFiles, UploadMusic, UploadTarget,
};
use crate::domain::music::{UploadError, UploadPolicy};
use crate::infrastructure::http::dto::{
    FileDataBody, FileInfo, FileListResponse, FileUrlBody, MessageResponse, UploadResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::RequestContext;
use crate::infrastructure::http::state::AppState;

const UPLOADED_MESSAGE: &str = "ファイルが正常にアップロードされました";
const DELETED_MESSAGE: &str = "ファイルが削除されました";

/// multipart 表单中的上传文件
struct UploadedField {
    filename: String,
    data: Vec<u8>,
}

fn upload_error(err: UploadError) -> ApiError {
    ApplicationError::from(err).into()
}

/// 读取 `file` 字段
///
/// 扩展名在读取内容前校验；内容按块读取，超过上限立即中止
async fn read_file_field(
    multipart: &mut Multipart,
    policy: &UploadPolicy,
) -> Result<UploadedField, ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(upload_error(UploadError::MissingFile)),
        };

        policy.check_extension(&filename).map_err(upload_error)?;

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
        {
            data.extend_from_slice(&chunk);
            policy.check_size(data.len() as u64).map_err(upload_error)?;
        }

        return Ok(UploadedField { filename, data });
    }

    Err(upload_error(UploadError::MissingFile))
}

async fn upload_to(
    state: &AppState,
    ctx: RequestContext,
    mut multipart: Multipart,
    target: UploadTarget,
) -> Result<Json<UploadResponse>, ApiError> {
    let policy = state.upload_music_handler.limits().policy_for(target);
    let field = read_file_field(&mut multipart, &policy).await?;

    let command = UploadMusic {
        session_id: ctx.session_id,
        target,
        original_name: field.filename,
        data: field.data,
    };

    let file = state.upload_music_handler.handle(command).await?;

    Ok(Json(UploadResponse {
        success: true,
        file: FileInfo::from(&file),
        message: UPLOADED_MESSAGE.to_string(),
    }))
}

/// 上传到会话（Base64 内联）
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    upload_to(&state, ctx, multipart, UploadTarget::SessionInline).await
}

/// 上传到会话（文件系统）
pub async fn upload_file_lightweight(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    upload_to(&state, ctx, multipart, UploadTarget::SessionFilesystem).await
}

/// 上传到音乐库
pub async fn upload_library_file(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    upload_to(&state, ctx, multipart, UploadTarget::Library).await
}

/// 删除会话文件
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(file_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .delete_session_file_handler
        .handle(DeleteSessionFile {
            session_id: ctx.session_id,
            file_id,
        })
        .await?;

    Ok(Json(MessageResponse::ok(DELETED_MESSAGE)))
}

/// 获取会话文件的 Base64 内容
pub async fn get_file_data(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(file_id): Path<String>,
) -> Result<Json<FileDataBody>, ApiError> {
    let result = state
        .get_file_data_handler
        .handle(GetFileData {
            session_id: ctx.session_id,
            file_id,
        })
        .await?;

    Ok(Json(FileDataBody {
        success: true,
        file_base64: result.file_base64,
        file_info: FileInfo::from(&result.file),
    }))
}

/// 获取会话文件的访问 URL
pub async fn get_file_url(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(file_id): Path<String>,
) -> Result<Json<FileUrlBody>, ApiError> {
    let result = state
        .get_file_url_handler
        .handle(GetFileUrl {
            session_id: ctx.session_id,
            file_id,
        })
        .await?;

    Ok(Json(FileUrlBody {
        success: true,
        file_url: result.file_url,
        file_info: FileInfo::from(&result.file),
    }))
}

/// 列出会话文件
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<Json<FileListResponse>, ApiError> {
    let files = state
        .list_session_files_handler
        .handle(ListSessionFiles {
            session_id: ctx.session_id,
        })
        .await?;

    Ok(Json(FileListResponse::new(&files)))
}

/// 列出音乐库（新的在前）
pub async fn list_library(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileListResponse>, ApiError> {
    let files = state.list_library_handler.handle(ListLibrary).await?;
    Ok(Json(FileListResponse::new(&files)))
}

/// 获取音乐库文件的访问 URL
pub async fn get_library_file_url(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<FileUrlBody>, ApiError> {
    let result = state
        .get_library_file_url_handler
        .handle(GetLibraryFileUrl { file_id })
        .await?;

    Ok(Json(FileUrlBody {
        success: true,
        file_url: result.file_url,
        file_info: FileInfo::from(&result.file),
    }))
}

/// 删除音乐库文件
pub async fn delete_library_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .delete_library_file_handler
        .handle(DeleteLibraryFile { file_id })
        .await?;

    Ok(Json(MessageResponse::ok(DELETED_MESSAGE)))
}
