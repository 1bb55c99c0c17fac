//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                         GET    健康检查
//! - /api/test                         GET    连通性测试
//! - /api/upload                       POST   上传到会话（Base64 内联）
//! - /api/upload-lightweight           POST   上传到会话（文件系统）
//! - /api/delete/:id                   DELETE 删除会话文件
//! - /api/file-data/:id                GET    会话文件 Base64 内容
//! - /api/file-url/:id                 GET    会话文件访问 URL
//! - /api/files                        GET    会话文件列表
//! - /api/save-position                POST   保存播放位置
//! - /api/get-position/:id             GET    获取播放位置
//! - /api/voice-command                POST   语音指令识别
//! - /api/cleanup                      POST   清理会话
//! - /api/library                      GET    音乐库列表
//! - /api/library/upload               POST   上传到音乐库
//! - /api/library/:id                  DELETE 删除音乐库文件
//! - /api/library/:id/url              GET    音乐库文件访问 URL
//! - /api/admin/voice-commands         GET    指令映射列表（?owner=）
//! - /api/admin/voice-commands         POST   创建指令映射
//! - /api/admin/voice-commands/:id     DELETE 删除指令映射
//! - /media/temp_uploads/:filename     GET    会话临时文件
//! - /media/music/:filename            GET    音乐库文件

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .nest("/media", media_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/test", get(handlers::api_test))
        .route("/upload", post(handlers::upload_file))
        .route("/upload-lightweight", post(handlers::upload_file_lightweight))
        .route("/delete/:file_id", delete(handlers::delete_file))
        .route("/file-data/:file_id", get(handlers::get_file_data))
        .route("/file-url/:file_id", get(handlers::get_file_url))
        .route("/files", get(handlers::list_files))
        .route("/save-position", post(handlers::save_position))
        .route("/get-position/:file_id", get(handlers::get_position))
        .route("/voice-command", post(handlers::voice_command))
        .route("/cleanup", post(handlers::cleanup_session))
        .nest("/library", library_routes())
        .nest("/admin", admin_routes())
}

/// 音乐库路由
fn library_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_library))
        .route("/upload", post(handlers::upload_library_file))
        .route("/:file_id", delete(handlers::delete_library_file))
        .route("/:file_id/url", get(handlers::get_library_file_url))
}

/// 管理路由
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/voice-commands",
            get(handlers::list_voice_commands).post(handlers::create_voice_command),
        )
        .route("/voice-commands/:id", delete(handlers::delete_voice_command))
}

/// 媒体文件路由
fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/temp_uploads/:filename", get(handlers::temp_upload_media))
        .route("/music/:filename", get(handlers::library_media))
}
