//! Music Queries

use crate::application::ports::StorageArea;
use crate::domain::SessionId;

/// 获取会话文件内容（Base64）
#[derive(Debug, Clone)]
pub struct GetFileData {
    pub session_id: SessionId,
    pub file_id: String,
}

/// 获取会话文件访问 URL
#[derive(Debug, Clone)]
pub struct GetFileUrl {
    pub session_id: SessionId,
    pub file_id: String,
}

/// 列出会话文件（0 或 1 个）
#[derive(Debug, Clone)]
pub struct ListSessionFiles {
    pub session_id: SessionId,
}

/// 列出音乐库
#[derive(Debug, Clone, Default)]
pub struct ListLibrary;

/// 获取音乐库文件访问 URL
#[derive(Debug, Clone)]
pub struct GetLibraryFileUrl {
    pub file_id: String,
}

/// 打开媒体文件（流式输出）
#[derive(Debug, Clone)]
pub struct OpenMediaFile {
    pub session_id: SessionId,
    pub area: StorageArea,
    pub filename: String,
}
