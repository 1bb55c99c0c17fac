//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::ports::PlaybackPositionRecord;
use crate::domain::music::MusicFile;
use crate::domain::voice::VoiceCommandMapping;

// ============================================================================
// 通用响应
// ============================================================================

/// 只有提示信息的成功响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// Music DTOs
// ============================================================================

/// 文件信息（不含 Base64 内容）
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub id: String,
    pub title: String,
    pub filename: String,
    /// 时长（秒）
    pub duration: u32,
    pub file_size: u64,
    pub uploaded_at: String,
    /// "inline" | "filesystem"
    pub storage: &'static str,
}

impl From<&MusicFile> for FileInfo {
    fn from(file: &MusicFile) -> Self {
        Self {
            id: file.id.to_string(),
            title: file.title.clone(),
            filename: file.filename.clone(),
            duration: file.duration_secs,
            file_size: file.file_size,
            uploaded_at: file.uploaded_at.to_rfc3339(),
            storage: file.storage.kind(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file: FileInfo,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FileDataBody {
    pub success: bool,
    pub file_base64: String,
    pub file_info: FileInfo,
}

#[derive(Debug, Serialize)]
pub struct FileUrlBody {
    pub success: bool,
    pub file_url: String,
    pub file_info: FileInfo,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub success: bool,
    pub files: Vec<FileInfo>,
}

impl FileListResponse {
    pub fn new(files: &[MusicFile]) -> Self {
        Self {
            success: true,
            files: files.iter().map(FileInfo::from).collect(),
        }
    }
}

// ============================================================================
// Position DTOs
// ============================================================================

/// 保存播放位置请求，兼容 `file_id` 与 `music_file_id`
#[derive(Debug, Deserialize)]
pub struct SavePositionRequest {
    #[serde(default, alias = "music_file_id")]
    pub file_id: Option<String>,
    #[serde(default)]
    pub position: f64,
}

#[derive(Debug, Serialize)]
pub struct SavePositionResponse {
    pub success: bool,
    pub position: f64,
}

impl From<PlaybackPositionRecord> for SavePositionResponse {
    fn from(record: PlaybackPositionRecord) -> Self {
        Self {
            success: true,
            position: record.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetPositionResponse {
    pub success: bool,
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_at: Option<String>,
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceCommandResponse {
    pub success: bool,
    pub command: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateVoiceCommandRequest {
    pub command: String,
    pub action: String,
    pub owner: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct VoiceCommandFilter {
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceCommandMappingResponse {
    pub id: String,
    pub command: String,
    pub action: String,
    pub owner: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<VoiceCommandMapping> for VoiceCommandMappingResponse {
    fn from(mapping: VoiceCommandMapping) -> Self {
        Self {
            id: mapping.id.to_string(),
            command: mapping.command,
            action: mapping.action,
            owner: mapping.owner,
            is_active: mapping.is_active,
            created_at: mapping.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceCommandListResponse {
    pub success: bool,
    pub commands: Vec<VoiceCommandMappingResponse>,
}

#[derive(Debug, Serialize)]
pub struct VoiceCommandCreatedResponse {
    pub success: bool,
    pub command: VoiceCommandMappingResponse,
}
