//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::music::{MusicFile, MusicFileId};
use crate::domain::voice::{VoiceCommandMapping, VoiceCommandMappingId};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Music File Repository
// ============================================================================

/// 音乐库 Repository Port
#[async_trait]
pub trait MusicFileRepositoryPort: Send + Sync {
    /// 保存音乐文件
    async fn save(&self, file: &MusicFile) -> Result<(), RepositoryError>;

    /// 根据 ID 查找
    async fn find_by_id(&self, id: MusicFileId) -> Result<Option<MusicFile>, RepositoryError>;

    /// 根据存储文件名查找
    async fn find_by_filename(&self, filename: &str) -> Result<Option<MusicFile>, RepositoryError>;

    /// 获取全部（按上传时间倒序）
    async fn find_all(&self) -> Result<Vec<MusicFile>, RepositoryError>;

    /// 删除，返回是否存在
    async fn delete(&self, id: MusicFileId) -> Result<bool, RepositoryError>;
}

// ============================================================================
// Playback Position Repository
// ============================================================================

/// 播放位置记录
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackPositionRecord {
    pub owner: String,
    pub file_id: String,
    /// 秒，不做范围限制
    pub position: f64,
    pub last_played_at: DateTime<Utc>,
}

/// 播放位置 Repository Port
///
/// 不变量: 每个 (owner, file_id) 至多一条记录
#[async_trait]
pub trait PlaybackPositionRepositoryPort: Send + Sync {
    /// 不存在则创建，存在则覆盖
    async fn upsert(&self, record: &PlaybackPositionRecord) -> Result<(), RepositoryError>;

    /// 查找播放位置
    async fn find(
        &self,
        owner: &str,
        file_id: &str,
    ) -> Result<Option<PlaybackPositionRecord>, RepositoryError>;

    /// 删除某个 owner 的全部记录，返回删除数量
    async fn delete_by_owner(&self, owner: &str) -> Result<u64, RepositoryError>;
}

// ============================================================================
// Voice Command Repository
// ============================================================================

/// 指令映射 Repository Port
#[async_trait]
pub trait VoiceCommandRepositoryPort: Send + Sync {
    /// 新增映射，(command, owner) 冲突时返回 Duplicate
    async fn insert(&self, mapping: &VoiceCommandMapping) -> Result<(), RepositoryError>;

    /// 列出映射，owner 为空时列出全部
    async fn find_all(&self, owner: Option<&str>)
        -> Result<Vec<VoiceCommandMapping>, RepositoryError>;

    /// 删除，返回是否存在
    async fn delete(&self, id: VoiceCommandMappingId) -> Result<bool, RepositoryError>;
}
