//! Session Store Port - 会话存储
//!
//! 每个会话只有一个文件槽位（容量为 1 的缓存）：
//! 写入新文件时旧文件被显式淘汰并返回给调用方

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::music::{MusicFile, MusicFileId};
use crate::domain::SessionId;

/// Session Store 错误
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 会话槽位
///
/// 最后活动时间不在这里，由各存储单独记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// 当前文件槽位
    pub current: Option<MusicFile>,
    pub created_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new() -> Self {
        Self {
            current: None,
            created_at: Utc::now(),
        }
    }

    /// 槽位中的文件是否为指定 ID
    pub fn holds(&self, file_id: MusicFileId) -> bool {
        self.current.as_ref().map(|f| f.id == file_id).unwrap_or(false)
    }
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// 闲置判定的截止时间，早于它的会话视为过期
///
/// 超时无法表示为时间差时返回 None（没有会话过期）
pub fn idle_cutoff(now: DateTime<Utc>, idle_timeout_secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(idle_timeout_secs).ok()?;
    now.checked_sub_signed(TimeDelta::try_seconds(secs)?)
}

/// Session Store Port
pub trait SessionStorePort: Send + Sync {
    /// 放入文件，返回被淘汰的旧文件
    fn put_file(
        &self,
        session_id: &SessionId,
        file: MusicFile,
    ) -> Result<Option<MusicFile>, SessionStoreError>;

    /// 当前文件
    fn current_file(&self, session_id: &SessionId) -> Result<Option<MusicFile>, SessionStoreError>;

    /// 按 ID 查找（仅限本会话）
    fn find_file(
        &self,
        session_id: &SessionId,
        file_id: MusicFileId,
    ) -> Result<Option<MusicFile>, SessionStoreError> {
        Ok(self
            .current_file(session_id)?
            .filter(|file| file.id == file_id))
    }

    /// 按 ID 移除（仅限本会话），返回被移除的文件
    fn remove_file(
        &self,
        session_id: &SessionId,
        file_id: MusicFileId,
    ) -> Result<Option<MusicFile>, SessionStoreError>;

    /// 清空槽位，返回被移除的文件
    fn clear(&self, session_id: &SessionId) -> Result<Option<MusicFile>, SessionStoreError>;

    /// 删除整个会话
    fn drop_session(&self, session_id: &SessionId) -> Result<(), SessionStoreError>;

    /// 更新最后活动时间（不存在则创建）
    fn touch(&self, session_id: &SessionId) -> Result<(), SessionStoreError>;

    /// 获取所有过期会话
    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<SessionId>;
}
