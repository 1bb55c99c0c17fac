//! Music Commands

use crate::domain::SessionId;

/// 上传目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Base64 存入会话槽位
    SessionInline,
    /// 写入临时目录，会话槽位保存路径
    SessionFilesystem,
    /// 写入音乐库并落库
    Library,
}

impl UploadTarget {
    pub fn is_session(&self) -> bool {
        !matches!(self, UploadTarget::Library)
    }
}

/// 上传音乐命令
#[derive(Debug, Clone)]
pub struct UploadMusic {
    pub session_id: SessionId,
    pub target: UploadTarget,
    /// 客户端声明的文件名
    pub original_name: String,
    pub data: Vec<u8>,
}

/// 删除会话文件命令
#[derive(Debug, Clone)]
pub struct DeleteSessionFile {
    pub session_id: SessionId,
    pub file_id: String,
}

/// 删除音乐库文件命令
#[derive(Debug, Clone)]
pub struct DeleteLibraryFile {
    pub file_id: String,
}

/// 清理会话命令
#[derive(Debug, Clone)]
pub struct CleanupSession {
    pub session_id: SessionId,
    /// 是否同时删除会话本身（过期回收时使用）
    pub expire: bool,
}
