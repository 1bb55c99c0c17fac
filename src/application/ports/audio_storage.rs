//! Audio Storage Port - 出站端口
//!
//! 定义上传文件在文件系统中的存取接口

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 存储区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// 会话级临时上传（会话结束即清理）
    TempUploads,
    /// 音乐库（持久化）
    Music,
}

impl StorageArea {
    pub fn dir_name(&self) -> &'static str {
        match self {
            StorageArea::TempUploads => "temp_uploads",
            StorageArea::Music => "music",
        }
    }

    /// 对外访问 URL 前缀
    pub fn url_prefix(&self) -> String {
        format!("/media/{}", self.dir_name())
    }
}

/// Audio Storage Port - 出站端口
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 获取文件在指定区域内的路径
    fn path_for(&self, area: StorageArea, filename: &str) -> PathBuf;

    /// 保存文件
    async fn save(
        &self,
        area: StorageArea,
        filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, AudioStorageError>;

    /// 读取文件
    async fn read(&self, path: &Path) -> Result<Vec<u8>, AudioStorageError>;

    /// 删除文件，文件不存在时返回 Ok(false)
    async fn delete(&self, path: &Path) -> Result<bool, AudioStorageError>;

    /// 检查文件是否存在
    async fn exists(&self, path: &Path) -> bool;
}
