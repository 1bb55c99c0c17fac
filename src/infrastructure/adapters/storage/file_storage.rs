//! File Storage - 文件系统音频存储实现
//!
//! 实现 AudioStoragePort trait
//!
//! 目录结构:
//! - {base_dir}/temp_uploads/{id}.{ext}  会话级上传
//! - {base_dir}/music/{id}.{ext}         音乐库

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{AudioStorageError, AudioStoragePort, StorageArea};

/// 文件系统音频存储
pub struct FileAudioStorage {
    /// 存储根目录（media_dir）
    base_dir: PathBuf,
}

impl FileAudioStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        for area in [StorageArea::TempUploads, StorageArea::Music] {
            fs::create_dir_all(base_dir.join(area.dir_name()))
                .await
                .map_err(|e| AudioStorageError::IoError(e.to_string()))?;
        }

        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    fn path_for(&self, area: StorageArea, filename: &str) -> PathBuf {
        self.base_dir.join(area.dir_name()).join(filename)
    }

    async fn save(
        &self,
        area: StorageArea,
        filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, AudioStorageError> {
        let dir = self.base_dir.join(area.dir_name());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        let path = self.path_for(area, filename);
        fs::write(&path, data)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            area = area.dir_name(),
            filename = %filename,
            size = data.len(),
            "Saved audio file"
        );

        Ok(path)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, AudioStorageError> {
        fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                AudioStorageError::FileNotFound(path.to_string_lossy().to_string())
            }
            _ => AudioStorageError::IoError(e.to_string()),
        })
    }

    async fn delete(&self, path: &Path) -> Result<bool, AudioStorageError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted audio file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_read_delete() {
        let temp_dir = tempdir().unwrap();
        let storage = FileAudioStorage::new(temp_dir.path()).await.unwrap();

        let path = storage
            .save(StorageArea::TempUploads, "abc.wav", b"fake wav data")
            .await
            .unwrap();
        assert_eq!(path, temp_dir.path().join("temp_uploads").join("abc.wav"));
        assert!(storage.exists(&path).await);

        let data = storage.read(&path).await.unwrap();
        assert_eq!(data, b"fake wav data");

        assert!(storage.delete(&path).await.unwrap());
        assert!(!storage.exists(&path).await);
        // 重复删除不报错
        assert!(!storage.delete(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = tempdir().unwrap();
        let storage = FileAudioStorage::new(temp_dir.path()).await.unwrap();

        let path = storage.path_for(StorageArea::Music, "missing.mp3");
        let err = storage.read(&path).await.unwrap_err();
        assert!(matches!(err, AudioStorageError::FileNotFound(_)));
    }
}
