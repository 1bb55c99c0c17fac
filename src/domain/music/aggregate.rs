//! Music Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AudioFormat, MusicFileId, StorageLocation};

/// 音乐文件
///
/// 不变量:
/// - filename 固定为 `{id}.{ext}`
/// - duration 为整秒，无法解析时为 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicFile {
    pub id: MusicFileId,
    /// 展示标题（上传时的原始文件名）
    pub title: String,
    pub filename: String,
    pub format: AudioFormat,
    pub duration_secs: u32,
    pub file_size: u64,
    /// 所属会话；音乐库文件可为空
    pub owner: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub storage: StorageLocation,
}

impl MusicFile {
    /// 为新上传分配 ID 与存储文件名
    pub fn allocate(format: AudioFormat) -> (MusicFileId, String) {
        let id = MusicFileId::new();
        let filename = format!("{}.{}", id, format.extension());
        (id, filename)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.storage, StorageLocation::Inline { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_filename() {
        let (id, filename) = MusicFile::allocate(AudioFormat::Flac);
        assert_eq!(filename, format!("{}.flac", id));
    }
}
