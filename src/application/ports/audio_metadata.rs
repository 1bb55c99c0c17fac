//! Audio Metadata Port - 音频元数据探测

use thiserror::Error;

use crate::domain::music::AudioFormat;

/// 元数据解析错误
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Unsupported container: {0}")]
    Unsupported(String),

    #[error("No audio track found")]
    NoTrack,

    #[error("Unknown duration")]
    UnknownDuration,

    #[error("Probe failed: {0}")]
    ProbeFailed(String),
}

/// Audio Metadata Port
///
/// 调用方负责把失败降级为时长 0
pub trait AudioMetadataPort: Send + Sync {
    /// 探测音频时长（整秒）
    fn probe_duration_secs(&self, data: &[u8], format: AudioFormat) -> Result<u32, MetadataError>;
}
