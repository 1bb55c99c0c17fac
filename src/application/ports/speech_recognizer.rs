//! Speech Recognizer Port - 外部语音识别服务抽象

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 语音识别错误
#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    /// 识别服务没有返回可用文本
    #[error("speech was unintelligible")]
    UnknownValue,

    /// 识别服务本身出错
    #[error("{0}")]
    RequestError(String),

    /// 等待识别结果超时
    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    /// Worker 不可用（队列已关闭）
    #[error("transcription worker unavailable")]
    WorkerUnavailable,
}

/// 采集到的音频片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub data: Vec<u8>,
    pub content_type: String,
    /// 采样率（已知时随请求发送）
    pub sample_rate: Option<u32>,
}

impl AudioSample {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 识别请求
#[derive(Debug, Clone)]
pub struct RecognizeRequest {
    pub sample: AudioSample,
    /// 识别语言，例如 ja-JP
    pub language: String,
    /// 单句时长上限
    pub phrase_time_limit: Duration,
}

/// Speech Recognizer Port
#[async_trait]
pub trait SpeechRecognizerPort: Send + Sync {
    /// 将音频转写为文本
    async fn recognize(&self, request: RecognizeRequest) -> Result<String, RecognitionError>;
}
