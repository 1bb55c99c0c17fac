//! Fake Speech Recognizer - 不访问外部服务的识别器
//!
//! 本地开发与测试使用，返回预设结果

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{RecognitionError, RecognizeRequest, SpeechRecognizerPort};

/// 预设结果
#[derive(Debug, Clone)]
enum FakeOutcome {
    Transcript(String),
    Unintelligible,
    ServiceError(String),
}

/// Fake Speech Recognizer
#[derive(Debug)]
pub struct FakeSpeechRecognizer {
    outcome: FakeOutcome,
    /// 模拟识别延迟
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeSpeechRecognizer {
    fn with_outcome(outcome: FakeOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// 始终返回指定文本
    pub fn transcript(text: impl Into<String>) -> Self {
        Self::with_outcome(FakeOutcome::Transcript(text.into()))
    }

    /// 始终无法识别
    pub fn unintelligible() -> Self {
        Self::with_outcome(FakeOutcome::Unintelligible)
    }

    /// 始终返回服务错误
    pub fn service_error(message: impl Into<String>) -> Self {
        Self::with_outcome(FakeOutcome::ServiceError(message.into()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 实际执行识别的次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizerPort for FakeSpeechRecognizer {
    async fn recognize(&self, request: RecognizeRequest) -> Result<String, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            audio_size = request.sample.data.len(),
            language = %request.language,
            "FakeSpeechRecognizer: returning preset result"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.outcome {
            FakeOutcome::Transcript(text) => Ok(text.clone()),
            FakeOutcome::Unintelligible => Err(RecognitionError::UnknownValue),
            FakeOutcome::ServiceError(msg) => Err(RecognitionError::RequestError(msg.clone())),
        }
    }
}
