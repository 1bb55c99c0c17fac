//! Transcription Queue Port - 转写任务队列
//!
//! 请求线程只提交任务并持有 ticket，真正的识别在 worker 中执行。
//! 丢弃 ticket 即取消尚未开始的任务。

use std::time::Duration;
use tokio::sync::oneshot;

use super::{RecognitionError, RecognizeRequest};

/// 转写任务
#[derive(Debug)]
pub struct TranscriptionJob {
    pub request: RecognizeRequest,
    pub reply: oneshot::Sender<Result<String, RecognitionError>>,
}

impl TranscriptionJob {
    /// 创建任务及对应 ticket
    pub fn new(request: RecognizeRequest) -> (Self, TranscriptionTicket) {
        let (reply, receiver) = oneshot::channel();
        (Self { request, reply }, TranscriptionTicket { receiver })
    }

    /// 提交方是否已放弃等待
    pub fn is_cancelled(&self) -> bool {
        self.reply.is_closed()
    }
}

/// 转写结果句柄
#[derive(Debug)]
pub struct TranscriptionTicket {
    receiver: oneshot::Receiver<Result<String, RecognitionError>>,
}

impl TranscriptionTicket {
    /// 等待结果，超时后放弃（worker 侧会看到 ticket 已关闭）
    pub async fn wait(self, timeout: Duration) -> Result<String, RecognitionError> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RecognitionError::WorkerUnavailable),
            Err(_) => Err(RecognitionError::Timeout(timeout)),
        }
    }
}

/// Transcription Queue Port
pub trait TranscriptionQueuePort: Send + Sync {
    /// 提交识别请求，立即返回 ticket
    fn submit(&self, request: RecognizeRequest) -> Result<TranscriptionTicket, RecognitionError>;
}
