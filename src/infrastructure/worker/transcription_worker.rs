//! Transcription Worker - 后台语音识别
//!
//! 请求处理只负责提交任务并等待 ticket；外部识别服务调用在此执行

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::ports::{
    RecognitionError, RecognizeRequest, SpeechRecognizerPort, TranscriptionJob,
    TranscriptionQueuePort, TranscriptionTicket,
};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct TranscriptionWorkerConfig {
    /// 最大并发识别数
    pub max_concurrent: usize,
    /// 队列容量
    pub queue_capacity: usize,
}

impl Default for TranscriptionWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            queue_capacity: 64,
        }
    }
}

/// 转写队列（提交端）
#[derive(Clone)]
pub struct TranscriptionQueue {
    sender: mpsc::Sender<TranscriptionJob>,
}

impl TranscriptionQueuePort for TranscriptionQueue {
    fn submit(&self, request: RecognizeRequest) -> Result<TranscriptionTicket, RecognitionError> {
        let (job, ticket) = TranscriptionJob::new(request);

        self.sender.try_send(job).map_err(|e| {
            tracing::warn!(error = %e, "Failed to enqueue transcription job");
            RecognitionError::WorkerUnavailable
        })?;

        Ok(ticket)
    }
}

/// 转写 Worker
pub struct TranscriptionWorker {
    config: TranscriptionWorkerConfig,
    queue_receiver: mpsc::Receiver<TranscriptionJob>,
    recognizer: Arc<dyn SpeechRecognizerPort>,
}

impl TranscriptionWorker {
    /// 创建 Worker 及其提交端
    pub fn new(
        config: TranscriptionWorkerConfig,
        recognizer: Arc<dyn SpeechRecognizerPort>,
    ) -> (Self, TranscriptionQueue) {
        let (sender, queue_receiver) = mpsc::channel(config.queue_capacity.max(1));
        let worker = Self {
            config,
            queue_receiver,
            recognizer,
        };
        (worker, TranscriptionQueue { sender })
    }

    /// 启动 Worker，所有提交端释放后退出
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "TranscriptionWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(job) = self.queue_receiver.recv().await {
            if job.is_cancelled() {
                tracing::debug!("Transcription job cancelled before start, skipping");
                continue;
            }

            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::error!("Failed to acquire semaphore permit");
                break;
            };

            let recognizer = self.recognizer.clone();
            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process_job(job, recognizer).await;
            });
        }

        tracing::info!("TranscriptionWorker stopped");
    }

    /// 处理单个任务
    async fn process_job(job: TranscriptionJob, recognizer: Arc<dyn SpeechRecognizerPort>) {
        // 等待 permit 期间可能已被取消
        if job.is_cancelled() {
            tracing::debug!("Transcription job cancelled while queued, skipping");
            return;
        }

        let TranscriptionJob { request, mut reply } = job;

        tokio::select! {
            result = recognizer.recognize(request) => {
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "Transcription failed");
                }
                if reply.send(result).is_err() {
                    tracing::debug!("Ticket dropped before result was delivered");
                }
            }
            _ = reply.closed() => {
                tracing::debug!("Ticket dropped, abandoning in-flight transcription");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioSample;
    use crate::infrastructure::adapters::FakeSpeechRecognizer;
    use std::time::Duration;

    fn request() -> RecognizeRequest {
        RecognizeRequest {
            sample: AudioSample {
                data: vec![0u8; 16],
                content_type: "audio/wav".to_string(),
                sample_rate: Some(16000),
            },
            language: "ja-JP".to_string(),
            phrase_time_limit: Duration::from_secs(3),
        }
    }

    #[tokio::test]
    async fn test_result_is_delivered() {
        let recognizer = Arc::new(FakeSpeechRecognizer::transcript("停止"));
        let (worker, queue) = TranscriptionWorker::new(Default::default(), recognizer.clone());
        tokio::spawn(worker.run());

        let ticket = queue.submit(request()).unwrap();
        let text = ticket.wait(Duration::from_secs(2)).await.unwrap();
        assert_eq!(text, "停止");
        assert_eq!(recognizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_dropped_ticket_skips_job() {
        let recognizer = Arc::new(FakeSpeechRecognizer::transcript("再生"));
        let (worker, queue) = TranscriptionWorker::new(Default::default(), recognizer.clone());

        // worker 启动前丢弃 ticket
        drop(queue.submit(request()).unwrap());
        let ticket = queue.submit(request()).unwrap();

        tokio::spawn(worker.run());
        assert_eq!(ticket.wait(Duration::from_secs(2)).await.unwrap(), "再生");
        assert_eq!(recognizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let recognizer =
            Arc::new(FakeSpeechRecognizer::transcript("再生").with_delay(Duration::from_secs(5)));
        let (worker, queue) = TranscriptionWorker::new(Default::default(), recognizer);
        tokio::spawn(worker.run());

        let ticket = queue.submit(request()).unwrap();
        let err = ticket.wait(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_worker_stops_when_queue_dropped() {
        let recognizer = Arc::new(FakeSpeechRecognizer::unintelligible());
        let (worker, queue) = TranscriptionWorker::new(Default::default(), recognizer);
        let handle = tokio::spawn(worker.run());

        let ticket = queue.submit(request()).unwrap();
        assert!(matches!(
            ticket.wait(Duration::from_secs(2)).await,
            Err(RecognitionError::UnknownValue)
        ));

        drop(queue);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
