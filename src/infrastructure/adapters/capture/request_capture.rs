//! Request Audio Capture - 从请求体采集语音样本
//!
//! 浏览器录音通过请求体上传；读取受监听超时约束，
//! WAV 样本截断到单句时长上限，其余格式原样转发

use axum::body::Body;
use std::time::Duration;
use thiserror::Error;

use super::wav::clip_wav;
use crate::application::ports::AudioSample;

/// 采集错误
#[derive(Debug, Error)]
pub enum CaptureError {
    /// 超过监听时长仍未读完
    #[error("listening timed out while waiting for phrase to start ({0:?})")]
    ListenTimeout(Duration),

    #[error("Failed to read audio: {0}")]
    ReadFailed(String),
}

/// 采集配置
#[derive(Debug, Clone)]
pub struct AudioCaptureConfig {
    /// 监听超时
    pub listen_timeout: Duration,
    /// 单句时长上限
    pub phrase_time_limit: Duration,
    /// 请求体上限（字节）
    pub max_bytes: usize,
}

impl Default for AudioCaptureConfig {
    fn default() -> Self {
        Self {
            listen_timeout: Duration::from_secs(5),
            phrase_time_limit: Duration::from_secs(3),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// 请求体音频采集器
#[derive(Debug, Clone, Default)]
pub struct RequestAudioCapture {
    config: AudioCaptureConfig,
}

impl RequestAudioCapture {
    pub fn new(config: AudioCaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AudioCaptureConfig {
        &self.config
    }

    /// 读取请求体并整理为识别样本
    pub async fn capture(
        &self,
        body: Body,
        content_type: Option<&str>,
    ) -> Result<AudioSample, CaptureError> {
        let bytes = tokio::time::timeout(
            self.config.listen_timeout,
            axum::body::to_bytes(body, self.config.max_bytes),
        )
        .await
        .map_err(|_| CaptureError::ListenTimeout(self.config.listen_timeout))?
        .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;

        Ok(prepare_sample(
            bytes.to_vec(),
            content_type,
            self.config.phrase_time_limit,
        ))
    }
}

/// 识别 Content-Type 主类型与 rate 参数
fn split_content_type(content_type: Option<&str>) -> (String, Option<u32>) {
    let Some(raw) = content_type else {
        return ("application/octet-stream".to_string(), None);
    };

    let mut parts = raw.split(';').map(str::trim);
    let mime = parts
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("application/octet-stream")
        .to_ascii_lowercase();
    let rate = parts
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("rate"))
        .and_then(|(_, v)| v.trim().parse().ok());

    (mime, rate)
}

/// 整理样本：WAV 截断并读取采样率
pub fn prepare_sample(
    data: Vec<u8>,
    content_type: Option<&str>,
    phrase_time_limit: Duration,
) -> AudioSample {
    let (mime, rate) = split_content_type(content_type);
    let looks_like_wav = data.starts_with(b"RIFF") || mime.contains("wav");

    if looks_like_wav {
        match clip_wav(&data, phrase_time_limit.as_secs_f64()) {
            Ok(clipped) => {
                let sample_rate = super::wav::parse_wav_header(&clipped)
                    .ok()
                    .map(|h| h.fmt.sample_rate);
                if clipped.len() < data.len() {
                    tracing::debug!(
                        original = data.len(),
                        clipped = clipped.len(),
                        "Voice sample clipped to phrase limit"
                    );
                }
                return AudioSample {
                    data: clipped,
                    content_type: "audio/wav".to_string(),
                    sample_rate: sample_rate.or(rate),
                };
            }
            Err(e) if !data.is_empty() => {
                tracing::debug!(error = %e, "Sample is not a parsable WAV, forwarding as-is");
            }
            Err(_) => {}
        }
    }

    AudioSample {
        data,
        content_type: mime,
        sample_rate: rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::capture::wav::{parse_wav_header, pcm16_wav};

    #[test]
    fn test_wav_is_clipped() {
        let wav = pcm16_wav(16000, 1, &vec![0i16; 16000 * 6]);
        let sample = prepare_sample(wav, Some("audio/wav"), Duration::from_secs(3));

        assert_eq!(sample.content_type, "audio/wav");
        assert_eq!(sample.sample_rate, Some(16000));
        let header = parse_wav_header(&sample.data).unwrap();
        assert_eq!(header.duration_secs(), 3.0);
    }

    #[test]
    fn test_other_formats_pass_through() {
        let sample = prepare_sample(
            vec![1, 2, 3],
            Some("audio/x-flac; rate=44100"),
            Duration::from_secs(3),
        );
        assert_eq!(sample.data, vec![1, 2, 3]);
        assert_eq!(sample.content_type, "audio/x-flac");
        assert_eq!(sample.sample_rate, Some(44100));
    }

    #[test]
    fn test_empty_body() {
        let sample = prepare_sample(Vec::new(), None, Duration::from_secs(3));
        assert!(sample.is_empty());
        assert_eq!(sample.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_capture_reads_body() {
        let capture = RequestAudioCapture::default();
        let wav = pcm16_wav(8000, 1, &vec![0i16; 800]);
        let sample = capture
            .capture(Body::from(wav.clone()), Some("audio/wav"))
            .await
            .unwrap();
        assert_eq!(sample.data, wav);
        assert_eq!(sample.sample_rate, Some(8000));
    }
}
