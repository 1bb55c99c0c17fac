//! HTTP Speech Client - 调用外部语音识别服务
//!
//! 实现 SpeechRecognizerPort trait
//!
//! 外部识别 API（Google Speech API v2 兼容）:
//! POST {url}?client=chromium&lang=ja-JP&key=...
//! Request: 音频二进制，Content-Type: audio/...; rate=16000
//! Response: 多行 JSON，每行 {"result":[{"alternative":[{"transcript":"..."}]}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{RecognitionError, RecognizeRequest, SpeechRecognizerPort};

/// 识别响应（单行）
#[derive(Debug, Deserialize)]
struct RecognizeResponseLine {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<RecognizeAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognizeAlternative {
    #[serde(default)]
    transcript: String,
}

/// 从响应体中取第一个非空转写结果
pub fn parse_transcript(body: &str) -> Result<String, RecognitionError> {
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed: RecognizeResponseLine = serde_json::from_str(line).map_err(|e| {
            RecognitionError::RequestError(format!("Invalid recognition response: {}", e))
        })?;

        let transcript = parsed
            .result
            .into_iter()
            .flat_map(|r| r.alternative)
            .map(|a| a.transcript.trim().to_string())
            .find(|t| !t.is_empty());

        if let Some(text) = transcript {
            return Ok(text);
        }
    }

    Err(RecognitionError::UnknownValue)
}

/// HTTP 语音识别客户端配置
#[derive(Debug, Clone)]
pub struct HttpSpeechClientConfig {
    /// 识别服务 URL
    pub url: String,
    /// API Key（为空时不附带）
    pub api_key: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSpeechClientConfig {
    fn default() -> Self {
        Self {
            url: "http://www.google.com/speech-api/v2/recognize".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl HttpSpeechClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 语音识别客户端
pub struct HttpSpeechClient {
    client: Client,
    config: HttpSpeechClientConfig,
}

impl HttpSpeechClient {
    /// 创建新的客户端
    pub fn new(config: HttpSpeechClientConfig) -> Result<Self, RecognitionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecognitionError::RequestError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn query_params(&self, language: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("client", "chromium".to_string()),
            ("lang", language.to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        params
    }
}

#[async_trait]
impl SpeechRecognizerPort for HttpSpeechClient {
    async fn recognize(&self, request: RecognizeRequest) -> Result<String, RecognitionError> {
        let content_type = match request.sample.sample_rate {
            Some(rate) => format!("{}; rate={}", request.sample.content_type, rate),
            None => request.sample.content_type.clone(),
        };

        tracing::debug!(
            url = %self.config.url,
            language = %request.language,
            content_type = %content_type,
            audio_size = request.sample.data.len(),
            phrase_time_limit = ?request.phrase_time_limit,
            "Sending speech recognition request"
        );

        let response = self
            .client
            .post(&self.config.url)
            .query(&self.query_params(&request.language))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(request.sample.data)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecognitionError::RequestError("recognition request timed out".to_string())
                } else if e.is_connect() {
                    RecognitionError::RequestError(format!(
                        "Cannot connect to speech service: {}",
                        e
                    ))
                } else {
                    RecognitionError::RequestError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::RequestError(format!(
                "recognition request failed: HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| {
                RecognitionError::RequestError(format!("Failed to read response: {}", e))
            })?;

        let transcript = parse_transcript(&body)?;
        tracing::info!(transcript = %transcript, "Speech recognition completed");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpSpeechClientConfig::new("http://example.com/recognize")
            .with_api_key("secret")
            .with_timeout(3);
        assert_eq!(config.url, "http://example.com/recognize");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_parse_streaming_response() {
        let body = "{\"result\":[]}\n{\"result\":[{\"alternative\":[{\"transcript\":\"再生して\",\"confidence\":0.92},{\"transcript\":\"再生した\"}],\"final\":true}],\"result_index\":0}\n";
        assert_eq!(parse_transcript(body).unwrap(), "再生して");
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(matches!(
            parse_transcript("{\"result\":[]}\n"),
            Err(RecognitionError::UnknownValue)
        ));
        assert!(matches!(parse_transcript(""), Err(RecognitionError::UnknownValue)));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_transcript("<html>"),
            Err(RecognitionError::RequestError(_))
        ));
    }

    #[test]
    fn test_query_params() {
        let client = HttpSpeechClient::new(HttpSpeechClientConfig::default()).unwrap();
        let params = client.query_params("ja-JP");
        assert_eq!(params.len(), 2);
        assert_eq!(params[1], ("lang", "ja-JP".to_string()));
    }
}
