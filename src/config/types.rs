//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 上传限制
    #[serde(default)]
    pub upload: UploadConfig,

    /// 语音识别服务配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 语音指令配置
    #[serde(default)]
    pub voice: VoiceConfig,

    /// GC 配置
    #[serde(default)]
    pub gc: GcConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置（前端页面）
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/melo.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 媒体根目录（其下为 temp_uploads/ 与 music/）
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// sled 会话库路径
    #[serde(default = "default_session_db_path")]
    pub session_db_path: String,
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("data/media")
}

fn default_session_db_path() -> String {
    "data/sessions.sled".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            session_db_path: default_session_db_path(),
        }
    }
}

/// 会话存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// sled，进程重启后保留
    #[default]
    Sled,
    /// 进程内存
    Memory,
}

/// 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,

    /// 会话 cookie 名
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_cookie_name() -> String {
    "melo_session".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            cookie_name: default_cookie_name(),
        }
    }
}

/// 上传限制
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// 原始文件上限（字节），默认 12MB
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// 会话内联 Base64 上限（字节），默认 16MB
    #[serde(default = "default_max_encoded_bytes")]
    pub max_encoded_bytes: u64,

    /// 请求体上限（字节），默认 50MB
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_max_file_bytes() -> u64 {
    12 * 1024 * 1024
}

fn default_max_encoded_bytes() -> u64 {
    16 * 1024 * 1024
}

fn default_body_limit() -> usize {
    50 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_encoded_bytes: default_max_encoded_bytes(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// 语音识别实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    /// 外部 HTTP 识别服务
    #[default]
    Http,
    /// 固定返回 `fake_transcript`，用于本地开发
    Fake,
}

/// 语音识别服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub provider: SpeechProvider,

    /// 识别服务 URL
    #[serde(default = "default_speech_url")]
    pub url: String,

    /// API Key
    #[serde(default)]
    pub api_key: Option<String>,

    /// 识别语言
    #[serde(default = "default_language")]
    pub language: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,

    /// fake 实现返回的文本
    #[serde(default = "default_fake_transcript")]
    pub fake_transcript: String,
}

fn default_speech_url() -> String {
    "http://www.google.com/speech-api/v2/recognize".to_string()
}

fn default_language() -> String {
    "ja-JP".to_string()
}

fn default_speech_timeout() -> u64 {
    10
}

fn default_fake_transcript() -> String {
    "再生".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::default(),
            url: default_speech_url(),
            api_key: None,
            language: default_language(),
            timeout_secs: default_speech_timeout(),
            fake_transcript: default_fake_transcript(),
        }
    }
}

/// 语音指令配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// 监听超时（秒）
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,

    /// 单句时长上限（秒）
    #[serde(default = "default_phrase_time_limit")]
    pub phrase_time_limit_secs: u64,

    /// 等待识别结果的上限（秒）
    #[serde(default = "default_recognition_timeout")]
    pub recognition_timeout_secs: u64,

    /// 最大并发识别数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 识别队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 语音请求体上限（字节）
    #[serde(default = "default_max_sample_bytes")]
    pub max_sample_bytes: usize,
}

fn default_listen_timeout() -> u64 {
    5
}

fn default_phrase_time_limit() -> u64 {
    3
}

fn default_recognition_timeout() -> u64 {
    15
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

fn default_max_sample_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            listen_timeout_secs: default_listen_timeout(),
            phrase_time_limit_secs: default_phrase_time_limit(),
            recognition_timeout_secs: default_recognition_timeout(),
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
            max_sample_bytes: default_max_sample_bytes(),
        }
    }
}

impl VoiceConfig {
    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }

    pub fn phrase_time_limit(&self) -> Duration {
        Duration::from_secs(self.phrase_time_limit_secs)
    }

    pub fn recognition_timeout(&self) -> Duration {
        Duration::from_secs(self.recognition_timeout_secs)
    }
}

/// GC（过期会话回收）配置
#[derive(Debug, Clone, Deserialize)]
pub struct GcConfig {
    /// 是否启用自动 GC
    #[serde(default = "default_gc_enabled")]
    pub enabled: bool,

    /// GC 间隔时间（秒）
    #[serde(default = "default_gc_interval")]
    pub interval_secs: u64,

    /// Session 过期时间（秒）
    #[serde(default = "default_session_expire")]
    pub session_expire_secs: u64,
}

fn default_gc_enabled() -> bool {
    true
}

fn default_gc_interval() -> u64 {
    300 // 5 分钟
}

fn default_session_expire() -> u64 {
    86400 // 24 小时
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: default_gc_enabled(),
            interval_secs: default_gc_interval(),
            session_expire_secs: default_session_expire(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.path, "data/melo.db");
        assert_eq!(config.session.backend, SessionBackend::Sled);
        assert_eq!(config.session.cookie_name, "melo_session");
        assert_eq!(config.upload.max_file_bytes, 12 * 1024 * 1024);
        assert_eq!(config.speech.language, "ja-JP");
        assert_eq!(config.voice.phrase_time_limit(), Duration::from_secs(3));
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/melo.db?mode=rwc");
    }
}
