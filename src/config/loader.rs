//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, SessionBackend, SpeechProvider};

/// 会话闲置超时上限（十年）
pub const MAX_SESSION_EXPIRE_SECS: u64 = 10 * 365 * 24 * 3600;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "MELO";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `MELO_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `MELO_SERVER__PORT=8080`
/// - `MELO_SPEECH__API_KEY=...`
/// - `MELO_SESSION__BACKEND=memory`
/// - `MELO_STORAGE__MEDIA_DIR=/data/media`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("database.path", "data/melo.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.media_dir", "data/media")?
        .set_default("storage.session_db_path", "data/sessions.sled")?
        .set_default("session.backend", "sled")?
        .set_default("session.cookie_name", "melo_session")?
        .set_default("speech.provider", "http")?
        .set_default("speech.language", "ja-JP")?
        .set_default("speech.timeout_secs", 10)?
        .set_default("voice.listen_timeout_secs", 5)?
        .set_default("voice.phrase_time_limit_secs", 3)?
        .set_default("voice.recognition_timeout_secs", 15)?
        .set_default("gc.enabled", true)?
        .set_default("gc.interval_secs", 300)?
        .set_default("gc.session_expire_secs", 86400)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: MELO_SPEECH__URL=http://speech:9000/recognize
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.session.backend == SessionBackend::Sled && config.storage.session_db_path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Session db path cannot be empty when using the sled backend".to_string(),
        ));
    }

    // cookie 名会原样写入 Set-Cookie
    if config.session.cookie_name.is_empty()
        || !config
            .session
            .cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::ValidationError(format!(
            "Invalid session cookie name: {:?}",
            config.session.cookie_name
        )));
    }

    if config.upload.max_file_bytes == 0 || config.upload.max_encoded_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Upload limits must be greater than 0".to_string(),
        ));
    }

    if config.upload.body_limit_bytes as u64 <= config.upload.max_file_bytes {
        return Err(ConfigError::ValidationError(
            "Request body limit must exceed the file size limit".to_string(),
        ));
    }

    if config.speech.provider == SpeechProvider::Http && config.speech.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech URL cannot be empty".to_string(),
        ));
    }

    if config.voice.listen_timeout_secs == 0 || config.voice.recognition_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Voice timeouts must be greater than 0".to_string(),
        ));
    }

    if config.voice.max_concurrent == 0 || config.voice.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Transcription worker needs at least one slot and one queue entry".to_string(),
        ));
    }

    if config.gc.enabled && config.gc.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "GC interval cannot be 0 when GC is enabled".to_string(),
        ));
    }

    if config.gc.session_expire_secs > MAX_SESSION_EXPIRE_SECS {
        return Err(ConfigError::ValidationError(format!(
            "Session expire must not exceed {} seconds",
            MAX_SESSION_EXPIRE_SECS
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Media Directory: {:?}", config.storage.media_dir);
    tracing::info!("Session Backend: {:?}", config.session.backend);
    if config.session.backend == SessionBackend::Sled {
        tracing::info!("Session DB: {}", config.storage.session_db_path);
    }
    tracing::info!(
        "Upload Limits: file {} bytes, encoded {} bytes",
        config.upload.max_file_bytes,
        config.upload.max_encoded_bytes
    );
    tracing::info!("Speech Provider: {:?}", config.speech.provider);
    if config.speech.provider == SpeechProvider::Http {
        tracing::info!("Speech URL: {}", config.speech.url);
        let api_key = if config.speech.api_key.is_some() { "set" } else { "none" };
        tracing::info!("Speech API Key: {}", api_key);
    }
    tracing::info!("Speech Language: {}", config.speech.language);
    tracing::info!(
        "Voice: listen {}s, phrase {}s, result {}s",
        config.voice.listen_timeout_secs,
        config.voice.phrase_time_limit_secs,
        config.voice.recognition_timeout_secs
    );
    tracing::info!("GC Enabled: {}", config.gc.enabled);
    if config.gc.enabled {
        tracing::info!("GC Interval: {}s", config.gc.interval_secs);
        tracing::info!("Session Expire: {}s", config.gc.session_expire_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_cookie_name() {
        let mut config = AppConfig::default();
        config.session.cookie_name = "a b;c".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_speech_url_allowed_for_fake() {
        let mut config = AppConfig::default();
        config.speech.url = String::new();
        assert!(validate_config(&config).is_err());

        config.speech.provider = SpeechProvider::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_body_limit_must_exceed_file_limit() {
        let mut config = AppConfig::default();
        config.upload.body_limit_bytes = config.upload.max_file_bytes as usize;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_session_expire_is_bounded() {
        let mut config = AppConfig::default();
        config.gc.session_expire_secs = MAX_SESSION_EXPIRE_SECS;
        assert!(validate_config(&config).is_ok());

        config.gc.session_expire_secs = u64::MAX;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("melo.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[session]
backend = "memory"

[speech]
provider = "fake"
fake_transcript = "停止"

[upload]
max_file_bytes = 1048576
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.session.backend, SessionBackend::Memory);
        assert_eq!(config.speech.provider, SpeechProvider::Fake);
        assert_eq!(config.speech.fake_transcript, "停止");
        assert_eq!(config.upload.max_file_bytes, 1024 * 1024);
        assert_eq!(config.speech.language, "ja-JP");
    }
}
