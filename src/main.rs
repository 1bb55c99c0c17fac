//! Melo - 语音控制的音乐播放器后端
//!
//! - Domain: music/, voice/, session
//! - Application: commands, queries, ports
//! - Infrastructure: http, memory, worker, persistence, adapters

use std::sync::Arc;
use std::time::Duration;

use melo::application::{RecognitionSettings, SessionStorePort, SpeechRecognizerPort, UploadLimits};
use melo::config::{load_config, print_config, AppConfig, SessionBackend, SpeechProvider};
use melo::infrastructure::adapters::{
    AudioCaptureConfig, FakeSpeechRecognizer, FileAudioStorage, HttpSpeechClient,
    HttpSpeechClientConfig, SymphoniaMetadataProbe,
};
use melo::infrastructure::http::{AppPorts, AppSettings, AppState, HttpServer, ServerConfig};
use melo::infrastructure::memory::InMemorySessionStore;
use melo::infrastructure::persistence::sled::{SledSessionConfig, SledSessionStore};
use melo::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteMusicFileRepository,
    SqlitePlaybackPositionRepository, SqliteVoiceCommandRepository,
};
use melo::infrastructure::worker::{
    SessionGcConfig, SessionGcWorker, TranscriptionWorker, TranscriptionWorkerConfig,
};

/// 创建会话存储
fn build_session_store(config: &AppConfig) -> anyhow::Result<Arc<dyn SessionStorePort>> {
    Ok(match config.session.backend {
        SessionBackend::Sled => {
            let sled_config = SledSessionConfig {
                db_path: config.storage.session_db_path.clone(),
            };
            Arc::new(SledSessionStore::new(&sled_config)?)
        }
        SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
    })
}

/// 创建语音识别客户端
fn build_recognizer(config: &AppConfig) -> anyhow::Result<Arc<dyn SpeechRecognizerPort>> {
    Ok(match config.speech.provider {
        SpeechProvider::Http => {
            let mut client_config = HttpSpeechClientConfig::new(&config.speech.url)
                .with_timeout(config.speech.timeout_secs);
            if let Some(key) = &config.speech.api_key {
                client_config = client_config.with_api_key(key);
            }
            Arc::new(HttpSpeechClient::new(client_config)?)
        }
        SpeechProvider::Fake => {
            tracing::warn!(
                transcript = %config.speech.fake_transcript,
                "Using fake speech recognizer"
            );
            Arc::new(FakeSpeechRecognizer::transcript(&config.speech.fake_transcript))
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},melo={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Melo - voice controlled music player");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.media_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Some(parent) = std::path::Path::new(&config.storage.session_db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建适配器
    let session_store = build_session_store(&config)?;
    let storage = Arc::new(FileAudioStorage::new(&config.storage.media_dir).await?);
    let recognizer = build_recognizer(&config)?;

    // 创建 TranscriptionWorker
    let worker_config = TranscriptionWorkerConfig {
        max_concurrent: config.voice.max_concurrent,
        queue_capacity: config.voice.queue_capacity,
    };
    let (transcription_worker, transcription_queue) =
        TranscriptionWorker::new(worker_config, recognizer);
    tokio::spawn(transcription_worker.run());

    let ports = AppPorts {
        session_store: session_store.clone(),
        music_repo: Arc::new(SqliteMusicFileRepository::new(pool.clone())),
        position_repo: Arc::new(SqlitePlaybackPositionRepository::new(pool.clone())),
        voice_command_repo: Arc::new(SqliteVoiceCommandRepository::new(pool.clone())),
        storage,
        metadata: Arc::new(SymphoniaMetadataProbe::new()),
        transcription_queue: Arc::new(transcription_queue),
    };

    let settings = AppSettings {
        session_cookie: config.session.cookie_name.clone(),
        upload_limits: UploadLimits {
            max_file_bytes: config.upload.max_file_bytes,
            max_encoded_bytes: config.upload.max_encoded_bytes,
        },
        recognition: RecognitionSettings {
            language: config.speech.language.clone(),
            phrase_time_limit: config.voice.phrase_time_limit(),
            result_timeout: config.voice.recognition_timeout(),
        },
        capture: AudioCaptureConfig {
            listen_timeout: config.voice.listen_timeout(),
            phrase_time_limit: config.voice.phrase_time_limit(),
            max_bytes: config.voice.max_sample_bytes,
        },
    };

    let state = AppState::new(ports, settings);

    // 启动 SessionGcWorker
    if config.gc.enabled {
        let gc_config = SessionGcConfig {
            interval: Duration::from_secs(config.gc.interval_secs),
            session_expire_secs: config.gc.session_expire_secs,
        };
        let gc_worker = SessionGcWorker::new(
            gc_config,
            session_store.clone(),
            state.cleanup_session_handler.clone(),
        );
        tokio::spawn(gc_worker.run());
    }

    // 创建 HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    server_config.body_limit = config.upload.body_limit_bytes;
    if config.server.static_files.enabled {
        server_config = server_config.with_static_dir(&config.server.static_files.dir);
    }

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                // 无法监听信号时不主动退出
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}
