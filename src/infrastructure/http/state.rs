//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CleanupSessionHandler, CreateVoiceCommandMappingHandler, DeleteLibraryFileHandler,
    DeleteSessionFileHandler, DeleteVoiceCommandMappingHandler, RecognitionSettings,
    RecognizeVoiceCommandHandler, SavePositionHandler, UploadLimits, UploadMusicHandler,
    // Query handlers
    GetFileDataHandler, GetFileUrlHandler, GetLibraryFileUrlHandler, GetPositionHandler,
    ListLibraryHandler, ListSessionFilesHandler, ListVoiceCommandMappingsHandler,
    OpenMediaFileHandler,
    // Ports
    AudioMetadataPort, AudioStoragePort, MusicFileRepositoryPort, PlaybackPositionRepositoryPort,
    SessionStorePort, TranscriptionQueuePort, VoiceCommandRepositoryPort,
};
use crate::infrastructure::adapters::{AudioCaptureConfig, RequestAudioCapture};

use super::middleware::{SessionLayerState, DEFAULT_SESSION_COOKIE};

/// HTTP 层可调参数
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub session_cookie: String,
    pub upload_limits: UploadLimits,
    pub recognition: RecognitionSettings,
    pub capture: AudioCaptureConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            upload_limits: UploadLimits::default(),
            recognition: RecognitionSettings::default(),
            capture: AudioCaptureConfig::default(),
        }
    }
}

/// 出站端口集合
#[derive(Clone)]
pub struct AppPorts {
    pub session_store: Arc<dyn SessionStorePort>,
    pub music_repo: Arc<dyn MusicFileRepositoryPort>,
    pub position_repo: Arc<dyn PlaybackPositionRepositoryPort>,
    pub voice_command_repo: Arc<dyn VoiceCommandRepositoryPort>,
    pub storage: Arc<dyn AudioStoragePort>,
    pub metadata: Arc<dyn AudioMetadataPort>,
    pub transcription_queue: Arc<dyn TranscriptionQueuePort>,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_store: Arc<dyn SessionStorePort>,
    pub session_cookie: String,
    pub capture: RequestAudioCapture,

    // ========== Command Handlers ==========
    pub upload_music_handler: UploadMusicHandler,
    pub delete_session_file_handler: DeleteSessionFileHandler,
    pub delete_library_file_handler: DeleteLibraryFileHandler,
    pub cleanup_session_handler: Arc<CleanupSessionHandler>,
    pub save_position_handler: SavePositionHandler,
    pub recognize_voice_handler: RecognizeVoiceCommandHandler,
    pub create_voice_command_handler: CreateVoiceCommandMappingHandler,
    pub delete_voice_command_handler: DeleteVoiceCommandMappingHandler,

    // ========== Query Handlers ==========
    pub get_file_data_handler: GetFileDataHandler,
    pub get_file_url_handler: GetFileUrlHandler,
    pub list_session_files_handler: ListSessionFilesHandler,
    pub list_library_handler: ListLibraryHandler,
    pub get_library_file_url_handler: GetLibraryFileUrlHandler,
    pub open_media_file_handler: OpenMediaFileHandler,
    pub get_position_handler: GetPositionHandler,
    pub list_voice_commands_handler: ListVoiceCommandMappingsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ports: AppPorts, settings: AppSettings) -> Self {
        let AppPorts {
            session_store,
            music_repo,
            position_repo,
            voice_command_repo,
            storage,
            metadata,
            transcription_queue,
        } = ports;

        Self {
            session_store: session_store.clone(),
            session_cookie: settings.session_cookie,
            capture: RequestAudioCapture::new(settings.capture),

            // Command handlers
            upload_music_handler: UploadMusicHandler::new(
                session_store.clone(),
                music_repo.clone(),
                storage.clone(),
                metadata,
                settings.upload_limits,
            ),
            delete_session_file_handler: DeleteSessionFileHandler::new(
                session_store.clone(),
                storage.clone(),
            ),
            delete_library_file_handler: DeleteLibraryFileHandler::new(
                music_repo.clone(),
                storage.clone(),
            ),
            cleanup_session_handler: Arc::new(CleanupSessionHandler::new(
                session_store.clone(),
                position_repo.clone(),
                storage.clone(),
            )),
            save_position_handler: SavePositionHandler::new(position_repo.clone()),
            recognize_voice_handler: RecognizeVoiceCommandHandler::new(
                transcription_queue,
                settings.recognition,
            ),
            create_voice_command_handler: CreateVoiceCommandMappingHandler::new(
                voice_command_repo.clone(),
            ),
            delete_voice_command_handler: DeleteVoiceCommandMappingHandler::new(
                voice_command_repo.clone(),
            ),

            // Query handlers
            get_file_data_handler: GetFileDataHandler::new(session_store.clone(), storage.clone()),
            get_file_url_handler: GetFileUrlHandler::new(session_store.clone(), storage.clone()),
            list_session_files_handler: ListSessionFilesHandler::new(session_store.clone()),
            list_library_handler: ListLibraryHandler::new(music_repo.clone()),
            get_library_file_url_handler: GetLibraryFileUrlHandler::new(
                music_repo.clone(),
                storage.clone(),
            ),
            open_media_file_handler: OpenMediaFileHandler::new(
                session_store,
                music_repo,
                storage,
            ),
            get_position_handler: GetPositionHandler::new(position_repo),
            list_voice_commands_handler: ListVoiceCommandMappingsHandler::new(voice_command_repo),
        }
    }

    /// 会话中间件所需状态
    pub fn session_layer(&self) -> SessionLayerState {
        SessionLayerState {
            store: self.session_store.clone(),
            cookie_name: self.session_cookie.clone(),
        }
    }
}
