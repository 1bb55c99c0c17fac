//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（存储、仓储、会话、语音识别等）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Music commands
    CleanupSession,
    DeleteLibraryFile,
    DeleteSessionFile,
    UploadMusic,
    UploadTarget,
    // Position commands
    SavePosition,
    // Voice commands
    CreateVoiceCommandMapping,
    DeleteVoiceCommandMapping,
    RecognizeVoiceCommand,
    // Handlers
    handlers::{
        CleanupSessionHandler, CleanupSessionResponse, CreateVoiceCommandMappingHandler,
        DeleteLibraryFileHandler, DeleteSessionFileHandler, DeleteVoiceCommandMappingHandler,
        RecognitionSettings, RecognizeVoiceCommandHandler, SavePositionHandler, UploadLimits,
        UploadMusicHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio metadata
    AudioMetadataPort,
    MetadataError,
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    StorageArea,
    // Repositories
    MusicFileRepositoryPort,
    PlaybackPositionRecord,
    PlaybackPositionRepositoryPort,
    RepositoryError,
    VoiceCommandRepositoryPort,
    // Session store
    SessionEntry,
    SessionStoreError,
    SessionStorePort,
    // Speech recognition
    AudioSample,
    RecognitionError,
    RecognizeRequest,
    SpeechRecognizerPort,
    TranscriptionJob,
    TranscriptionQueuePort,
    TranscriptionTicket,
};

pub use queries::{
    // Music queries
    GetFileData,
    GetFileUrl,
    GetLibraryFileUrl,
    ListLibrary,
    ListSessionFiles,
    OpenMediaFile,
    // Position queries
    GetPosition,
    // Voice queries
    ListVoiceCommandMappings,
    // Handlers
    handlers::{
        FileDataResponse, FileUrlResponse, GetFileDataHandler, GetFileUrlHandler,
        GetLibraryFileUrlHandler, GetPositionHandler, ListLibraryHandler,
        ListSessionFilesHandler, ListVoiceCommandMappingsHandler, MediaFile,
        OpenMediaFileHandler, PositionResponse,
    },
};
