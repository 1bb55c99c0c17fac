//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_metadata;
mod audio_storage;
mod repositories;
mod session_store;
mod speech_recognizer;
mod transcription_queue;

pub use audio_metadata::{AudioMetadataPort, MetadataError};
pub use audio_storage::{AudioStorageError, AudioStoragePort, StorageArea};
pub use repositories::{
    MusicFileRepositoryPort, PlaybackPositionRecord, PlaybackPositionRepositoryPort,
    RepositoryError, VoiceCommandRepositoryPort,
};
pub use session_store::{idle_cutoff, SessionEntry, SessionStoreError, SessionStorePort};
pub use speech_recognizer::{AudioSample, RecognitionError, RecognizeRequest, SpeechRecognizerPort};
pub use transcription_queue::{TranscriptionJob, TranscriptionQueuePort, TranscriptionTicket};
