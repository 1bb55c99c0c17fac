//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，HTTP 状态码映射只在 http/error.rs 中进行

use thiserror::Error;

use crate::application::ports::{
    AudioStorageError, RecognitionError, RepositoryError, SessionStoreError,
};
use crate::domain::music::UploadError;
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 文件格式不在允许列表
    #[error("{0}")]
    InvalidFormat(String),

    /// 超出大小上限
    #[error("{0}")]
    TooLarge(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("{0}")]
    ValidationError(String),

    /// 资源冲突
    #[error("{0}")]
    Conflict(String),

    /// 语音无法识别
    #[error("音声を認識できませんでした")]
    RecognitionFailed,

    /// 语音识别服务出错
    #[error("音声認識サービスでエラーが発生しました: {0}")]
    RecognitionServiceError(String),

    /// 识别成功但不是支持的指令
    #[error("認識された音声: \"{0}\" は対応していないコマンドです")]
    UnsupportedCommand(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 会话存储错误
    #[error("Session store error: {0}")]
    SessionError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("{0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<UploadError> for ApplicationError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFormat { .. } => Self::InvalidFormat(err.to_string()),
            UploadError::TooLarge { .. } | UploadError::EncodedTooLarge { .. } => {
                Self::TooLarge(err.to_string())
            }
            UploadError::MissingFile => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(msg) => Self::Conflict(msg),
            RepositoryError::NotFound(id) => Self::NotFound {
                resource_type: "Entity",
                id,
            },
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<SessionStoreError> for ApplicationError {
    fn from(err: SessionStoreError) -> Self {
        Self::SessionError(err.to_string())
    }
}

impl From<AudioStorageError> for ApplicationError {
    fn from(err: AudioStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<RecognitionError> for ApplicationError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::UnknownValue => Self::RecognitionFailed,
            RecognitionError::RequestError(msg) => Self::RecognitionServiceError(msg),
            // 超时与 worker 故障不属于识别结果，按未处理错误返回
            RecognitionError::Timeout(_) | RecognitionError::WorkerUnavailable => {
                Self::InternalError(err.to_string())
            }
        }
    }
}
