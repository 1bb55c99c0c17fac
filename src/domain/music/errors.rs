//! Music Context - Errors
//!
//! 错误信息直接面向前端展示

use thiserror::Error;

/// 上传校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("ファイルが選択されていません")]
    MissingFile,

    #[error("対応していないファイル形式です: {extension}")]
    InvalidFormat { extension: String },

    #[error("ファイルサイズが大きすぎます（{}MB以下）", .limit_bytes / (1024 * 1024))]
    TooLarge { size: u64, limit_bytes: u64 },

    #[error("ファイルが大きすぎてセッションに保存できません（{}MB以下）", .file_limit_bytes / (1024 * 1024))]
    EncodedTooLarge {
        encoded_size: u64,
        file_limit_bytes: u64,
    },
}
