//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod music_file_repo;
mod playback_position_repo;
mod voice_command_repo;

pub use database::*;
pub use music_file_repo::*;
pub use playback_position_repo::*;
pub use voice_command_repo::*;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::application::ports::RepositoryError;

/// 时间戳统一写成定长 RFC3339，保证按字符串排序即按时间排序
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// sqlx 错误转换，唯一约束冲突单独识别
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Duplicate(db_err.message().to_string())
        }
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}
