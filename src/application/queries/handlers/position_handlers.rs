//! Position Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::PlaybackPositionRepositoryPort;
use crate::application::queries::GetPosition;

/// 播放位置响应
#[derive(Debug, Clone, PartialEq)]
pub struct PositionResponse {
    pub position: f64,
    /// 从未保存过时为空
    pub last_played_at: Option<DateTime<Utc>>,
}

/// GetPosition Handler
///
/// 不存在的记录返回 0.0，不视为错误
pub struct GetPositionHandler {
    position_repo: Arc<dyn PlaybackPositionRepositoryPort>,
}

impl GetPositionHandler {
    pub fn new(position_repo: Arc<dyn PlaybackPositionRepositoryPort>) -> Self {
        Self { position_repo }
    }

    pub async fn handle(&self, query: GetPosition) -> Result<PositionResponse, ApplicationError> {
        let record = self
            .position_repo
            .find(query.owner.as_str(), query.file_id.trim())
            .await?;

        Ok(match record {
            Some(record) => PositionResponse {
                position: record.position,
                last_played_at: Some(record.last_played_at),
            },
            None => PositionResponse {
                position: 0.0,
                last_played_at: None,
            },
        })
    }
}
