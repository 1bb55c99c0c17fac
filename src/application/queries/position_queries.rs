//! Position Queries

use crate::domain::SessionId;

/// 获取播放位置
#[derive(Debug, Clone)]
pub struct GetPosition {
    pub owner: SessionId,
    pub file_id: String,
}
