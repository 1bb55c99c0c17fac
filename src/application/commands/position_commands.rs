//! Playback Position Commands

use crate::domain::SessionId;

/// 保存播放位置命令
#[derive(Debug, Clone)]
pub struct SavePosition {
    pub owner: SessionId,
    pub file_id: String,
    pub position: f64,
}
