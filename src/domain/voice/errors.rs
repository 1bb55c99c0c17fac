//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("无效的指令短语: {0}")]
    InvalidPhrase(String),

    #[error("无效的动作名称: {0}")]
    InvalidAction(String),
}
