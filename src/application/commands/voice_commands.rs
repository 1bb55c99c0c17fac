//! Voice Commands

use crate::application::ports::AudioSample;

/// 识别语音指令命令
#[derive(Debug, Clone)]
pub struct RecognizeVoiceCommand {
    pub sample: AudioSample,
}

/// 创建指令映射命令
#[derive(Debug, Clone)]
pub struct CreateVoiceCommandMapping {
    pub command: String,
    pub action: String,
    pub owner: String,
    pub is_active: bool,
}

/// 删除指令映射命令
#[derive(Debug, Clone)]
pub struct DeleteVoiceCommandMapping {
    pub id: String,
}
