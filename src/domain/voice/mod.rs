//! Voice Context - 语音指令限界上下文
//!
//! 职责:
//! - 识别文本到播放动作的关键词匹配
//! - 指令映射（管理用途，不参与匹配）

mod command;
mod errors;
mod mapping;

pub use command::{match_command, VoiceAction, KEYWORD_TABLE};
pub use errors::VoiceError;
pub use mapping::{VoiceCommandMapping, VoiceCommandMappingId};
