//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Music Context: 音乐文件、上传策略
//! - Voice Context: 语音指令匹配、指令映射
//! - Session: 会话标识

pub mod music;
pub mod session;
pub mod voice;

pub use session::SessionId;
