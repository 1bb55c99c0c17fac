//! Voice Queries

/// 列出指令映射
#[derive(Debug, Clone, Default)]
pub struct ListVoiceCommandMappings {
    /// 为空时列出全部
    pub owner: Option<String>,
}
