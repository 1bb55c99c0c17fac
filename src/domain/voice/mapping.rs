//! Voice Context - 指令映射
//!
//! 用户自定义短语到动作名的映射，仅供管理接口维护

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VoiceError;

const MAX_FIELD_LEN: usize = 100;

/// 指令映射 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceCommandMappingId(Uuid);

impl VoiceCommandMappingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VoiceCommandMappingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VoiceCommandMappingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 指令映射
///
/// 不变量: (command, owner) 唯一，由存储层保证
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCommandMapping {
    pub id: VoiceCommandMappingId,
    pub command: String,
    pub action: String,
    pub owner: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl VoiceCommandMapping {
    pub fn new(
        command: impl Into<String>,
        action: impl Into<String>,
        owner: impl Into<String>,
        is_active: bool,
    ) -> Result<Self, VoiceError> {
        let command = command.into().trim().to_string();
        let action = action.into().trim().to_string();

        if command.is_empty() || command.chars().count() > MAX_FIELD_LEN {
            return Err(VoiceError::InvalidPhrase(command));
        }
        if action.is_empty() || action.chars().count() > MAX_FIELD_LEN {
            return Err(VoiceError::InvalidAction(action));
        }

        Ok(Self {
            id: VoiceCommandMappingId::new(),
            command,
            action,
            owner: owner.into(),
            is_active,
            created_at: Utc::now(),
        })
    }
}

impl std::fmt::Display for VoiceCommandMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.command, self.action)
    }
}
