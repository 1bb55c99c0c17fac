//! Session 标识
//!
//! 会话 ID 由服务端签发，通过 cookie 在请求间传递

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 会话 ID 最大长度
const MAX_SESSION_ID_LEN: usize = 64;

/// 会话唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// 签发新的会话 ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// 解析客户端传入的会话 ID
    ///
    /// 只接受字母、数字和 `-`，长度 1..=64；其余一律视为无效
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_SESSION_ID_LEN {
            return None;
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
