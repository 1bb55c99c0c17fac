//! In-Memory Session Store Implementation

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{idle_cutoff, SessionEntry, SessionStoreError, SessionStorePort};
use crate::domain::music::{MusicFile, MusicFileId};
use crate::domain::SessionId;

/// 单个会话：槽位 + 最后活动时间
struct MemorySession {
    slot: SessionEntry,
    last_activity: DateTime<Utc>,
}

impl Default for MemorySession {
    fn default() -> Self {
        Self {
            slot: SessionEntry::new(),
            last_activity: Utc::now(),
        }
    }
}

/// 内存会话存储（进程重启后丢失）
///
/// 每个会话的修改都在 DashMap 分片锁内完成
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, MemorySession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 会话数量
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorePort for InMemorySessionStore {
    fn put_file(
        &self,
        session_id: &SessionId,
        file: MusicFile,
    ) -> Result<Option<MusicFile>, SessionStoreError> {
        let mut entry = self.sessions.entry(session_id.clone()).or_default();
        entry.last_activity = Utc::now();
        let evicted = entry.slot.current.replace(file);
        tracing::debug!(
            session_id = %session_id,
            evicted = evicted.is_some(),
            "Session slot updated"
        );
        Ok(evicted)
    }

    fn current_file(&self, session_id: &SessionId) -> Result<Option<MusicFile>, SessionStoreError> {
        Ok(self
            .sessions
            .get(session_id)
            .and_then(|entry| entry.slot.current.clone()))
    }

    fn remove_file(
        &self,
        session_id: &SessionId,
        file_id: MusicFileId,
    ) -> Result<Option<MusicFile>, SessionStoreError> {
        let Some(mut entry) = self.sessions.get_mut(session_id) else {
            return Ok(None);
        };
        if !entry.slot.holds(file_id) {
            return Ok(None);
        }
        entry.last_activity = Utc::now();
        Ok(entry.slot.current.take())
    }

    fn clear(&self, session_id: &SessionId) -> Result<Option<MusicFile>, SessionStoreError> {
        Ok(self
            .sessions
            .get_mut(session_id)
            .and_then(|mut entry| entry.slot.current.take()))
    }

    fn drop_session(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        if self.sessions.remove(session_id).is_some() {
            tracing::info!(session_id = %session_id, "Session dropped");
        }
        Ok(())
    }

    fn touch(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions
            .entry(session_id.clone())
            .or_default()
            .last_activity = Utc::now();
        Ok(())
    }

    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<SessionId> {
        let Some(cutoff) = idle_cutoff(Utc::now(), idle_timeout_secs) else {
            return Vec::new();
        };

        self.sessions
            .iter()
            .filter(|entry| entry.last_activity < cutoff)
            .map(|entry| entry.key().clone())
            .collect()
    }
}
