//! Sled-based Session Store Implementation
//!
//! - `session:{id}`  → bincode 编码的 SessionEntry（文件槽位）
//! - `activity:{id}` → 最后活动时间（毫秒时间戳，大端 i64）
//!
//! 槽位的读改写都在 sled 事务内完成；touch 只写活动时间，不碰槽位

use chrono::{DateTime, Utc};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Batch, Db};
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{idle_cutoff, SessionEntry, SessionStoreError, SessionStorePort};
use crate::domain::music::{MusicFile, MusicFileId};
use crate::domain::SessionId;

const SESSION_PREFIX: &str = "session:";
const ACTIVITY_PREFIX: &str = "activity:";

/// Sled 会话存储配置
#[derive(Debug, Clone)]
pub struct SledSessionConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledSessionConfig {
    fn default() -> Self {
        Self {
            db_path: "data/sessions.sled".to_string(),
        }
    }
}

fn encode_entry(entry: &SessionEntry) -> Result<Vec<u8>, SessionStoreError> {
    bincode::serialize(entry).map_err(|e| SessionStoreError::SerializationError(e.to_string()))
}

fn decode_entry(bytes: &[u8]) -> Result<SessionEntry, SessionStoreError> {
    bincode::deserialize(bytes).map_err(|e| SessionStoreError::SerializationError(e.to_string()))
}

fn encode_activity(ts: DateTime<Utc>) -> [u8; 8] {
    ts.timestamp_millis().to_be_bytes()
}

fn decode_activity(bytes: &[u8]) -> Option<DateTime<Utc>> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    DateTime::from_timestamp_millis(i64::from_be_bytes(raw))
}

/// Sled 会话存储（进程重启后保留）
pub struct SledSessionStore {
    db: Db,
}

impl SledSessionStore {
    /// 创建新的存储实例
    pub fn new(config: &SledSessionConfig) -> Result<Self, SessionStoreError> {
        let db = sled::open(&config.db_path)
            .map_err(|e| SessionStoreError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            sessions = db.scan_prefix(ACTIVITY_PREFIX).count(),
            "SledSessionStore initialized"
        );

        Ok(Self { db })
    }

    /// 打开现有存储
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SessionStoreError> {
        let config = SledSessionConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), SessionStoreError> {
        self.db
            .flush()
            .map_err(|e| SessionStoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn slot_key(session_id: &SessionId) -> String {
        format!("{}{}", SESSION_PREFIX, session_id)
    }

    fn activity_key(session_id: &SessionId) -> String {
        format!("{}{}", ACTIVITY_PREFIX, session_id)
    }

    /// 在事务内读改写槽位
    ///
    /// `f` 返回 `(新槽位, 结果)`；新槽位为 None 时不写入。
    /// 事务冲突时 sled 会重新执行 `f`，因此 `f` 不能有副作用
    fn update_slot<A, F>(&self, session_id: &SessionId, f: F) -> Result<A, SessionStoreError>
    where
        F: Fn(Option<SessionEntry>) -> (Option<SessionEntry>, A),
    {
        use ConflictableTransactionError::Abort;

        let slot_key = Self::slot_key(session_id);
        let activity_key = Self::activity_key(session_id);

        self.db
            .transaction(|tx| {
                let current = match tx.get(slot_key.as_bytes())? {
                    Some(bytes) => Some(decode_entry(&bytes).map_err(Abort)?),
                    None => None,
                };

                let (next, result) = f(current);
                if let Some(entry) = next {
                    let bytes = encode_entry(&entry).map_err(Abort)?;
                    tx.insert(slot_key.as_bytes(), bytes)?;
                    tx.insert(activity_key.as_bytes(), &encode_activity(Utc::now())[..])?;
                }
                Ok(result)
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => SessionStoreError::DatabaseError(e.to_string()),
            })
    }
}

impl SessionStorePort for SledSessionStore {
    fn put_file(
        &self,
        session_id: &SessionId,
        file: MusicFile,
    ) -> Result<Option<MusicFile>, SessionStoreError> {
        let evicted = self.update_slot(session_id, |entry| {
            let mut entry = entry.unwrap_or_default();
            let evicted = entry.current.replace(file.clone());
            (Some(entry), evicted)
        })?;

        tracing::debug!(
            session_id = %session_id,
            evicted = evicted.is_some(),
            "Session slot updated"
        );
        Ok(evicted)
    }

    fn current_file(&self, session_id: &SessionId) -> Result<Option<MusicFile>, SessionStoreError> {
        let value = self
            .db
            .get(Self::slot_key(session_id))
            .map_err(|e| SessionStoreError::DatabaseError(e.to_string()))?;

        match value {
            Some(bytes) => Ok(decode_entry(&bytes)?.current),
            None => Ok(None),
        }
    }

    fn remove_file(
        &self,
        session_id: &SessionId,
        file_id: MusicFileId,
    ) -> Result<Option<MusicFile>, SessionStoreError> {
        self.update_slot(session_id, |entry| match entry {
            Some(mut entry) if entry.holds(file_id) => {
                let removed = entry.current.take();
                (Some(entry), removed)
            }
            _ => (None, None),
        })
    }

    fn clear(&self, session_id: &SessionId) -> Result<Option<MusicFile>, SessionStoreError> {
        self.update_slot(session_id, |entry| match entry {
            Some(mut entry) if entry.current.is_some() => {
                let removed = entry.current.take();
                (Some(entry), removed)
            }
            _ => (None, None),
        })
    }

    fn drop_session(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        let mut batch = Batch::default();
        batch.remove(Self::slot_key(session_id).as_bytes());
        batch.remove(Self::activity_key(session_id).as_bytes());

        self.db
            .apply_batch(batch)
            .map_err(|e| SessionStoreError::DatabaseError(e.to_string()))?;

        tracing::info!(session_id = %session_id, "Session dropped");
        Ok(())
    }

    fn touch(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        self.db
            .insert(
                Self::activity_key(session_id),
                &encode_activity(Utc::now())[..],
            )
            .map_err(|e| SessionStoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<SessionId> {
        let Some(cutoff) = idle_cutoff(Utc::now(), idle_timeout_secs) else {
            return Vec::new();
        };
        let mut expired = Vec::new();

        for item in self.db.scan_prefix(ACTIVITY_PREFIX) {
            let (key, value) = match item {
                Ok(kv) => kv,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to scan session store");
                    continue;
                }
            };

            let Some(session_id) = std::str::from_utf8(&key)
                .ok()
                .and_then(|k| k.strip_prefix(ACTIVITY_PREFIX))
                .and_then(SessionId::parse)
            else {
                continue;
            };

            match decode_activity(&value) {
                Some(last_activity) if last_activity < cutoff => expired.push(session_id),
                Some(_) => {}
                None => {
                    // 无法解码的条目同样视为过期，交给 GC 清理
                    tracing::warn!(session_id = %session_id, "Corrupted session activity");
                    expired.push(session_id);
                }
            }
        }

        expired
    }
}
