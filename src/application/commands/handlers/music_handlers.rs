//! Music Command Handlers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::{
    CleanupSession, DeleteLibraryFile, DeleteSessionFile, UploadMusic, UploadTarget,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioMetadataPort, AudioStoragePort, MusicFileRepositoryPort, PlaybackPositionRepositoryPort,
    SessionStorePort, StorageArea,
};
use crate::domain::music::{AudioFormat, MusicFile, MusicFileId, StorageLocation, UploadPolicy};

/// 上传大小限制
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// 原始文件上限（字节）
    pub max_file_bytes: u64,
    /// Base64 编码后上限（字节），仅会话内联存储
    pub max_encoded_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 12 * 1024 * 1024,
            max_encoded_bytes: 16 * 1024 * 1024,
        }
    }
}

impl UploadLimits {
    /// 获取指定上传目标的校验策略
    pub fn policy_for(&self, target: UploadTarget) -> UploadPolicy {
        match target {
            UploadTarget::SessionInline => {
                UploadPolicy::session_inline(self.max_file_bytes, self.max_encoded_bytes)
            }
            UploadTarget::SessionFilesystem => {
                UploadPolicy::session_filesystem(self.max_file_bytes)
            }
            UploadTarget::Library => UploadPolicy::library(self.max_file_bytes),
        }
    }
}

/// 删除文件在文件系统中的实体，失败只记录日志
pub(crate) async fn discard_artifact(storage: &dyn AudioStoragePort, file: &MusicFile) {
    let Some(path) = file.storage.path() else {
        return;
    };

    match storage.delete(path).await {
        Ok(true) => {
            tracing::debug!(file_id = %file.id, path = %path.display(), "Artifact removed")
        }
        Ok(false) => {
            tracing::debug!(file_id = %file.id, path = %path.display(), "Artifact already gone")
        }
        Err(e) => tracing::warn!(file_id = %file.id, error = %e, "Failed to remove artifact"),
    }
}

// ============================================================================
// UploadMusic
// ============================================================================

/// UploadMusic Handler
///
/// 校验 → 探测时长 → 存储；会话槽位中的旧文件会被淘汰
pub struct UploadMusicHandler {
    session_store: Arc<dyn SessionStorePort>,
    music_repo: Arc<dyn MusicFileRepositoryPort>,
    storage: Arc<dyn AudioStoragePort>,
    metadata: Arc<dyn AudioMetadataPort>,
    limits: UploadLimits,
}

impl UploadMusicHandler {
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        music_repo: Arc<dyn MusicFileRepositoryPort>,
        storage: Arc<dyn AudioStoragePort>,
        metadata: Arc<dyn AudioMetadataPort>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            session_store,
            music_repo,
            storage,
            metadata,
            limits,
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub async fn handle(&self, command: UploadMusic) -> Result<MusicFile, ApplicationError> {
        let policy = self.limits.policy_for(command.target);
        let file_size = command.data.len() as u64;
        let format = policy.validate(&command.original_name, file_size)?;

        let encoded = match command.target {
            UploadTarget::SessionInline => {
                let encoded = STANDARD.encode(&command.data);
                policy.check_encoded_size(encoded.len() as u64)?;
                Some(encoded)
            }
            _ => None,
        };

        let duration_secs = self.probe_duration(&command.data, format).await;
        let (id, filename) = MusicFile::allocate(format);

        let storage = match encoded {
            Some(base64) => StorageLocation::Inline { base64 },
            None => {
                let area = match command.target {
                    UploadTarget::Library => StorageArea::Music,
                    _ => StorageArea::TempUploads,
                };
                let path = self.storage.save(area, &filename, &command.data).await?;
                StorageLocation::Path { path }
            }
        };

        let file = MusicFile {
            id,
            title: command.original_name,
            filename,
            format,
            duration_secs,
            file_size,
            owner: Some(command.session_id.to_string()),
            uploaded_at: Utc::now(),
            storage,
        };

        if command.target.is_session() {
            match self.session_store.put_file(&command.session_id, file.clone()) {
                Ok(Some(evicted)) => {
                    tracing::info!(
                        session_id = %command.session_id,
                        evicted_id = %evicted.id,
                        "Previous session file evicted"
                    );
                    discard_artifact(self.storage.as_ref(), &evicted).await;
                }
                Ok(None) => {}
                Err(e) => {
                    discard_artifact(self.storage.as_ref(), &file).await;
                    return Err(e.into());
                }
            }
        } else if let Err(e) = self.music_repo.save(&file).await {
            discard_artifact(self.storage.as_ref(), &file).await;
            return Err(e.into());
        }

        tracing::info!(
            file_id = %file.id,
            title = %file.title,
            file_size = file.file_size,
            duration_secs = file.duration_secs,
            storage = file.storage.kind(),
            "Music uploaded"
        );

        Ok(file)
    }

    /// 探测时长，任何失败都降级为 0
    async fn probe_duration(&self, data: &[u8], format: AudioFormat) -> u32 {
        let metadata = self.metadata.clone();
        let bytes = data.to_vec();

        let probed =
            tokio::task::spawn_blocking(move || metadata.probe_duration_secs(&bytes, format)).await;

        match probed {
            Ok(Ok(secs)) => secs,
            Ok(Err(e)) => {
                tracing::warn!(
                    format = format.extension(),
                    error = %e,
                    "Duration probe failed, using 0"
                );
                0
            }
            Err(e) => {
                tracing::warn!(error = %e, "Duration probe task failed, using 0");
                0
            }
        }
    }
}

// ============================================================================
// DeleteSessionFile
// ============================================================================

/// DeleteSessionFile Handler
pub struct DeleteSessionFileHandler {
    session_store: Arc<dyn SessionStorePort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl DeleteSessionFileHandler {
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            session_store,
            storage,
        }
    }

    pub async fn handle(&self, command: DeleteSessionFile) -> Result<MusicFile, ApplicationError> {
        let file_id: MusicFileId = command
            .file_id
            .parse()
            .map_err(|_| ApplicationError::not_found("MusicFile", command.file_id.clone()))?;

        let removed = self
            .session_store
            .remove_file(&command.session_id, file_id)?
            .ok_or_else(|| ApplicationError::not_found("MusicFile", command.file_id.clone()))?;

        discard_artifact(self.storage.as_ref(), &removed).await;

        tracing::info!(
            session_id = %command.session_id,
            file_id = %removed.id,
            "Session file deleted"
        );

        Ok(removed)
    }
}

// ============================================================================
// DeleteLibraryFile
// ============================================================================

/// DeleteLibraryFile Handler
pub struct DeleteLibraryFileHandler {
    music_repo: Arc<dyn MusicFileRepositoryPort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl DeleteLibraryFileHandler {
    pub fn new(
        music_repo: Arc<dyn MusicFileRepositoryPort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            music_repo,
            storage,
        }
    }

    pub async fn handle(&self, command: DeleteLibraryFile) -> Result<(), ApplicationError> {
        let file_id: MusicFileId = command
            .file_id
            .parse()
            .map_err(|_| ApplicationError::not_found("MusicFile", command.file_id.clone()))?;

        let file = self
            .music_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("MusicFile", command.file_id.clone()))?;

        self.music_repo.delete(file_id).await?;
        discard_artifact(self.storage.as_ref(), &file).await;

        tracing::info!(file_id = %file_id, title = %file.title, "Library file deleted");

        Ok(())
    }
}

// ============================================================================
// CleanupSession
// ============================================================================

/// 清理结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSessionResponse {
    pub removed_files: u64,
    pub removed_positions: u64,
}

/// CleanupSession Handler
pub struct CleanupSessionHandler {
    session_store: Arc<dyn SessionStorePort>,
    position_repo: Arc<dyn PlaybackPositionRepositoryPort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl CleanupSessionHandler {
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        position_repo: Arc<dyn PlaybackPositionRepositoryPort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            session_store,
            position_repo,
            storage,
        }
    }

    pub async fn handle(
        &self,
        command: CleanupSession,
    ) -> Result<CleanupSessionResponse, ApplicationError> {
        let mut response = CleanupSessionResponse::default();

        if let Some(file) = self.session_store.clear(&command.session_id)? {
            discard_artifact(self.storage.as_ref(), &file).await;
            response.removed_files = 1;
        }

        response.removed_positions = self
            .position_repo
            .delete_by_owner(command.session_id.as_str())
            .await?;

        if command.expire {
            self.session_store.drop_session(&command.session_id)?;
        }

        tracing::info!(
            session_id = %command.session_id,
            removed_files = response.removed_files,
            removed_positions = response.removed_positions,
            expired = command.expire,
            "Session cleaned up"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{PlaybackPositionRecord, SessionStorePort};
    use crate::domain::SessionId;
    use crate::infrastructure::adapters::{FileAudioStorage, SymphoniaMetadataProbe};
    use crate::infrastructure::memory::InMemorySessionStore;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteMusicFileRepository,
        SqlitePlaybackPositionRepository,
    };
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        session_store: Arc<InMemorySessionStore>,
        music_repo: Arc<SqliteMusicFileRepository>,
        position_repo: Arc<SqlitePlaybackPositionRepository>,
        storage: Arc<FileAudioStorage>,
        upload: UploadMusicHandler,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let session_store = Arc::new(InMemorySessionStore::new());
        let music_repo = Arc::new(SqliteMusicFileRepository::new(pool.clone()));
        let position_repo = Arc::new(SqlitePlaybackPositionRepository::new(pool));
        let storage = Arc::new(FileAudioStorage::new(dir.path()).await.unwrap());

        let upload = UploadMusicHandler::new(
            session_store.clone(),
            music_repo.clone(),
            storage.clone(),
            Arc::new(SymphoniaMetadataProbe::new()),
            UploadLimits {
                max_file_bytes: 1024,
                max_encoded_bytes: 1400,
            },
        );

        Fixture {
            _dir: dir,
            session_store,
            music_repo,
            position_repo,
            storage,
            upload,
        }
    }

    fn upload_cmd(
        session_id: &SessionId,
        target: UploadTarget,
        name: &str,
        size: usize,
    ) -> UploadMusic {
        UploadMusic {
            session_id: session_id.clone(),
            target,
            original_name: name.to_string(),
            data: vec![7u8; size],
        }
    }

    #[tokio::test]
    async fn test_invalid_extension_has_no_side_effect() {
        let fx = fixture().await;
        let sid = SessionId::generate();

        let err = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::SessionFilesystem, "notes.txt", 10))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidFormat(_)));
        assert!(fx.session_store.current_file(&sid).unwrap().is_none());
        let temp_dir = fx.storage.base_dir().join(StorageArea::TempUploads.dir_name());
        assert!(!temp_dir.exists() || std::fs::read_dir(&temp_dir).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_too_large_is_rejected_before_storage() {
        let fx = fixture().await;
        let sid = SessionId::generate();

        let err = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::Library, "big.mp3", 1025))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::TooLarge(_)));
        assert!(fx.music_repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inline_upload_encodes_and_defaults_duration() {
        let fx = fixture().await;
        let sid = SessionId::generate();

        let file = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::SessionInline, "song.MP3", 12))
            .await
            .unwrap();

        // 伪造数据无法解析，时长降级为 0
        assert_eq!(file.duration_secs, 0);
        assert_eq!(file.file_size, 12);
        assert_eq!(file.title, "song.MP3");
        assert_eq!(file.filename, format!("{}.mp3", file.id));
        assert_eq!(
            file.storage,
            StorageLocation::Inline {
                base64: STANDARD.encode(vec![7u8; 12])
            }
        );
        assert_eq!(fx.session_store.current_file(&sid).unwrap(), Some(file));
    }

    #[tokio::test]
    async fn test_second_upload_replaces_first_and_removes_artifact() {
        let fx = fixture().await;
        let sid = SessionId::generate();

        let first = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::SessionFilesystem, "a.wav", 10))
            .await
            .unwrap();
        let first_path = first.storage.path().unwrap().clone();
        assert!(first_path.exists());

        let second = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::SessionFilesystem, "b.ogg", 10))
            .await
            .unwrap();

        assert!(!first_path.exists());
        assert!(second.storage.path().unwrap().exists());
        let current = fx.session_store.current_file(&sid).unwrap().unwrap();
        assert_eq!(current.id, second.id);
    }

    #[tokio::test]
    async fn test_library_upload_accumulates() {
        let fx = fixture().await;
        let sid = SessionId::generate();

        for name in ["a.mp3", "b.flac"] {
            fx.upload
                .handle(upload_cmd(&sid, UploadTarget::Library, name, 10))
                .await
                .unwrap();
        }

        assert_eq!(fx.music_repo.find_all().await.unwrap().len(), 2);
        assert!(fx.session_store.current_file(&sid).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_session_file() {
        let fx = fixture().await;
        let sid = SessionId::generate();
        let handler = DeleteSessionFileHandler::new(fx.session_store.clone(), fx.storage.clone());

        let file = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::SessionFilesystem, "a.wav", 10))
            .await
            .unwrap();

        // 其他会话看不到
        let other = SessionId::generate();
        let err = handler
            .handle(DeleteSessionFile {
                session_id: other,
                file_id: file.id.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        // 实体文件已丢失也能删除
        std::fs::remove_file(file.storage.path().unwrap()).unwrap();
        handler
            .handle(DeleteSessionFile {
                session_id: sid.clone(),
                file_id: file.id.to_string(),
            })
            .await
            .unwrap();
        assert!(fx.session_store.current_file(&sid).unwrap().is_none());

        // 再删一次是 NotFound
        let err = handler
            .handle(DeleteSessionFile {
                session_id: sid,
                file_id: file.id.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_library_file() {
        let fx = fixture().await;
        let sid = SessionId::generate();
        let handler = DeleteLibraryFileHandler::new(fx.music_repo.clone(), fx.storage.clone());

        let file = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::Library, "a.mp3", 10))
            .await
            .unwrap();

        handler
            .handle(DeleteLibraryFile {
                file_id: file.id.to_string(),
            })
            .await
            .unwrap();
        assert!(!file.storage.path().unwrap().exists());

        let err = handler
            .handle(DeleteLibraryFile {
                file_id: "not-a-uuid".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cleanup_session() {
        let fx = fixture().await;
        let sid = SessionId::generate();
        let handler = CleanupSessionHandler::new(
            fx.session_store.clone(),
            fx.position_repo.clone(),
            fx.storage.clone(),
        );

        let file = fx
            .upload
            .handle(upload_cmd(&sid, UploadTarget::SessionFilesystem, "a.wav", 10))
            .await
            .unwrap();
        fx.position_repo
            .upsert(&PlaybackPositionRecord {
                owner: sid.to_string(),
                file_id: file.id.to_string(),
                position: 12.5,
                last_played_at: Utc::now(),
            })
            .await
            .unwrap();

        let result = handler
            .handle(CleanupSession {
                session_id: sid.clone(),
                expire: false,
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            CleanupSessionResponse {
                removed_files: 1,
                removed_positions: 1
            }
        );
        assert!(!file.storage.path().unwrap().exists());
        assert!(fx
            .position_repo
            .find(sid.as_str(), &file.id.to_string())
            .await
            .unwrap()
            .is_none());
    }
}
