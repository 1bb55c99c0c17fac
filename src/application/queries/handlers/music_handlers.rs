//! Music Query Handlers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStorageError, AudioStoragePort, MusicFileRepositoryPort, SessionStorePort, StorageArea,
};
use crate::application::queries::{
    GetFileData, GetFileUrl, GetLibraryFileUrl, ListLibrary, ListSessionFiles, OpenMediaFile,
};
use crate::domain::music::{MusicFile, MusicFileId, StorageLocation};
use crate::domain::SessionId;

// ============================================================================
// Response DTOs
// ============================================================================

/// 文件内容响应
#[derive(Debug, Clone)]
pub struct FileDataResponse {
    pub file: MusicFile,
    pub file_base64: String,
}

/// 文件 URL 响应
#[derive(Debug, Clone)]
pub struct FileUrlResponse {
    pub file: MusicFile,
    pub file_url: String,
}

/// 可流式输出的媒体文件
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub content_type: &'static str,
    pub file_size: u64,
}

fn parse_file_id(raw: &str) -> Result<MusicFileId, ApplicationError> {
    raw.parse()
        .map_err(|_| ApplicationError::not_found("MusicFile", raw.to_string()))
}

/// 查找本会话槽位中的文件
fn find_session_file(
    store: &dyn SessionStorePort,
    session_id: &SessionId,
    raw_id: &str,
) -> Result<MusicFile, ApplicationError> {
    let file_id = parse_file_id(raw_id)?;
    store
        .find_file(session_id, file_id)?
        .ok_or_else(|| ApplicationError::not_found("MusicFile", raw_id.to_string()))
}

/// 文件系统实体的访问 URL，实体缺失视为未找到
async fn artifact_url(
    storage: &dyn AudioStoragePort,
    file: &MusicFile,
    area: StorageArea,
) -> Result<String, ApplicationError> {
    let path = file
        .storage
        .path()
        .ok_or_else(|| ApplicationError::not_found("MusicFile", file.id.to_string()))?;

    if !storage.exists(path).await {
        tracing::warn!(file_id = %file.id, path = %path.display(), "Artifact missing on disk");
        return Err(ApplicationError::not_found("MusicFile", file.id.to_string()));
    }

    Ok(format!("{}/{}", area.url_prefix(), file.filename))
}

// ============================================================================
// GetFileData
// ============================================================================

/// GetFileData Handler - 获取会话文件的 Base64 内容
pub struct GetFileDataHandler {
    session_store: Arc<dyn SessionStorePort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl GetFileDataHandler {
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            session_store,
            storage,
        }
    }

    pub async fn handle(&self, query: GetFileData) -> Result<FileDataResponse, ApplicationError> {
        let file =
            find_session_file(self.session_store.as_ref(), &query.session_id, &query.file_id)?;

        let file_base64 = match &file.storage {
            StorageLocation::Inline { base64 } => base64.clone(),
            StorageLocation::Path { path } => match self.storage.read(path).await {
                Ok(bytes) => STANDARD.encode(bytes),
                Err(AudioStorageError::FileNotFound(_)) => {
                    return Err(ApplicationError::not_found("MusicFile", query.file_id));
                }
                Err(e) => return Err(e.into()),
            },
        };

        Ok(FileDataResponse { file, file_base64 })
    }
}

// ============================================================================
// GetFileUrl
// ============================================================================

/// GetFileUrl Handler - 获取会话文件的访问 URL（仅文件系统存储）
pub struct GetFileUrlHandler {
    session_store: Arc<dyn SessionStorePort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl GetFileUrlHandler {
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            session_store,
            storage,
        }
    }

    pub async fn handle(&self, query: GetFileUrl) -> Result<FileUrlResponse, ApplicationError> {
        let file =
            find_session_file(self.session_store.as_ref(), &query.session_id, &query.file_id)?;
        let file_url = artifact_url(self.storage.as_ref(), &file, StorageArea::TempUploads).await?;
        Ok(FileUrlResponse { file, file_url })
    }
}

// ============================================================================
// ListSessionFiles
// ============================================================================

/// ListSessionFiles Handler
pub struct ListSessionFilesHandler {
    session_store: Arc<dyn SessionStorePort>,
}

impl ListSessionFilesHandler {
    pub fn new(session_store: Arc<dyn SessionStorePort>) -> Self {
        Self { session_store }
    }

    pub async fn handle(
        &self,
        query: ListSessionFiles,
    ) -> Result<Vec<MusicFile>, ApplicationError> {
        Ok(self
            .session_store
            .current_file(&query.session_id)?
            .into_iter()
            .collect())
    }
}

// ============================================================================
// ListLibrary
// ============================================================================

/// ListLibrary Handler - 按上传时间倒序
pub struct ListLibraryHandler {
    music_repo: Arc<dyn MusicFileRepositoryPort>,
}

impl ListLibraryHandler {
    pub fn new(music_repo: Arc<dyn MusicFileRepositoryPort>) -> Self {
        Self { music_repo }
    }

    pub async fn handle(&self, _query: ListLibrary) -> Result<Vec<MusicFile>, ApplicationError> {
        Ok(self.music_repo.find_all().await?)
    }
}

// ============================================================================
// GetLibraryFileUrl
// ============================================================================

/// GetLibraryFileUrl Handler
pub struct GetLibraryFileUrlHandler {
    music_repo: Arc<dyn MusicFileRepositoryPort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl GetLibraryFileUrlHandler {
    pub fn new(
        music_repo: Arc<dyn MusicFileRepositoryPort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            music_repo,
            storage,
        }
    }

    pub async fn handle(
        &self,
        query: GetLibraryFileUrl,
    ) -> Result<FileUrlResponse, ApplicationError> {
        let file_id = parse_file_id(&query.file_id)?;
        let file = self
            .music_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("MusicFile", query.file_id.clone()))?;

        let file_url = artifact_url(self.storage.as_ref(), &file, StorageArea::Music).await?;
        Ok(FileUrlResponse { file, file_url })
    }
}

// ============================================================================
// OpenMediaFile
// ============================================================================

/// OpenMediaFile Handler
///
/// 临时上传只对所属会话可见；音乐库文件须在库中登记
pub struct OpenMediaFileHandler {
    session_store: Arc<dyn SessionStorePort>,
    music_repo: Arc<dyn MusicFileRepositoryPort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl OpenMediaFileHandler {
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        music_repo: Arc<dyn MusicFileRepositoryPort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            session_store,
            music_repo,
            storage,
        }
    }

    pub async fn handle(&self, query: OpenMediaFile) -> Result<MediaFile, ApplicationError> {
        let file = match query.area {
            StorageArea::TempUploads => self
                .session_store
                .current_file(&query.session_id)?
                .filter(|f| f.filename == query.filename),
            StorageArea::Music => self.music_repo.find_by_filename(&query.filename).await?,
        }
        .ok_or_else(|| ApplicationError::not_found("MusicFile", query.filename.clone()))?;

        let path = file
            .storage
            .path()
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("MusicFile", query.filename.clone()))?;

        if !self.storage.exists(&path).await {
            return Err(ApplicationError::not_found("MusicFile", query.filename));
        }

        Ok(MediaFile {
            path,
            content_type: file.format.content_type(),
            file_size: file.file_size,
        })
    }
}
