//! SQLite Music File Repository

use async_trait::async_trait;
use sqlx::FromRow;
use std::path::PathBuf;

use super::{decode_timestamp, encode_timestamp, map_sqlx_error, DbPool};
use crate::application::ports::{MusicFileRepositoryPort, RepositoryError};
use crate::domain::music::{AudioFormat, MusicFile, MusicFileId, StorageLocation};

/// SQLite Music File Repository
///
/// 音乐库文件只保存在文件系统中，表内记录路径
pub struct SqliteMusicFileRepository {
    pool: DbPool,
}

impl SqliteMusicFileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, title, filename, format, duration_secs, file_size, owner, file_path, uploaded_at";

#[derive(FromRow)]
struct MusicFileRow {
    id: String,
    title: String,
    filename: String,
    format: String,
    duration_secs: i64,
    file_size: i64,
    owner: Option<String>,
    file_path: String,
    uploaded_at: String,
}

impl TryFrom<MusicFileRow> for MusicFile {
    type Error = RepositoryError;

    fn try_from(row: MusicFileRow) -> Result<Self, Self::Error> {
        let format = AudioFormat::from_extension(&row.format).ok_or_else(|| {
            RepositoryError::SerializationError(format!("Unknown audio format: {}", row.format))
        })?;

        Ok(MusicFile {
            id: row
                .id
                .parse::<MusicFileId>()
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            filename: row.filename,
            format,
            duration_secs: row.duration_secs.max(0) as u32,
            file_size: row.file_size.max(0) as u64,
            owner: row.owner,
            uploaded_at: decode_timestamp(&row.uploaded_at)?,
            storage: StorageLocation::Path {
                path: PathBuf::from(row.file_path),
            },
        })
    }
}

#[async_trait]
impl MusicFileRepositoryPort for SqliteMusicFileRepository {
    async fn save(&self, file: &MusicFile) -> Result<(), RepositoryError> {
        let path = file.storage.path().ok_or_else(|| {
            RepositoryError::SerializationError(format!(
                "Library file {} has no filesystem path",
                file.id
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO music_files
                (id, title, filename, format, duration_secs, file_size, owner, file_path,
                 uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(file.id.to_string())
        .bind(&file.title)
        .bind(&file.filename)
        .bind(file.format.extension())
        .bind(file.duration_secs as i64)
        .bind(file.file_size as i64)
        .bind(&file.owner)
        .bind(path.to_string_lossy().to_string())
        .bind(encode_timestamp(&file.uploaded_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: MusicFileId) -> Result<Option<MusicFile>, RepositoryError> {
        let row: Option<MusicFileRow> =
            sqlx::query_as(&format!("SELECT {} FROM music_files WHERE id = ?", COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(MusicFile::try_from).transpose()
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<MusicFile>, RepositoryError> {
        let row: Option<MusicFileRow> =
            sqlx::query_as(&format!("SELECT {} FROM music_files WHERE filename = ?", COLUMNS))
                .bind(filename)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(MusicFile::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<MusicFile>, RepositoryError> {
        let rows: Vec<MusicFileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM music_files ORDER BY uploaded_at DESC, rowid DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(MusicFile::try_from).collect()
    }

    async fn delete(&self, id: MusicFileId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM music_files WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::{Duration, Utc};

    async fn repo() -> SqliteMusicFileRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMusicFileRepository::new(pool)
    }

    fn library_file(title: &str, age_secs: i64) -> MusicFile {
        let (id, filename) = MusicFile::allocate(AudioFormat::Flac);
        MusicFile {
            id,
            title: title.to_string(),
            storage: StorageLocation::Path {
                path: PathBuf::from(format!("/srv/media/music/{}", filename)),
            },
            filename,
            format: AudioFormat::Flac,
            duration_secs: 215,
            file_size: 2048,
            owner: None,
            uploaded_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = repo().await;
        let file = library_file("song.flac", 0);
        repo.save(&file).await.unwrap();

        let found = repo.find_by_id(file.id).await.unwrap().unwrap();
        assert_eq!(found.title, "song.flac");
        assert_eq!(found.duration_secs, 215);
        assert_eq!(found.storage, file.storage);

        let by_name = repo.find_by_filename(&file.filename).await.unwrap().unwrap();
        assert_eq!(by_name.id, file.id);
        assert!(repo.find_by_filename("missing.flac").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let repo = repo().await;
        let oldest = library_file("oldest", 300);
        let newest = library_file("newest", 0);
        let middle = library_file("middle", 60);

        for file in [&oldest, &newest, &middle] {
            repo.save(file).await.unwrap();
        }

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_inline_file_is_rejected() {
        let repo = repo().await;
        let mut file = library_file("inline", 0);
        file.storage = StorageLocation::Inline {
            base64: "AAAA".to_string(),
        };
        assert!(repo.save(&file).await.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let file = library_file("gone", 0);
        repo.save(&file).await.unwrap();

        assert!(repo.delete(file.id).await.unwrap());
        assert!(!repo.delete(file.id).await.unwrap());
        assert!(repo.find_by_id(file.id).await.unwrap().is_none());
    }
}
