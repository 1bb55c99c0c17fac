//! SQLite Playback Position Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::{decode_timestamp, encode_timestamp, map_sqlx_error, DbPool};
use crate::application::ports::{
    PlaybackPositionRecord, PlaybackPositionRepositoryPort, RepositoryError,
};

/// SQLite Playback Position Repository
pub struct SqlitePlaybackPositionRepository {
    pool: DbPool,
}

impl SqlitePlaybackPositionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PositionRow {
    owner: String,
    file_id: String,
    position: f64,
    last_played_at: String,
}

impl TryFrom<PositionRow> for PlaybackPositionRecord {
    type Error = RepositoryError;

    fn try_from(row: PositionRow) -> Result<Self, Self::Error> {
        Ok(PlaybackPositionRecord {
            owner: row.owner,
            file_id: row.file_id,
            position: row.position,
            last_played_at: decode_timestamp(&row.last_played_at)?,
        })
    }
}

#[async_trait]
impl PlaybackPositionRepositoryPort for SqlitePlaybackPositionRepository {
    async fn upsert(&self, record: &PlaybackPositionRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO playback_positions (owner, file_id, position, last_played_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(owner, file_id) DO UPDATE SET
                position = excluded.position,
                last_played_at = excluded.last_played_at
            "#,
        )
        .bind(&record.owner)
        .bind(&record.file_id)
        .bind(record.position)
        .bind(encode_timestamp(&record.last_played_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find(
        &self,
        owner: &str,
        file_id: &str,
    ) -> Result<Option<PlaybackPositionRecord>, RepositoryError> {
        let row: Option<PositionRow> = sqlx::query_as(
            r#"
            SELECT owner, file_id, position, last_played_at
            FROM playback_positions
            WHERE owner = ? AND file_id = ?
            "#,
        )
        .bind(owner)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PlaybackPositionRecord::try_from).transpose()
    }

    async fn delete_by_owner(&self, owner: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM playback_positions WHERE owner = ?")
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
