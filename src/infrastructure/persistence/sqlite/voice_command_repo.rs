//! SQLite Voice Command Repository

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::{decode_timestamp, encode_timestamp, map_sqlx_error, DbPool};
use crate::application::ports::{RepositoryError, VoiceCommandRepositoryPort};
use crate::domain::voice::{VoiceCommandMapping, VoiceCommandMappingId};

/// SQLite Voice Command Repository
pub struct SqliteVoiceCommandRepository {
    pool: DbPool,
}

impl SqliteVoiceCommandRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct VoiceCommandRow {
    id: String,
    command: String,
    action: String,
    owner: String,
    is_active: bool,
    created_at: String,
}

impl TryFrom<VoiceCommandRow> for VoiceCommandMapping {
    type Error = RepositoryError;

    fn try_from(row: VoiceCommandRow) -> Result<Self, Self::Error> {
        Ok(VoiceCommandMapping {
            id: Uuid::parse_str(&row.id)
                .map(VoiceCommandMappingId::from_uuid)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            command: row.command,
            action: row.action,
            owner: row.owner,
            is_active: row.is_active,
            created_at: decode_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl VoiceCommandRepositoryPort for SqliteVoiceCommandRepository {
    async fn insert(&self, mapping: &VoiceCommandMapping) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO voice_commands (id, command, action, owner, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(mapping.id.to_string())
        .bind(&mapping.command)
        .bind(&mapping.action)
        .bind(&mapping.owner)
        .bind(mapping.is_active)
        .bind(encode_timestamp(&mapping.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            RepositoryError::Duplicate(_) => RepositoryError::Duplicate(format!(
                "Voice command '{}' already exists for owner '{}'",
                mapping.command, mapping.owner
            )),
            other => other,
        })?;

        Ok(())
    }

    async fn find_all(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<VoiceCommandMapping>, RepositoryError> {
        let rows: Vec<VoiceCommandRow> = match owner {
            Some(owner) => sqlx::query_as(
                r#"
                SELECT id, command, action, owner, is_active, created_at
                FROM voice_commands
                WHERE owner = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(owner)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as(
                r#"
                SELECT id, command, action, owner, is_active, created_at
                FROM voice_commands
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(VoiceCommandMapping::try_from).collect()
    }

    async fn delete(&self, id: VoiceCommandMappingId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM voice_commands WHERE id = ?")
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

    async fn repo() -> SqliteVoiceCommandRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteVoiceCommandRepository::new(pool)
    }

    #[tokio::test]
    async fn test_unique_per_owner() {
        let repo = repo().await;
        let first = VoiceCommandMapping::new("つぎ", "next", "alice", true).unwrap();
        repo.insert(&first).await.unwrap();

        let same_owner = VoiceCommandMapping::new("つぎ", "skip", "alice", false).unwrap();
        let err = repo.insert(&same_owner).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));

        let other_owner = VoiceCommandMapping::new("つぎ", "next", "bob", true).unwrap();
        repo.insert(&other_owner).await.unwrap();

        let stored = repo.find_all(Some("alice")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].action, "next");
        assert!(stored[0].is_active);
    }
}
