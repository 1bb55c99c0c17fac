//! Playback Position Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::SavePosition;
use crate::application::error::ApplicationError;
use crate::application::ports::{PlaybackPositionRecord, PlaybackPositionRepositoryPort};

/// SavePosition Handler
///
/// get-or-create：不存在则创建，存在则覆盖
pub struct SavePositionHandler {
    position_repo: Arc<dyn PlaybackPositionRepositoryPort>,
}

impl SavePositionHandler {
    pub fn new(position_repo: Arc<dyn PlaybackPositionRepositoryPort>) -> Self {
        Self { position_repo }
    }

    pub async fn handle(
        &self,
        command: SavePosition,
    ) -> Result<PlaybackPositionRecord, ApplicationError> {
        let file_id = command.file_id.trim();
        if file_id.is_empty() {
            return Err(ApplicationError::validation("file_id is required"));
        }

        let record = PlaybackPositionRecord {
            owner: command.owner.to_string(),
            file_id: file_id.to_string(),
            position: command.position,
            last_played_at: Utc::now(),
        };

        self.position_repo.upsert(&record).await?;

        tracing::debug!(
            owner = %record.owner,
            file_id = %record.file_id,
            position = record.position,
            "Playback position saved"
        );

        Ok(record)
    }
}
