//! Voice Command Handlers

use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::{
    CreateVoiceCommandMapping, DeleteVoiceCommandMapping, RecognizeVoiceCommand,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    RecognizeRequest, TranscriptionQueuePort, VoiceCommandRepositoryPort,
};
use crate::domain::voice::{match_command, VoiceAction, VoiceCommandMapping, VoiceCommandMappingId};

// ============================================================================
// RecognizeVoiceCommand
// ============================================================================

/// 语音识别参数
#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    /// 识别语言
    pub language: String,
    /// 单句时长上限
    pub phrase_time_limit: Duration,
    /// 等待识别结果的上限
    pub result_timeout: Duration,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "ja-JP".to_string(),
            phrase_time_limit: Duration::from_secs(3),
            result_timeout: Duration::from_secs(15),
        }
    }
}

/// RecognizeVoiceCommand Handler
///
/// 单次调用：提交转写 → 等待 ticket → 关键词匹配。
/// 指令映射表不参与匹配。
pub struct RecognizeVoiceCommandHandler {
    queue: Arc<dyn TranscriptionQueuePort>,
    settings: RecognitionSettings,
}

impl RecognizeVoiceCommandHandler {
    pub fn new(queue: Arc<dyn TranscriptionQueuePort>, settings: RecognitionSettings) -> Self {
        Self { queue, settings }
    }

    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    pub async fn handle(
        &self,
        command: RecognizeVoiceCommand,
    ) -> Result<VoiceAction, ApplicationError> {
        if command.sample.is_empty() {
            return Err(ApplicationError::RecognitionFailed);
        }

        let request = RecognizeRequest {
            sample: command.sample,
            language: self.settings.language.clone(),
            phrase_time_limit: self.settings.phrase_time_limit,
        };

        let ticket = self.queue.submit(request)?;
        let text = ticket.wait(self.settings.result_timeout).await?;

        tracing::info!(text = %text, "Voice recognized");

        match match_command(&text) {
            Some(action) => {
                tracing::info!(action = action.as_str(), "Voice command matched");
                Ok(action)
            }
            None => Err(ApplicationError::UnsupportedCommand(text)),
        }
    }
}

// ============================================================================
// CreateVoiceCommandMapping
// ============================================================================

/// CreateVoiceCommandMapping Handler
pub struct CreateVoiceCommandMappingHandler {
    repo: Arc<dyn VoiceCommandRepositoryPort>,
}

impl CreateVoiceCommandMappingHandler {
    pub fn new(repo: Arc<dyn VoiceCommandRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(
        &self,
        command: CreateVoiceCommandMapping,
    ) -> Result<VoiceCommandMapping, ApplicationError> {
        let mapping = VoiceCommandMapping::new(
            command.command,
            command.action,
            command.owner,
            command.is_active,
        )?;

        self.repo.insert(&mapping).await?;

        tracing::info!(
            mapping_id = %mapping.id,
            mapping = %mapping,
            owner = %mapping.owner,
            "Voice command mapping created"
        );

        Ok(mapping)
    }
}

// ============================================================================
// DeleteVoiceCommandMapping
// ============================================================================

/// DeleteVoiceCommandMapping Handler
pub struct DeleteVoiceCommandMappingHandler {
    repo: Arc<dyn VoiceCommandRepositoryPort>,
}

impl DeleteVoiceCommandMappingHandler {
    pub fn new(repo: Arc<dyn VoiceCommandRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, command: DeleteVoiceCommandMapping) -> Result<(), ApplicationError> {
        let id = uuid::Uuid::parse_str(&command.id)
            .map(VoiceCommandMappingId::from_uuid)
            .map_err(|_| ApplicationError::not_found("VoiceCommandMapping", command.id.clone()))?;

        if !self.repo.delete(id).await? {
            return Err(ApplicationError::not_found("VoiceCommandMapping", command.id));
        }

        tracing::info!(mapping_id = %id, "Voice command mapping deleted");
        Ok(())
    }
}
