//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::VoiceCommandRepositoryPort;
use crate::application::queries::ListVoiceCommandMappings;
use crate::domain::voice::VoiceCommandMapping;

/// ListVoiceCommandMappings Handler
pub struct ListVoiceCommandMappingsHandler {
    repo: Arc<dyn VoiceCommandRepositoryPort>,
}

impl ListVoiceCommandMappingsHandler {
    pub fn new(repo: Arc<dyn VoiceCommandRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(
        &self,
        query: ListVoiceCommandMappings,
    ) -> Result<Vec<VoiceCommandMapping>, ApplicationError> {
        let owner = query.owner.as_deref().map(str::trim).filter(|o| !o.is_empty());
        Ok(self.repo.find_all(owner).await?)
    }
}
