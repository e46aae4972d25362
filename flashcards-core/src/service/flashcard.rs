use std::sync::Arc;

use tracing::{debug, info};

use crate::repo::FlashcardRepository;
use crate::service::StudySessionService;
use crate::validation::{require_non_blank, require_non_null};
use crate::{messages, CoreError, CoreResult, Flashcard, FlashcardRequest, Mapper};

pub struct FlashcardService {
    repo: Arc<dyn FlashcardRepository>,
    sessions: Arc<StudySessionService>,
    mapper: Mapper,
}

impl FlashcardService {
    pub fn new(
        repo: Arc<dyn FlashcardRepository>,
        sessions: Arc<StudySessionService>,
        mapper: Mapper,
    ) -> Self {
        Self {
            repo,
            sessions,
            mapper,
        }
    }

    pub async fn find_all(&self) -> CoreResult<Vec<Flashcard>> {
        self.repo.find_all().await
    }

    pub async fn find_by_id(&self, id: &str) -> CoreResult<Flashcard> {
        debug!(%id, "flashcard lookup");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(messages::flashcard_not_found(id)))
    }

    pub async fn exists_by_id(&self, id: &str) -> CoreResult<bool> {
        self.repo.exists_by_id(id).await
    }

    pub async fn find_all_by_study_session_id(
        &self,
        study_session_id: &str,
    ) -> CoreResult<Vec<Flashcard>> {
        self.sessions.assert_exists_by_id(study_session_id).await?;
        self.repo
            .find_all_by_study_session_id(study_session_id)
            .await
    }

    pub async fn create_flashcard(&self, request: Option<FlashcardRequest>) -> CoreResult<Flashcard> {
        let request = require_non_null(request)?;
        require_non_blank(&request.study_session_id, "Study session ID")?;
        require_non_blank(&request.question, "Question")?;
        require_non_blank(&request.answer, "Answer")?;
        self.sessions
            .assert_exists_by_id(&request.study_session_id)
            .await?;
        let flashcard = self.mapper.flashcard_from(request);
        let saved = self.repo.save(&flashcard).await?;
        info!(id = %saved.id, study_session_id = %saved.study_session_id, "flashcard created");
        Ok(saved)
    }

    pub async fn save(&self, flashcard: Option<Flashcard>) -> CoreResult<Flashcard> {
        let flashcard = require_non_null(flashcard)?;
        require_non_blank(&flashcard.id, "Flashcard ID")?;
        require_non_blank(&flashcard.study_session_id, "Study session ID")?;
        require_non_blank(&flashcard.question, "Question")?;
        require_non_blank(&flashcard.answer, "Answer")?;
        self.sessions
            .assert_exists_by_id(&flashcard.study_session_id)
            .await?;
        let saved = self.repo.save(&flashcard).await?;
        info!(id = %saved.id, "flashcard saved");
        Ok(saved)
    }

    pub async fn delete_by_id(&self, id: &str) -> CoreResult<()> {
        if !self.repo.exists_by_id(id).await? {
            return Err(CoreError::NotFound(messages::flashcard_not_found(id)));
        }
        self.repo.delete_by_id(id).await?;
        info!(%id, "flashcard deleted");
        Ok(())
    }
}
