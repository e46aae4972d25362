use std::sync::Arc;

use tracing::{debug, info};

use crate::repo::StudySessionRepository;
use crate::service::CategoryService;
use crate::validation::{require_non_blank, require_non_null};
use crate::{messages, CoreError, CoreResult, Mapper, StudySession, StudySessionRequest};

pub struct StudySessionService {
    repo: Arc<dyn StudySessionRepository>,
    categories: Arc<CategoryService>,
    mapper: Mapper,
}

impl StudySessionService {
    pub fn new(
        repo: Arc<dyn StudySessionRepository>,
        categories: Arc<CategoryService>,
        mapper: Mapper,
    ) -> Self {
        Self {
            repo,
            categories,
            mapper,
        }
    }

    pub async fn find_all(&self) -> CoreResult<Vec<StudySession>> {
        self.repo.find_all().await
    }

    pub async fn find_by_id(&self, id: &str) -> CoreResult<StudySession> {
        debug!(%id, "study session lookup");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(messages::study_session_not_found(id)))
    }

    pub async fn exists_by_id(&self, id: &str) -> CoreResult<bool> {
        self.repo.exists_by_id(id).await
    }

    pub async fn assert_exists_by_id(&self, id: &str) -> CoreResult<()> {
        if self.repo.exists_by_id(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound(messages::study_session_not_found(id)))
        }
    }

    /// Sessions of one category. An unknown category is reported, not an
    /// empty list.
    pub async fn find_all_by_category_id(&self, category_id: &str) -> CoreResult<Vec<StudySession>> {
        self.categories.assert_exists_by_id(category_id).await?;
        self.repo.find_all_by_category_id(category_id).await
    }

    pub async fn id_from_study_session_with_name(&self, name: &str) -> CoreResult<String> {
        self.repo
            .find_by_name(name)
            .await?
            .map(|s| s.id)
            .ok_or_else(|| CoreError::NotFound(messages::study_session_name_not_found(name)))
    }

    // Session names are not required to be unique.
    pub async fn create_study_session(
        &self,
        request: Option<StudySessionRequest>,
    ) -> CoreResult<StudySession> {
        let request = require_non_null(request)?;
        require_non_blank(&request.category_id, "Category ID")?;
        require_non_blank(&request.name, "Study session name")?;
        self.categories
            .assert_exists_by_id(&request.category_id)
            .await?;
        let session = self.mapper.study_session_from(request);
        let saved = self.repo.save(&session).await?;
        info!(id = %saved.id, category_id = %saved.category_id, "study session created");
        Ok(saved)
    }

    pub async fn save(&self, session: Option<StudySession>) -> CoreResult<StudySession> {
        let session = require_non_null(session)?;
        require_non_blank(&session.id, "Study session ID")?;
        require_non_blank(&session.category_id, "Category ID")?;
        require_non_blank(&session.name, "Study session name")?;
        self.categories
            .assert_exists_by_id(&session.category_id)
            .await?;
        let saved = self.repo.save(&session).await?;
        info!(id = %saved.id, "study session saved");
        Ok(saved)
    }

    /// Deletes the session and, through the store, its flashcards.
    pub async fn delete_by_id(&self, id: &str) -> CoreResult<()> {
        self.assert_exists_by_id(id).await?;
        self.repo.delete_by_id(id).await?;
        info!(%id, "study session deleted");
        Ok(())
    }
}
