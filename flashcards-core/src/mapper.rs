use std::sync::Arc;

use crate::{
    Category, CategoryRequest, Flashcard, FlashcardRequest, IdSource, StudySession,
    StudySessionRequest,
};

/// Builds fresh entities from creation requests, assigning a new id to each.
#[derive(Clone)]
pub struct Mapper {
    ids: Arc<dyn IdSource>,
}

impl Mapper {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self { ids }
    }

    pub fn category_from(&self, request: CategoryRequest) -> Category {
        Category::new(self.ids.new_id(), request.name)
    }

    pub fn study_session_from(&self, request: StudySessionRequest) -> StudySession {
        StudySession::new(self.ids.new_id(), request.category_id, request.name)
    }

    pub fn flashcard_from(&self, request: FlashcardRequest) -> Flashcard {
        Flashcard::new(
            self.ids.new_id(),
            request.study_session_id,
            request.question,
            request.answer,
        )
    }
}
