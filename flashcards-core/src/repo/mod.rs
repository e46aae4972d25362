use crate::{Category, CoreError, Flashcard, StudySession};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;

// Stores enforce the same constraints the services pre-check: a unique
// category name, existing parents on save, and cascading deletes. A write that
// violates one returns the matching `Conflict`/`NotFound` error.

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, CoreError>;
    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError>;
    /// Insert-or-replace by id.
    async fn save(&self, category: &Category) -> Result<Category, CoreError>;
    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError>;
    async fn find_all(&self) -> Result<Vec<Category>, CoreError>;

    async fn find_all_by_order_by_name_asc(&self) -> Result<Vec<Category>, CoreError>;
    async fn exists_by_name(&self, name: &str) -> Result<bool, CoreError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, CoreError>;
}

#[async_trait]
pub trait StudySessionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<StudySession>, CoreError>;
    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError>;
    async fn save(&self, session: &StudySession) -> Result<StudySession, CoreError>;
    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError>;
    async fn find_all(&self) -> Result<Vec<StudySession>, CoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<StudySession>, CoreError>;
    async fn find_all_by_category_id(&self, category_id: &str)
        -> Result<Vec<StudySession>, CoreError>;
}

#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Flashcard>, CoreError>;
    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError>;
    async fn save(&self, flashcard: &Flashcard) -> Result<Flashcard, CoreError>;
    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError>;
    async fn find_all(&self) -> Result<Vec<Flashcard>, CoreError>;

    async fn find_all_by_study_session_id(
        &self,
        study_session_id: &str,
    ) -> Result<Vec<Flashcard>, CoreError>;
}

/// One handle per entity kind, usually all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub sessions: Arc<dyn StudySessionRepository>,
    pub flashcards: Arc<dyn FlashcardRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CategoryRepository + StudySessionRepository + FlashcardRepository + 'static,
    {
        Self {
            categories: store.clone(),
            sessions: store.clone(),
            flashcards: store,
        }
    }
}
