use crate::repo::{CategoryRepository, FlashcardRepository, StudySessionRepository};
use crate::{messages, Category, CoreError, Flashcard, StudySession};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Entity tables plus the constraint checks every in-process store applies.
///
/// Each mutating method validates and applies its change in one step, so a
/// caller holding the write lock sees the constraints hold atomically.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    pub categories: BTreeMap<String, Category>,
    pub sessions: BTreeMap<String, StudySession>,
    pub flashcards: BTreeMap<String, Flashcard>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories_by_name(&self) -> Vec<Category> {
        let mut v: Vec<Category> = self.categories.values().cloned().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    pub fn category_by_name(&self, name: &str) -> Option<Category> {
        self.categories.values().find(|c| c.name == name).cloned()
    }

    pub fn session_by_name(&self, name: &str) -> Option<StudySession> {
        self.sessions.values().find(|s| s.name == name).cloned()
    }

    pub fn sessions_in_category(&self, category_id: &str) -> Vec<StudySession> {
        self.sessions
            .values()
            .filter(|s| s.category_id == category_id)
            .cloned()
            .collect()
    }

    pub fn flashcards_in_session(&self, study_session_id: &str) -> Vec<Flashcard> {
        self.flashcards
            .values()
            .filter(|f| f.study_session_id == study_session_id)
            .cloned()
            .collect()
    }

    pub fn put_category(&mut self, category: &Category) -> Result<Category, CoreError> {
        let taken = self
            .categories
            .values()
            .any(|c| c.name == category.name && c.id != category.id);
        if taken {
            return Err(CoreError::Conflict(messages::category_name_exists(
                &category.name,
            )));
        }
        self.categories
            .insert(category.id.clone(), category.clone());
        Ok(category.clone())
    }

    pub fn put_session(&mut self, session: &StudySession) -> Result<StudySession, CoreError> {
        if !self.categories.contains_key(&session.category_id) {
            return Err(CoreError::NotFound(messages::category_not_found(
                &session.category_id,
            )));
        }
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(session.clone())
    }

    pub fn put_flashcard(&mut self, flashcard: &Flashcard) -> Result<Flashcard, CoreError> {
        if !self.sessions.contains_key(&flashcard.study_session_id) {
            return Err(CoreError::NotFound(messages::study_session_not_found(
                &flashcard.study_session_id,
            )));
        }
        self.flashcards
            .insert(flashcard.id.clone(), flashcard.clone());
        Ok(flashcard.clone())
    }

    /// Removes the category together with its sessions and their flashcards.
    pub fn remove_category(&mut self, id: &str) {
        if self.categories.remove(id).is_none() {
            return;
        }
        let session_ids: Vec<String> = self
            .sessions
            .values()
            .filter(|s| s.category_id == id)
            .map(|s| s.id.clone())
            .collect();
        for sid in session_ids {
            self.remove_session(&sid);
        }
    }

    /// Removes the session together with its flashcards.
    pub fn remove_session(&mut self, id: &str) {
        if self.sessions.remove(id).is_none() {
            return;
        }
        self.flashcards.retain(|_, f| f.study_session_id != id);
    }

    pub fn remove_flashcard(&mut self, id: &str) {
        self.flashcards.remove(id);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, CoreError> {
        Ok(self.tables.read().categories.get(id).cloned())
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.tables.read().categories.contains_key(id))
    }

    async fn save(&self, category: &Category) -> Result<Category, CoreError> {
        self.tables.write().put_category(category)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        self.tables.write().remove_category(id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.tables.read().categories.values().cloned().collect())
    }

    async fn find_all_by_order_by_name_asc(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.tables.read().categories_by_name())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.tables.read().category_by_name(name).is_some())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, CoreError> {
        Ok(self.tables.read().category_by_name(name))
    }
}

#[async_trait]
impl StudySessionRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<StudySession>, CoreError> {
        Ok(self.tables.read().sessions.get(id).cloned())
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.tables.read().sessions.contains_key(id))
    }

    async fn save(&self, session: &StudySession) -> Result<StudySession, CoreError> {
        self.tables.write().put_session(session)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        self.tables.write().remove_session(id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<StudySession>, CoreError> {
        Ok(self.tables.read().sessions.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<StudySession>, CoreError> {
        Ok(self.tables.read().session_by_name(name))
    }

    async fn find_all_by_category_id(
        &self,
        category_id: &str,
    ) -> Result<Vec<StudySession>, CoreError> {
        Ok(self.tables.read().sessions_in_category(category_id))
    }
}

#[async_trait]
impl FlashcardRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Flashcard>, CoreError> {
        Ok(self.tables.read().flashcards.get(id).cloned())
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.tables.read().flashcards.contains_key(id))
    }

    async fn save(&self, flashcard: &Flashcard) -> Result<Flashcard, CoreError> {
        self.tables.write().put_flashcard(flashcard)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        self.tables.write().remove_flashcard(id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Flashcard>, CoreError> {
        Ok(self.tables.read().flashcards.values().cloned().collect())
    }

    async fn find_all_by_study_session_id(
        &self,
        study_session_id: &str,
    ) -> Result<Vec<Flashcard>, CoreError> {
        Ok(self.tables.read().flashcards_in_session(study_session_id))
    }
}
