use std::sync::Arc;

use crate::repo::Repositories;
use crate::{IdSource, Mapper};

mod category;
mod flashcard;
mod study_session;

pub use category::CategoryService;
pub use flashcard::FlashcardService;
pub use study_session::StudySessionService;

/// The three services wired over one set of repositories. Cheap to clone and
/// safe to share between request workers.
#[derive(Clone)]
pub struct Services {
    pub categories: Arc<CategoryService>,
    pub sessions: Arc<StudySessionService>,
    pub flashcards: Arc<FlashcardService>,
}

impl Services {
    pub fn new(repos: Repositories, ids: Arc<dyn IdSource>) -> Self {
        let mapper = Mapper::new(ids);
        let categories = Arc::new(CategoryService::new(repos.categories, mapper.clone()));
        let sessions = Arc::new(StudySessionService::new(
            repos.sessions,
            categories.clone(),
            mapper.clone(),
        ));
        let flashcards = Arc::new(FlashcardService::new(
            repos.flashcards,
            sessions.clone(),
            mapper,
        ));
        Self {
            categories,
            sessions,
            flashcards,
        }
    }
}
