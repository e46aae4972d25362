use flashcards_core::repo::memory::MemoryStore;
use flashcards_core::{
    Category, CategoryRequest, CoreError, Flashcard, FlashcardRequest,
    IdSource, Repositories, Services, StudySession, StudySessionRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct SeqIds(AtomicUsize);

impl IdSource for SeqIds {
    fn new_id(&self) -> String {
        format!("id-{}", self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn services() -> Services {
    let store = Arc::new(MemoryStore::new());
    Services::new(Repositories::from_store(store), Arc::new(SeqIds::default()))
}

async fn seeded() -> Services {
    let svc = services();
    svc.categories
        .save(Some(Category::new("c1", "Science")))
        .await
        .unwrap();
    svc.sessions
        .save(Some(StudySession::new("s1", "c1", "Thermo")))
        .await
        .unwrap();
    svc
}

fn not_found(msg: &str) -> CoreError {
    CoreError::NotFound(msg.to_string())
}

#[tokio::test]
async fn created_category_is_found_by_id_and_name() {
    let svc = services();
    let cat = svc
        .categories
        .create_category(Some(CategoryRequest::new("Music")))
        .await
        .unwrap();
    assert_eq!(cat, Category::new("id-1", "Music"));
    assert_eq!(svc.categories.find_by_id("id-1").await.unwrap(), cat);
    assert_eq!(svc.categories.find_by_name("Music").await.unwrap(), cat);
    assert_eq!(
        svc.categories.id_from_category_with_name("Music").await.unwrap(),
        "id-1"
    );
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let svc = services();
    let req = CategoryRequest::new("Music");
    svc.categories.create_category(Some(req.clone())).await.unwrap();
    let err = svc.categories.create_category(Some(req)).await.unwrap_err();
    assert_eq!(
        err,
        CoreError::Conflict("Category with name 'Music' already exists".into())
    );
    assert_eq!(svc.categories.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn category_save_conflicts_only_with_other_ids() {
    let svc = seeded().await;
    // Same id keeps its own name.
    let same = svc
        .categories
        .save(Some(Category::new("c1", "Science")))
        .await
        .unwrap();
    assert_eq!(same.name, "Science");

    let err = svc
        .categories
        .save(Some(Category::new("c2", "Science")))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    assert!(!svc.categories.exists_by_id("c2").await.unwrap());

    let renamed = svc
        .categories
        .save(Some(Category::new("c1", "Physics")))
        .await
        .unwrap();
    assert_eq!(svc.categories.find_by_id("c1").await.unwrap(), renamed);
}

#[tokio::test]
async fn category_lookups_report_missing_and_blank() {
    let svc = services();
    assert_eq!(
        svc.categories.find_by_id("1").await.unwrap_err(),
        not_found("Category with id '1' not found")
    );
    assert_eq!(
        svc.categories.find_by_name("Art").await.unwrap_err(),
        not_found("Category with name 'Art' not found")
    );
    assert_eq!(
        svc.categories.find_by_id("  ").await.unwrap_err(),
        CoreError::BadRequest("Category ID must not be null or empty".into())
    );
    assert_eq!(
        svc.categories.create_category(None).await.unwrap_err(),
        CoreError::BadRequest("Request body must not be null".into())
    );
}

#[tokio::test]
async fn categories_list_sorted_by_name() {
    let svc = services();
    for name in ["Zoology", "Applied Mathematics", "History", "Biology"] {
        svc.categories
            .create_category(Some(CategoryRequest::new(name)))
            .await
            .unwrap();
    }
    let names: Vec<String> = svc
        .categories
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Applied Mathematics", "Biology", "History", "Zoology"]);
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
    let svc = seeded().await;
    svc.categories.delete_by_id("c1").await.unwrap();
    assert_eq!(
        svc.categories.delete_by_id("c1").await.unwrap_err(),
        not_found("Category with id 'c1' not found")
    );

    let svc = seeded().await;
    svc.sessions.delete_by_id("s1").await.unwrap();
    assert_eq!(
        svc.sessions.delete_by_id("s1").await.unwrap_err(),
        not_found("Study session with ID 's1' not found")
    );
}

#[tokio::test]
async fn session_requires_existing_category() {
    let svc = services();
    let err = svc
        .sessions
        .create_study_session(Some(StudySessionRequest::new("does-not-exist", "x")))
        .await
        .unwrap_err();
    assert_eq!(err, not_found("Category with id 'does-not-exist' not found"));
    assert!(svc.sessions.find_all().await.unwrap().is_empty());

    let err = svc
        .sessions
        .save(Some(StudySession::new("s1", "nope", "x")))
        .await
        .unwrap_err();
    assert_eq!(err, not_found("Category with id 'nope' not found"));
}

#[tokio::test]
async fn session_names_need_not_be_unique() {
    let svc = seeded().await;
    let a = svc
        .sessions
        .create_study_session(Some(StudySessionRequest::new("c1", "Thermo")))
        .await
        .unwrap();
    assert_eq!(a.name, "Thermo");
    assert_eq!(svc.sessions.find_all_by_category_id("c1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn sessions_by_category_reports_missing_category() {
    let svc = seeded().await;
    assert_eq!(
        svc.sessions.find_all_by_category_id("c9").await.unwrap_err(),
        not_found("Category with id 'c9' not found")
    );
    let v = svc.sessions.find_all_by_category_id("c1").await.unwrap();
    assert_eq!(v, vec![StudySession::new("s1", "c1", "Thermo")]);
    assert_eq!(
        svc.sessions.id_from_study_session_with_name("Thermo").await.unwrap(),
        "s1"
    );
    assert_eq!(
        svc.sessions
            .id_from_study_session_with_name("Optics")
            .await
            .unwrap_err(),
        not_found("Study session with name 'Optics' not found")
    );
}

#[tokio::test]
async fn flashcard_lifecycle() {
    let svc = seeded().await;
    let card = svc
        .flashcards
        .create_flashcard(Some(FlashcardRequest::new("s1", "Q", "A")))
        .await
        .unwrap();
    assert_eq!(svc.flashcards.find_by_id(&card.id).await.unwrap(), card);
    assert_eq!(
        svc.flashcards.find_all_by_study_session_id("s1").await.unwrap(),
        vec![card.clone()]
    );

    svc.flashcards.delete_by_id(&card.id).await.unwrap();
    assert_eq!(
        svc.flashcards.find_by_id(&card.id).await.unwrap_err(),
        not_found(&format!("Flashcard with ID '{}' not found", card.id))
    );
    assert!(svc.flashcards.delete_by_id(&card.id).await.is_err());
}

#[tokio::test]
async fn flashcard_requires_existing_session() {
    let svc = seeded().await;
    let err = svc
        .flashcards
        .create_flashcard(Some(FlashcardRequest::new("s9", "Q", "A")))
        .await
        .unwrap_err();
    assert_eq!(err, not_found("Study session with ID 's9' not found"));

    let err = svc
        .flashcards
        .find_all_by_study_session_id("s9")
        .await
        .unwrap_err();
    assert_eq!(err, not_found("Study session with ID 's9' not found"));
    assert!(svc.flashcards.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_fields_are_rejected_before_any_write() {
    let svc = seeded().await;
    let err = svc
        .flashcards
        .create_flashcard(Some(FlashcardRequest::new("s1", "  ", "A")))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::BadRequest("Question must not be null or empty".into())
    );
    let err = svc
        .flashcards
        .save(Some(Flashcard::new("", "s1", "Q", "A")))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::BadRequest(_)));
    assert!(svc.flashcards.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_upserts_by_id() {
    let svc = seeded().await;
    let card = Flashcard::new("f1", "s1", "Q", "A");
    assert!(!svc.flashcards.exists_by_id("f1").await.unwrap());
    assert_eq!(svc.flashcards.save(Some(card.clone())).await.unwrap(), card);
    assert!(svc.flashcards.exists_by_id("f1").await.unwrap());

    let edited = Flashcard::new("f1", "s1", "Q2", "A2");
    svc.flashcards.save(Some(edited.clone())).await.unwrap();
    assert_eq!(svc.flashcards.find_by_id("f1").await.unwrap(), edited);
    assert_eq!(svc.flashcards.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_category_cascades_to_children() {
    let svc = seeded().await;
    svc.flashcards
        .save(Some(Flashcard::new("f1", "s1", "Q", "A")))
        .await
        .unwrap();
    svc.categories.delete_by_id("c1").await.unwrap();
    assert!(!svc.sessions.exists_by_id("s1").await.unwrap());
    assert!(!svc.flashcards.exists_by_id("f1").await.unwrap());
}

#[tokio::test]
async fn references_stay_closed_after_mixed_operations() {
    let svc = seeded().await;
    svc.categories
        .save(Some(Category::new("c2", "Art")))
        .await
        .unwrap();
    svc.sessions
        .save(Some(StudySession::new("s2", "c2", "Baroque")))
        .await
        .unwrap();
    svc.flashcards
        .save(Some(Flashcard::new("f1", "s1", "Q", "A")))
        .await
        .unwrap();
    svc.flashcards
        .save(Some(Flashcard::new("f2", "s2", "Q", "A")))
        .await
        .unwrap();
    assert_eq!(
        svc.flashcards
            .save(Some(Flashcard::new("f3", "missing", "Q", "A")))
            .await,
        Err(not_found("Study session with ID 'missing' not found"))
    );
    svc.sessions.delete_by_id("s1").await.unwrap();

    for s in svc.sessions.find_all().await.unwrap() {
        assert!(svc.categories.exists_by_id(&s.category_id).await.unwrap());
    }
    for f in svc.flashcards.find_all().await.unwrap() {
        assert!(svc.sessions.exists_by_id(&f.study_session_id).await.unwrap());
    }
    assert_eq!(svc.flashcards.find_all().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_creates_with_one_name_admit_one() {
    let svc = services();
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            svc.categories
                .create_category(Some(CategoryRequest::new("Music")))
                .await
        }));
    }
    let mut created = 0;
    for t in tasks {
        match t.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(
                err,
                CoreError::Conflict("Category with name 'Music' already exists".into())
            ),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(svc.categories.find_all().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parent_check_holds_against_a_racing_delete() {
    let svc = seeded().await;
    let mut tasks = Vec::new();
    for i in 0..16 {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            svc.flashcards
                .save(Some(Flashcard::new(format!("f{i}"), "s1", "Q", "A")))
                .await
                .map(drop)
        }));
    }
    svc.categories.delete_by_id("c1").await.unwrap();
    for t in tasks {
        if let Err(err) = t.await.unwrap() {
            assert_eq!(err, not_found("Study session with ID 's1' not found"));
        }
    }
    assert!(svc.sessions.find_all().await.unwrap().is_empty());
    assert!(svc.flashcards.find_all().await.unwrap().is_empty());
}
