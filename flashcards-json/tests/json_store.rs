use flashcards_core::repo::{CategoryRepository, StudySessionRepository};
use flashcards_core::{
    Category, CoreError, Flashcard, Repositories, Services, StudySession, UuidIds,
};
use flashcards_json::{JsonStore, StorePaths};
use std::sync::Arc;
use tempfile::TempDir;

async fn open(dir: &TempDir) -> Arc<JsonStore> {
    Arc::new(
        JsonStore::open_with(StorePaths::in_dir(dir.path()), 3)
            .await
            .unwrap(),
    )
}

fn services(store: Arc<JsonStore>) -> Services {
    Services::new(Repositories::from_store(store), Arc::new(UuidIds))
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let svc = services(open(&dir).await);
        svc.categories
            .save(Some(Category::new("c1", "Science")))
            .await
            .unwrap();
        svc.sessions
            .save(Some(StudySession::new("s1", "c1", "Thermo")))
            .await
            .unwrap();
        svc.flashcards
            .save(Some(Flashcard::new("f1", "s1", "Q", "A")))
            .await
            .unwrap();
    }

    let svc = services(open(&dir).await);
    assert_eq!(
        svc.categories.find_by_name("Science").await.unwrap(),
        Category::new("c1", "Science")
    );
    assert_eq!(
        svc.flashcards.find_all_by_study_session_id("s1").await.unwrap(),
        vec![Flashcard::new("f1", "s1", "Q", "A")]
    );
}

#[tokio::test]
async fn store_enforces_unique_names_and_parents() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    CategoryRepository::save(&*store, &Category::new("c1", "Science"))
        .await
        .unwrap();

    let err = CategoryRepository::save(&*store, &Category::new("c2", "Science"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let err = StudySessionRepository::save(&*store, &StudySession::new("s1", "c9", "x"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::NotFound("Category with id 'c9' not found".into())
    );
}

#[tokio::test]
async fn category_delete_cascades_on_disk() {
    let dir = TempDir::new().unwrap();
    {
        let svc = services(open(&dir).await);
        svc.categories
            .save(Some(Category::new("c1", "Science")))
            .await
            .unwrap();
        svc.sessions
            .save(Some(StudySession::new("s1", "c1", "Thermo")))
            .await
            .unwrap();
        svc.flashcards
            .save(Some(Flashcard::new("f1", "s1", "Q", "A")))
            .await
            .unwrap();
        svc.categories.delete_by_id("c1").await.unwrap();
    }

    let svc = services(open(&dir).await);
    assert!(svc.categories.find_all().await.unwrap().is_empty());
    assert!(svc.sessions.find_all().await.unwrap().is_empty());
    assert!(svc.flashcards.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn backups_are_rotated() {
    let dir = TempDir::new().unwrap();
    let svc = services(open(&dir).await);
    for i in 0..5 {
        svc.categories
            .save(Some(Category::new(format!("c{i}"), format!("Cat {i}"))))
            .await
            .unwrap();
    }
    // Five writes inside the same second still get distinct backups.
    let mut names: Vec<String> = std::fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names.len(), 3, "kept {names:?}");
    assert!(names[2].ends_with("-00000005.json"), "newest is {}", names[2]);
}

#[tokio::test]
async fn dangling_reference_in_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_dir(dir.path());
    std::fs::write(
        &paths.file,
        r#"{
          "version": 1,
          "created_at": "2024-01-01T00:00:00Z",
          "updated_at": "2024-01-01T00:00:00Z",
          "categories": [],
          "sessions": [{"id": "s1", "categoryId": "gone", "name": "x"}],
          "flashcards": []
        }"#,
    )
    .unwrap();
    assert!(JsonStore::open_with(paths, 3).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_all_reach_disk() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir).await;
        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                CategoryRepository::save(&*store, &Category::new(format!("c{i}"), format!("Cat {i}")))
                    .await
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        assert_eq!(CategoryRepository::find_all(&*store).await.unwrap().len(), 32);
    }

    let store = open(&dir).await;
    assert_eq!(CategoryRepository::find_all(&*store).await.unwrap().len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn session_writes_racing_a_delete_keep_the_file_loadable() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir).await;
        CategoryRepository::save(&*store, &Category::new("c1", "Science"))
            .await
            .unwrap();
        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let s = StudySession::new(format!("s{i}"), "c1", "x");
                StudySessionRepository::save(&*store, &s).await.map(drop)
            }));
        }
        let deleter = {
            let store = store.clone();
            tokio::spawn(async move { CategoryRepository::delete_by_id(&*store, "c1").await })
        };
        deleter.await.unwrap().unwrap();
        for t in tasks {
            if let Err(err) = t.await.unwrap() {
                assert_eq!(err, CoreError::NotFound("Category with id 'c1' not found".into()));
            }
        }
    }

    // Every surviving session still has its category, or the reopen would fail.
    let store = open(&dir).await;
    assert!(StudySessionRepository::find_all(&*store).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_write_is_not_applied() {
    let dir = TempDir::new().unwrap();
    let backups = dir.path().join("backups");
    let store = open(&dir).await;

    std::fs::remove_dir_all(&backups).unwrap();
    std::fs::write(&backups, b"not a directory").unwrap();

    let err = CategoryRepository::save(&*store, &Category::new("c1", "Science"))
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::Storage("io"));
    assert!(!CategoryRepository::exists_by_id(&*store, "c1").await.unwrap());
    drop(store);

    std::fs::remove_file(&backups).unwrap();
    let store = open(&dir).await;
    assert!(!CategoryRepository::exists_by_id(&*store, "c1").await.unwrap());
}
