use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flashcards_core::repo::memory::Tables;
use flashcards_core::repo::{CategoryRepository, FlashcardRepository, StudySessionRepository};
use flashcards_core::{Category, CoreError, Flashcard, StudySession};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;

pub mod paths;

pub use paths::StorePaths;

const FILE_VERSION: u32 = 1;
pub const DEFAULT_MAX_BACKUPS: usize = 10;
const BACKUP_PREFIX: &str = "flashcards-";

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    categories: Vec<Category>,
    sessions: Vec<StudySession>,
    flashcards: Vec<Flashcard>,
}

#[derive(Clone)]
struct State {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tables: Tables,
}

impl State {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            tables: Tables::new(),
        }
    }

    fn to_image(&self) -> FileImage {
        FileImage {
            version: FILE_VERSION,
            created_at: self.created_at,
            updated_at: self.updated_at,
            categories: self.tables.categories.values().cloned().collect(),
            sessions: self.tables.sessions.values().cloned().collect(),
            flashcards: self.tables.flashcards.values().cloned().collect(),
        }
    }

    // Records are reinserted through the table constraints, so a hand-edited
    // file with dangling references fails to load instead of breaking them.
    fn from_image(img: FileImage) -> Result<Self, CoreError> {
        let mut tables = Tables::new();
        for c in &img.categories {
            tables.put_category(c)?;
        }
        for s in &img.sessions {
            tables.put_session(s)?;
        }
        for f in &img.flashcards {
            tables.put_flashcard(f)?;
        }
        Ok(Self {
            created_at: img.created_at,
            updated_at: img.updated_at,
            tables,
        })
    }
}

/// File-backed store holding every entity in one JSON image.
///
/// Writers queue on `gate`, apply their change to a copy of the tables and
/// commit the copy only once the image is on disk. Readers see the last
/// committed state. The gate also numbers writes so backup names never
/// collide.
pub struct JsonStore {
    paths: StorePaths,
    max_backups: usize,
    gate: Mutex<u64>,
    state: RwLock<State>,
}

impl JsonStore {
    pub async fn open_default() -> Result<Self, CoreError> {
        Self::open_with(StorePaths::default_location(), DEFAULT_MAX_BACKUPS).await
    }

    pub async fn open_with(paths: StorePaths, max_backups: usize) -> Result<Self, CoreError> {
        ensure_dir(paths.file.parent())?;
        ensure_dir(Some(paths.backups.as_path()))?;
        let max_backups = max_backups.max(1);
        let state = load_or_init(&paths, max_backups).await?;
        tracing::debug!(file = %paths.file.display(), "json store opened");
        Ok(Self {
            paths,
            max_backups,
            gate: Mutex::new(1),
            state: RwLock::new(state),
        })
    }

    /// Applies `f` to a copy of the tables, writes the result and commits it.
    /// A rejected change or a failed write leaves the store untouched.
    async fn write<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut seq = self.gate.lock().await;
        let mut next = self.state.read().clone();
        let out = f(&mut next.tables)?;
        next.updated_at = Utc::now();

        let image = Image {
            paths: self.paths.clone(),
            keep: self.max_backups,
            seq: *seq,
            body: next.to_image(),
        };
        task::spawn_blocking(move || image.commit())
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|err| {
                tracing::error!(%err, "json store write failed");
                CoreError::Storage("io")
            })?;

        *seq += 1;
        *self.state.write() = next;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&self.state.read().tables)
    }
}

fn ensure_dir(dir: Option<&Path>) -> Result<(), CoreError> {
    match dir {
        Some(d) if !d.as_os_str().is_empty() => {
            fs::create_dir_all(d).map_err(|_| CoreError::Storage("io"))
        }
        _ => Ok(()),
    }
}

async fn load_or_init(paths: &StorePaths, keep: usize) -> Result<State, CoreError> {
    if !paths.file.exists() {
        let state = State::new_empty();
        let image = Image {
            paths: paths.clone(),
            keep,
            seq: 0,
            body: state.to_image(),
        };
        image.commit().map_err(|_| CoreError::Storage("io"))?;
        return Ok(state);
    }

    let file = paths.file.clone();
    let body = task::spawn_blocking(move || fs::read_to_string(file))
        .await
        .map_err(|_| CoreError::Storage("io"))?
        .map_err(|_| CoreError::Storage("io"))?;
    let image: FileImage =
        serde_json::from_str(&body).map_err(|_| CoreError::Storage("corrupt store file"))?;
    State::from_image(image)
}

/// One pending write: the image, where it goes and its backup slot.
struct Image {
    paths: StorePaths,
    keep: usize,
    seq: u64,
    body: FileImage,
}

impl Image {
    /// Backup first, then the store file. An error leaves the store file as
    /// it was.
    fn commit(&self) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(&self.body)?;

        // Sortable by name: timestamp first, then the write number.
        let stamp = self.body.updated_at.format("%Y%m%dT%H%M%S%3f");
        let backup = self
            .paths
            .backups
            .join(format!("{BACKUP_PREFIX}{stamp}-{:08}.json", self.seq));
        replace_atomically(&backup, &json)?;

        if let Err(err) = replace_atomically(&self.paths.file, &json) {
            let _ = fs::remove_file(&backup);
            return Err(err);
        }

        if let Err(err) = prune_backups(&self.paths.backups, self.keep) {
            tracing::warn!(%err, "could not prune backups");
        }
        Ok(())
    }
}

fn replace_atomically(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map(drop).map_err(|e| e.error)
}

/// Keeps the newest `keep` backups, judged by file name.
fn prune_backups(dir: &Path, keep: usize) -> std::io::Result<()> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".json"))
        .collect();
    names.sort();
    let excess = names.len().saturating_sub(keep);
    for name in &names[..excess] {
        if let Err(err) = fs::remove_file(dir.join(name)) {
            tracing::warn!(%err, %name, "could not prune backup");
        }
    }
    Ok(())
}

#[async_trait]
impl CategoryRepository for JsonStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, CoreError> {
        Ok(self.read(|t| t.categories.get(id).cloned()))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.read(|t| t.categories.contains_key(id)))
    }

    async fn save(&self, category: &Category) -> Result<Category, CoreError> {
        self.write(|t| t.put_category(category)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        self.write(|t| {
            t.remove_category(id);
            Ok(())
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.read(|t| t.categories.values().cloned().collect()))
    }

    async fn find_all_by_order_by_name_asc(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.read(Tables::categories_by_name))
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.read(|t| t.category_by_name(name).is_some()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, CoreError> {
        Ok(self.read(|t| t.category_by_name(name)))
    }
}

#[async_trait]
impl StudySessionRepository for JsonStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<StudySession>, CoreError> {
        Ok(self.read(|t| t.sessions.get(id).cloned()))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.read(|t| t.sessions.contains_key(id)))
    }

    async fn save(&self, session: &StudySession) -> Result<StudySession, CoreError> {
        self.write(|t| t.put_session(session)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        self.write(|t| {
            t.remove_session(id);
            Ok(())
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<StudySession>, CoreError> {
        Ok(self.read(|t| t.sessions.values().cloned().collect()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<StudySession>, CoreError> {
        Ok(self.read(|t| t.session_by_name(name)))
    }

    async fn find_all_by_category_id(
        &self,
        category_id: &str,
    ) -> Result<Vec<StudySession>, CoreError> {
        Ok(self.read(|t| t.sessions_in_category(category_id)))
    }
}

#[async_trait]
impl FlashcardRepository for JsonStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Flashcard>, CoreError> {
        Ok(self.read(|t| t.flashcards.get(id).cloned()))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.read(|t| t.flashcards.contains_key(id)))
    }

    async fn save(&self, flashcard: &Flashcard) -> Result<Flashcard, CoreError> {
        self.write(|t| t.put_flashcard(flashcard)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        self.write(|t| {
            t.remove_flashcard(id);
            Ok(())
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Flashcard>, CoreError> {
        Ok(self.read(|t| t.flashcards.values().cloned().collect()))
    }

    async fn find_all_by_study_session_id(
        &self,
        study_session_id: &str,
    ) -> Result<Vec<Flashcard>, CoreError> {
        Ok(self.read(|t| t.flashcards_in_session(study_session_id)))
    }
}
