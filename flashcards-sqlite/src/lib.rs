use flashcards_core::repo::{CategoryRepository, FlashcardRepository, StudySessionRepository};
use flashcards_core::{messages, Category, CoreError, Flashcard, StudySession};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        tracing::debug!(path = %path.as_ref().display(), "sqlite store opened");
        Ok(store)
    }

    /// A private in-memory database. Pinned to one connection that never
    /// expires, since every new connection would see an empty database.
    pub async fn open_memory() -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|_| CoreError::Storage("sqlite url"))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS categories (
          id    TEXT PRIMARY KEY,
          name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS study_sessions (
          id           TEXT PRIMARY KEY,
          category_id  TEXT NOT NULL,
          name         TEXT NOT NULL,
          FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS flashcards (
          id                TEXT PRIMARY KEY,
          study_session_id  TEXT NOT NULL,
          question          TEXT NOT NULL,
          answer            TEXT NOT NULL,
          FOREIGN KEY(study_session_id) REFERENCES study_sessions(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_category ON study_sessions (category_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_name ON study_sessions (name);
        CREATE INDEX IF NOT EXISTS idx_flashcards_session ON flashcards (study_session_id);
        "#;

        // Execute statements one by one for compatibility.
        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|_| CoreError::Storage("sqlite schema"))?;
        }
        Ok(())
    }

    async fn exists(&self, sql: &'static str, key: &str) -> Result<bool, CoreError> {
        Ok(sqlx::query(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("read"))?
            .is_some())
    }
}

// ===== Categories =====
#[async_trait::async_trait]
impl CategoryRepository for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, CoreError> {
        let row = sqlx::query("SELECT id,name FROM categories WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("read category"))?;
        Ok(row.map(row_into_category))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        self.exists("SELECT 1 FROM categories WHERE id=? LIMIT 1", id)
            .await
    }

    async fn save(&self, category: &Category) -> Result<Category, CoreError> {
        sqlx::query(
            "INSERT INTO categories (id,name) VALUES (?,?)
             ON CONFLICT(id) DO UPDATE SET name=excluded.name",
        )
        .bind(&category.id)
        .bind(&category.name)
        .execute(&self.pool)
        .await
        .map_err(|err| match constraint_of(&err) {
            Some(Constraint::Unique) => {
                CoreError::Conflict(messages::category_name_exists(&category.name))
            }
            _ => CoreError::Storage("save category"),
        })?;
        Ok(category.clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|_| CoreError::Storage("tx"))?;

        // Explicit cascade, children first.
        sqlx::query(
            "DELETE FROM flashcards WHERE study_session_id IN
               (SELECT id FROM study_sessions WHERE category_id=?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|_| CoreError::Storage("del flashcards"))?;

        sqlx::query("DELETE FROM study_sessions WHERE category_id=?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|_| CoreError::Storage("del sessions"))?;

        sqlx::query("DELETE FROM categories WHERE id=?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|_| CoreError::Storage("del category"))?;

        tx.commit()
            .await
            .map_err(|_| CoreError::Storage("tx commit"))
    }

    async fn find_all(&self) -> Result<Vec<Category>, CoreError> {
        let rows = sqlx::query("SELECT id,name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list categories"))?;
        Ok(rows.into_iter().map(row_into_category).collect())
    }

    async fn find_all_by_order_by_name_asc(&self) -> Result<Vec<Category>, CoreError> {
        // BINARY collation compares UTF-8 bytes, i.e. code-point order.
        let rows = sqlx::query("SELECT id,name FROM categories ORDER BY name COLLATE BINARY ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list categories"))?;
        Ok(rows.into_iter().map(row_into_category).collect())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, CoreError> {
        self.exists("SELECT 1 FROM categories WHERE name=? LIMIT 1", name)
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, CoreError> {
        let row = sqlx::query("SELECT id,name FROM categories WHERE name=?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("read category"))?;
        Ok(row.map(row_into_category))
    }
}

// ===== Study sessions =====
#[async_trait::async_trait]
impl StudySessionRepository for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<StudySession>, CoreError> {
        let row = sqlx::query("SELECT id,category_id,name FROM study_sessions WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("read session"))?;
        Ok(row.map(row_into_session))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        self.exists("SELECT 1 FROM study_sessions WHERE id=? LIMIT 1", id)
            .await
    }

    async fn save(&self, session: &StudySession) -> Result<StudySession, CoreError> {
        sqlx::query(
            "INSERT INTO study_sessions (id,category_id,name) VALUES (?,?,?)
             ON CONFLICT(id) DO UPDATE SET category_id=excluded.category_id, name=excluded.name",
        )
        .bind(&session.id)
        .bind(&session.category_id)
        .bind(&session.name)
        .execute(&self.pool)
        .await
        .map_err(|err| match constraint_of(&err) {
            Some(Constraint::ForeignKey) => {
                CoreError::NotFound(messages::category_not_found(&session.category_id))
            }
            _ => CoreError::Storage("save session"),
        })?;
        Ok(session.clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|_| CoreError::Storage("tx"))?;
        sqlx::query("DELETE FROM flashcards WHERE study_session_id=?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|_| CoreError::Storage("del flashcards"))?;
        sqlx::query("DELETE FROM study_sessions WHERE id=?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|_| CoreError::Storage("del session"))?;
        tx.commit()
            .await
            .map_err(|_| CoreError::Storage("tx commit"))
    }

    async fn find_all(&self) -> Result<Vec<StudySession>, CoreError> {
        let rows = sqlx::query("SELECT id,category_id,name FROM study_sessions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list sessions"))?;
        Ok(rows.into_iter().map(row_into_session).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<StudySession>, CoreError> {
        // Names may repeat; the lowest id wins.
        let row = sqlx::query(
            "SELECT id,category_id,name FROM study_sessions WHERE name=? ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("read session"))?;
        Ok(row.map(row_into_session))
    }

    async fn find_all_by_category_id(
        &self,
        category_id: &str,
    ) -> Result<Vec<StudySession>, CoreError> {
        let rows = sqlx::query(
            "SELECT id,category_id,name FROM study_sessions WHERE category_id=? ORDER BY id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("list sessions"))?;
        Ok(rows.into_iter().map(row_into_session).collect())
    }
}

// ===== Flashcards =====
#[async_trait::async_trait]
impl FlashcardRepository for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Flashcard>, CoreError> {
        let row = sqlx::query(
            "SELECT id,study_session_id,question,answer FROM flashcards WHERE id=?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("read flashcard"))?;
        Ok(row.map(row_into_flashcard))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, CoreError> {
        self.exists("SELECT 1 FROM flashcards WHERE id=? LIMIT 1", id)
            .await
    }

    async fn save(&self, flashcard: &Flashcard) -> Result<Flashcard, CoreError> {
        sqlx::query(
            r#"
            INSERT INTO flashcards (id,study_session_id,question,answer) VALUES (?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
              study_session_id=excluded.study_session_id,
              question=excluded.question,
              answer=excluded.answer
            "#,
        )
        .bind(&flashcard.id)
        .bind(&flashcard.study_session_id)
        .bind(&flashcard.question)
        .bind(&flashcard.answer)
        .execute(&self.pool)
        .await
        .map_err(|err| match constraint_of(&err) {
            Some(Constraint::ForeignKey) => CoreError::NotFound(
                messages::study_session_not_found(&flashcard.study_session_id),
            ),
            _ => CoreError::Storage("save flashcard"),
        })?;
        Ok(flashcard.clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM flashcards WHERE id=?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("del flashcard"))?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Flashcard>, CoreError> {
        let rows = sqlx::query(
            "SELECT id,study_session_id,question,answer FROM flashcards ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("list flashcards"))?;
        Ok(rows.into_iter().map(row_into_flashcard).collect())
    }

    async fn find_all_by_study_session_id(
        &self,
        study_session_id: &str,
    ) -> Result<Vec<Flashcard>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT id,study_session_id,question,answer
               FROM flashcards WHERE study_session_id=? ORDER BY id"#,
        )
        .bind(study_session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("list flashcards"))?;
        Ok(rows.into_iter().map(row_into_flashcard).collect())
    }
}

// ===== Helpers =====
enum Constraint {
    Unique,
    ForeignKey,
}

fn constraint_of(err: &sqlx::Error) -> Option<Constraint> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if db.is_unique_violation() {
        Some(Constraint::Unique)
    } else if db.is_foreign_key_violation() {
        Some(Constraint::ForeignKey)
    } else {
        tracing::warn!(error = %db, "unclassified sqlite error");
        None
    }
}

fn row_into_category(row: SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn row_into_session(row: SqliteRow) -> StudySession {
    StudySession {
        id: row.get("id"),
        category_id: row.get("category_id"),
        name: row.get("name"),
    }
}

fn row_into_flashcard(row: SqliteRow) -> Flashcard {
    Flashcard {
        id: row.get("id"),
        study_session_id: row.get("study_session_id"),
        question: row.get("question"),
        answer: row.get("answer"),
    }
}
