//! Whole-store JSON export and import.
//!
//! Import upserts categories, then sessions, then flashcards through the
//! services, so each record passes the same validation and reference checks
//! as an HTTP `PUT`. It stops at the first rejected record; records before it
//! stay written.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use flashcards_core::{Category, CoreResult, Flashcard, Services, StudySession};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
}

impl ImportReport {
    fn record(&mut self, existed: bool) {
        if existed {
            self.updated += 1;
        } else {
            self.created += 1;
        }
    }
}

pub async fn export(services: &Services) -> CoreResult<Snapshot> {
    Ok(Snapshot {
        categories: services.categories.find_all().await?,
        sessions: services.sessions.find_all().await?,
        flashcards: services.flashcards.find_all().await?,
    })
}

pub async fn import(services: &Services, snapshot: Snapshot) -> CoreResult<ImportReport> {
    let mut report = ImportReport::default();
    for c in snapshot.categories {
        let existed = services.categories.exists_by_id(&c.id).await?;
        services.categories.save(Some(c)).await?;
        report.record(existed);
    }
    for s in snapshot.sessions {
        let existed = services.sessions.exists_by_id(&s.id).await?;
        services.sessions.save(Some(s)).await?;
        report.record(existed);
    }
    for f in snapshot.flashcards {
        let existed = services.flashcards.exists_by_id(&f.id).await?;
        services.flashcards.save(Some(f)).await?;
        report.record(existed);
    }
    tracing::info!(created = report.created, updated = report.updated, "import finished");
    Ok(report)
}

pub fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid snapshot in {}", path.display()))
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
