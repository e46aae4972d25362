use crate::cli::opts::*;
use flashcards_app::config::AppConfig;
use flashcards_app::{api, transfer};

use anyhow::Result;
use flashcards_core::repo::memory::MemoryStore;
use flashcards_core::{
    CategoryRequest, CoreError, FlashcardRequest, Repositories, Services, StudySessionRequest,
    UuidIds,
};
use flashcards_json::paths::{data_root, StorePaths};
use flashcards_json::{JsonStore, DEFAULT_MAX_BACKUPS};
use flashcards_sqlite::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run_cli(args: Cli, config: AppConfig) -> Result<()> {
    let repos = open_repos(args.store, args.db_path.clone()).await?;
    let services = Services::new(repos, Arc::new(UuidIds));
    match args.cmd {
        Command::Api(cmd) => {
            let mut config = config;
            if let Some(addr) = cmd.addr {
                config.server.addr = addr;
            }
            let addr = config.socket_addr()?;
            api::run(services, &config.paths, addr).await
        }
        Command::Category(cmd) => category_cmd(&services, cmd).await,
        Command::Session(cmd) => session_cmd(&services, cmd).await,
        Command::Card(cmd) => card_cmd(&services, cmd).await,
        Command::Export(cmd) => export_cmd(&services, cmd).await,
        Command::Import(cmd) => import_cmd(&services, cmd).await,
    }
}

pub async fn open_repos(store: StoreKind, db_path: Option<PathBuf>) -> Result<Repositories> {
    let repos = match store {
        StoreKind::Memory => Repositories::from_store(Arc::new(MemoryStore::new())),
        StoreKind::Json => {
            let s = match db_path {
                Some(p) => JsonStore::open_with(StorePaths::for_file(p), DEFAULT_MAX_BACKUPS).await?,
                None => JsonStore::open_default().await?,
            };
            Repositories::from_store(Arc::new(s))
        }
        StoreKind::Sqlite => {
            let p = db_path.unwrap_or_else(|| data_root().join("flashcards.sqlite3"));
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Repositories::from_store(Arc::new(SqliteStore::open_file(&p).await?))
        }
    };
    Ok(repos)
}

async fn category_cmd(svc: &Services, cmd: CategoryCmd) -> Result<()> {
    match cmd {
        CategoryCmd::Add { name } => {
            let c = svc
                .categories
                .create_category(Some(CategoryRequest::new(name)))
                .await?;
            println!("{}", c.id);
        }
        CategoryCmd::List => {
            for c in svc.categories.find_all().await? {
                println!("{}\t{}", c.id, c.name);
            }
        }
        CategoryCmd::Rm { category } => {
            let id = resolve_category(svc, &category).await?;
            svc.categories.delete_by_id(&id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn session_cmd(svc: &Services, cmd: SessionCmd) -> Result<()> {
    match cmd {
        SessionCmd::Add { category, name } => {
            let category_id = resolve_category(svc, &category).await?;
            let s = svc
                .sessions
                .create_study_session(Some(StudySessionRequest::new(category_id, name)))
                .await?;
            println!("{}", s.id);
        }
        SessionCmd::List { category } => {
            let sessions = match category {
                Some(sel) => {
                    let id = resolve_category(svc, &sel).await?;
                    svc.sessions.find_all_by_category_id(&id).await?
                }
                None => svc.sessions.find_all().await?,
            };
            for s in sessions {
                println!("{}\t{}\tcategory={}", s.id, s.name, s.category_id);
            }
        }
        SessionCmd::Rm { session } => {
            let id = resolve_session(svc, &session).await?;
            svc.sessions.delete_by_id(&id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn card_cmd(svc: &Services, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let session_id = resolve_session(svc, &a.session).await?;
            let f = svc
                .flashcards
                .create_flashcard(Some(FlashcardRequest::new(
                    session_id, a.question, a.answer,
                )))
                .await?;
            println!("{}", f.id);
        }
        CardCmd::List { session } => {
            let cards = match session {
                Some(sel) => {
                    let id = resolve_session(svc, &sel).await?;
                    svc.flashcards.find_all_by_study_session_id(&id).await?
                }
                None => svc.flashcards.find_all().await?,
            };
            for f in cards {
                println!(
                    "{}\t{}\t{}\tsession={}",
                    f.id, f.question, f.answer, f.study_session_id
                );
            }
        }
        CardCmd::Rm { card_id } => {
            svc.flashcards.delete_by_id(&card_id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn export_cmd(svc: &Services, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Json { path } => {
            let snapshot = transfer::export(svc).await?;
            transfer::write_snapshot(&path, &snapshot)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

async fn import_cmd(svc: &Services, cmd: ImportCmd) -> Result<()> {
    match cmd {
        ImportCmd::Json { path } => {
            let snapshot = transfer::read_snapshot(&path)?;
            let report = transfer::import(svc, snapshot).await?;
            println!("imported: {} created, {} updated", report.created, report.updated);
        }
    }
    Ok(())
}

// ===== Helpers =====

/// An id wins over a name when both would match.
async fn resolve_category(svc: &Services, sel: &str) -> Result<String> {
    if svc.categories.exists_by_id(sel).await? {
        return Ok(sel.to_string());
    }
    match svc.categories.id_from_category_with_name(sel).await {
        Ok(id) => Ok(id),
        Err(CoreError::NotFound(_)) | Err(CoreError::BadRequest(_)) => {
            anyhow::bail!("category not found: {sel}")
        }
        Err(e) => Err(e.into()),
    }
}

async fn resolve_session(svc: &Services, sel: &str) -> Result<String> {
    if svc.sessions.exists_by_id(sel).await? {
        return Ok(sel.to_string());
    }
    match svc.sessions.id_from_study_session_with_name(sel).await {
        Ok(id) => Ok(id),
        Err(CoreError::NotFound(_)) | Err(CoreError::BadRequest(_)) => {
            anyhow::bail!("study session not found: {sel}")
        }
        Err(e) => Err(e.into()),
    }
}
