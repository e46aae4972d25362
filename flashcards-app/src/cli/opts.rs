use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Process-local; nothing survives exit
    Memory,
    Json,
    Sqlite,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "flashcards", version, about = "Flashcards CLI and HTTP API")]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// Store file for --store json|sqlite (defaults to the app data dir)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// TOML config file (defaults to ./flashcards.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Category operations
    #[command(subcommand)]
    Category(CategoryCmd),
    /// Study session operations
    #[command(subcommand)]
    Session(SessionCmd),
    /// Flashcard operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Export the whole store
    #[command(subcommand)]
    Export(ExportCmd),
    /// Import a previous export
    #[command(subcommand)]
    Import(ImportCmd),
    /// Serve the HTTP API
    Api(ApiCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum CategoryCmd {
    Add { name: String },
    List,
    /// Remove by id or name, with its sessions and flashcards
    Rm { category: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum SessionCmd {
    Add {
        /// Category id or name
        #[arg(long)]
        category: String,
        name: String,
    },
    List {
        #[arg(long)]
        category: Option<String>,
    },
    Rm { session: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long)]
        session: Option<String>,
    },
    Rm { card_id: String },
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    /// Study session id or name
    #[arg(long)]
    pub session: String,
    #[arg(long)]
    pub question: String,
    #[arg(long)]
    pub answer: String,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json { path: PathBuf },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    Json { path: PathBuf },
}

#[derive(Debug, Args, Clone)]
pub struct ApiCmd {
    /// Bind address (host:port); overrides `server.addr`
    #[arg(long)]
    pub addr: Option<String>,
}
