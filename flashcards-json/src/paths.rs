use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Per-user data directory, or the working directory when the platform has none.
pub fn data_root() -> PathBuf {
    match ProjectDirs::from("com", "flashcards", "Flashcards") {
        Some(pd) => pd.data_dir().to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorePaths {
    pub file: PathBuf,
    pub backups: PathBuf,
}

impl StorePaths {
    /// `<dir>/flashcards.json` with backups in `<dir>/backups`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            file: dir.join("flashcards.json"),
            backups: dir.join("backups"),
        }
    }

    /// Backups go next to an explicitly chosen store file.
    pub fn for_file(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            file,
            backups: dir.join("backups"),
        }
    }

    pub fn default_location() -> Self {
        Self::in_dir(data_root())
    }
}
