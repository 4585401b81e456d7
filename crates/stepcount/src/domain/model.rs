//! Domain models for source files and count results.

use std::path::{Path, PathBuf};

/// Extensions counted when no override is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "py", "ipynb", "c", "cpp", "h", "hpp", "js", "ts", "cs", "R",
];

/// Implied kind of a source file, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Plain text source, counted line by line with best-effort decoding.
    Text,
    /// Notebook document, counted across its code cells.
    Notebook,
}

impl SourceKind {
    /// Infer the kind from the file extension against an allow-list.
    ///
    /// Matching is case-sensitive: `.R` is counted, `.r` is not.
    pub fn detect(path: &Path, extensions: &[String]) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if !extensions.iter().any(|allowed| allowed == ext) {
            return None;
        }
        if ext == "ipynb" {
            Some(Self::Notebook)
        } else {
            Some(Self::Text)
        }
    }
}

/// Step total for one counted folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderCount {
    pub path: PathBuf,
    pub display_path: String,
    pub steps: usize,
    pub files: usize,
}

/// Aggregate of one counting run across all checked folders.
///
/// Folders are counted independently: a checked subdirectory of another
/// checked folder contributes to `total_steps` twice, once on its own and
/// once inside the parent's walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountReport {
    pub folders: Vec<FolderCount>,
    pub total_steps: usize,
}

impl CountReport {
    /// Number of files that contributed across all folders.
    pub fn total_files(&self) -> usize {
        self.folders.iter().map(|folder| folder.files).sum()
    }

    /// Whether the run covered any folder at all.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
