//! Step counting over directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

use crate::app::classify::count_logical_lines;
use crate::app::notebook::NotebookDocument;
use crate::domain::model::{CountReport, DEFAULT_EXTENSIONS, FolderCount, SourceKind};
use crate::infra::config::Config;

/// Serial walker summing classifier results across directory trees.
#[derive(Debug, Clone)]
pub struct StepCounter {
    extensions: Vec<String>,
}

impl Default for StepCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl StepCounter {
    /// Counter with the built-in extension allow-list.
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Counter with the allow-list from the layered configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            extensions: config.count.extensions.clone(),
        }
    }

    /// Count logical steps in a single file.
    ///
    /// Files outside the allow-list are never opened. Unreadable or
    /// unparseable files contribute 0; the cause is traced, never surfaced.
    pub fn count_file(&self, path: &Path) -> usize {
        let Some(kind) = SourceKind::detect(path, &self.extensions) else {
            return 0;
        };
        match read_and_count(path, kind) {
            Ok(steps) => steps,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "file contributed 0");
                0
            }
        }
    }

    /// Walk everything under `folder` and sum per-file counts.
    ///
    /// The walk is serial and exhaustive: hidden entries and ignore files are
    /// not honored here; only the extension allow-list filters. Enumeration
    /// order is filesystem-dependent.
    pub fn count_folder(&self, folder: &Path) -> FolderCount {
        let mut steps = 0usize;
        let mut files = 0usize;

        for result in WalkBuilder::new(folder).standard_filters(false).build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "walker error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }
            if SourceKind::detect(entry.path(), &self.extensions).is_none() {
                continue;
            }
            steps += self.count_file(entry.path());
            files += 1;
        }

        FolderCount {
            path: folder.to_path_buf(),
            display_path: folder.display().to_string(),
            steps,
            files,
        }
    }

    /// Count each folder independently and sum the results.
    ///
    /// Nested selections are not deduplicated: a folder and one of its
    /// subfolders both count the subfolder's files, so overlapping
    /// selections double-count.
    pub fn count_folders(&self, folders: &[PathBuf]) -> CountReport {
        let mut report = CountReport::default();
        for folder in folders {
            let count = self.count_folder(folder);
            report.total_steps += count.steps;
            report.folders.push(count);
        }
        report
    }
}

fn read_and_count(path: &Path, kind: SourceKind) -> Result<usize> {
    match kind {
        SourceKind::Notebook => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read notebook {}", path.display()))?;
            let notebook = NotebookDocument::parse(&raw)
                .with_context(|| format!("malformed notebook {}", path.display()))?;
            Ok(notebook.count_logical_steps())
        }
        SourceKind::Text => {
            let raw =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let text = String::from_utf8_lossy(&raw);
            Ok(count_logical_lines(text.lines()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn unsupported_extensions_are_never_counted() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("notes.md"), "x = 5\nfoo(1);\n")?;
        fs::write(temp.path().join("script"), "y = 2\n")?;

        let count = StepCounter::new().count_folder(temp.path());
        assert_eq!(count.steps, 0);
        assert_eq!(count.files, 0);
        Ok(())
    }

    #[test]
    fn counts_text_sources_line_by_line() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(
            temp.path().join("main.py"),
            "# entry point\n\ndef main():\n    x = 5\n    print(x)\n",
        )?;

        let count = StepCounter::new().count_folder(temp.path());
        assert_eq!(count.steps, 3);
        assert_eq!(count.files, 1);
        Ok(())
    }

    #[test]
    fn malformed_notebook_contributes_zero_without_aborting() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("broken.ipynb"), "{ not json")?;
        fs::write(temp.path().join("ok.py"), "x = 1\ny = 2\n")?;

        let count = StepCounter::new().count_folder(temp.path());
        assert_eq!(count.steps, 2);
        assert_eq!(count.files, 2);
        Ok(())
    }

    #[test]
    fn notebook_code_cells_are_counted() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let raw = r#"{
            "cells": [
                {"cell_type": "code", "source": ["total = 0\n", "for n in ns:\n", "    total += n\n"]},
                {"cell_type": "markdown", "source": ["a = b\n"]}
            ]
        }"#;
        fs::write(temp.path().join("analysis.ipynb"), raw)?;

        let count = StepCounter::new().count_folder(temp.path());
        assert_eq!(count.steps, 3);
        Ok(())
    }

    #[test]
    fn invalid_bytes_are_decoded_best_effort() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("lossy.c"), b"int x = 1;\n\xff\xfe\ny = 2;\n")?;

        let count = StepCounter::new().count_folder(temp.path());
        assert_eq!(count.steps, 2);
        Ok(())
    }

    #[test]
    fn missing_folder_counts_zero() {
        let count = StepCounter::new().count_folder(Path::new("/does/not/exist"));
        assert_eq!(count.steps, 0);
        assert_eq!(count.files, 0);
    }

    #[test]
    fn nested_selections_double_count() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let sub = temp.path().join("sub");
        fs::create_dir(&sub)?;
        fs::write(temp.path().join("top.py"), "a = 1\n")?;
        fs::write(sub.join("inner.py"), "b = 2\nc = 3\n")?;

        let counter = StepCounter::new();
        let report = counter.count_folders(&[temp.path().to_path_buf(), sub.clone()]);

        assert_eq!(report.folders[0].steps, 3);
        assert_eq!(report.folders[1].steps, 2);
        assert_eq!(report.total_steps, 5);
        Ok(())
    }

    #[test]
    fn hidden_files_are_still_counted() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join(".hidden.py"), "x = 1\n")?;

        let count = StepCounter::new().count_folder(temp.path());
        assert_eq!(count.steps, 1);
        Ok(())
    }
}
