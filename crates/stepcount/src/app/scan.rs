//! Directory hierarchy scanning for the selector tree.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::infra::config::Config;

const STEPCOUNT_IGNORE: &str = ".stepcountignore";

/// Metadata describing a directory discovered under the root.
#[derive(Debug, Clone)]
pub struct FolderMetadata {
    pub path: PathBuf,
    pub display_path: String,
}

/// Result of scanning a selector root. Built once at startup and never
/// refreshed afterwards.
#[derive(Debug, Default, Clone)]
pub struct ScanResult {
    pub folders: Vec<FolderMetadata>,
    pub root: PathBuf,
}

/// Configuration inputs for the scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub root: PathBuf,
    pub config: Config,
}

impl ScannerConfig {
    pub fn from_root(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }
}

/// Scanner walking the directory hierarchy, honoring configured ignore rules.
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate the directories under the configured root, sorted by
    /// display path. The root itself is not part of the result; callers
    /// treat it as the tree's synthetic top node.
    pub fn scan(&self, cfg: &ScannerConfig) -> Result<ScanResult> {
        let matcher = build_ignore_matcher(&cfg.root, cfg)?;
        let mut builder = WalkBuilder::new(&cfg.root);
        builder
            .git_ignore(true)
            .hidden(!cfg.config.defaults.show_hidden);

        let root = cfg.root.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            !matcher.should_skip(rel)
        });

        let mut folders = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if entry.depth() == 0 {
                        continue;
                    }
                    if !entry.file_type().is_some_and(|kind| kind.is_dir()) {
                        continue;
                    }
                    folders.push(FolderMetadata {
                        path: entry.path().to_path_buf(),
                        display_path: to_display_path(&cfg.root, entry.path()),
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "scanner error");
                }
            }
        }

        folders.sort_by(|a, b| a.display_path.cmp(&b.display_path));

        Ok(ScanResult {
            folders,
            root: cfg.root.clone(),
        })
    }
}

fn to_display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[derive(Debug, Clone)]
struct IgnoreMatcher {
    globs: Option<GlobSet>,
}

impl IgnoreMatcher {
    fn should_skip(&self, rel: &Path) -> bool {
        self.globs.as_ref().is_some_and(|set| set.is_match(rel))
    }
}

fn build_ignore_matcher(root: &Path, cfg: &ScannerConfig) -> Result<IgnoreMatcher> {
    let mut builder = GlobSetBuilder::new();

    for pattern in &cfg.config.ignore.paths {
        for expanded in expand_dir_pattern(pattern) {
            let glob = Glob::new(&expanded).context("invalid ignore path pattern")?;
            builder.add(glob);
        }
    }

    for glob in &cfg.config.ignore.globs {
        let glob = Glob::new(glob).context("invalid ignore glob")?;
        builder.add(glob);
    }

    for pattern in load_stepcountignore(root)? {
        for expanded in expand_dir_pattern(&pattern) {
            let glob = Glob::new(&expanded).context("invalid .stepcountignore pattern")?;
            builder.add(glob);
        }
    }

    let globs = builder.build().context("failed to build ignore matcher")?;

    Ok(IgnoreMatcher { globs: Some(globs) })
}

fn expand_dir_pattern(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![
        trimmed.to_owned(),
        format!("{trimmed}/**"),
        format!("**/{trimmed}"),
        format!("**/{trimmed}/**"),
    ]
}

fn load_stepcountignore(root: &Path) -> Result<Vec<String>> {
    let path = root.join(STEPCOUNT_IGNORE);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut patterns = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        patterns.push(trimmed.to_owned());
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build_config() -> Config {
        Config::default()
    }

    #[test]
    fn lists_directories_not_files() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();

        fs::create_dir_all(root.join("src/core"))?;
        fs::create_dir_all(root.join("docs"))?;
        fs::write(root.join("src/lib.py"), "x = 1\n")?;

        let scanner_cfg = ScannerConfig::from_root(root.to_path_buf(), build_config());
        let result = Scanner::new().scan(&scanner_cfg)?;

        let paths: Vec<_> = result
            .folders
            .iter()
            .map(|f| f.display_path.as_str())
            .collect();
        assert_eq!(paths, vec!["docs", "src", "src/core"]);
        Ok(())
    }

    #[test]
    fn respects_ignore_paths_and_globs() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();

        fs::create_dir_all(root.join("src"))?;
        fs::create_dir_all(root.join("skipme/deep"))?;
        fs::create_dir_all(root.join("cache-dir"))?;

        let mut config = build_config();
        config.ignore.paths.push("skipme/".into());
        config.ignore.globs.push("cache-*".into());

        let scanner_cfg = ScannerConfig::from_root(root.to_path_buf(), config);
        let result = Scanner::new().scan(&scanner_cfg)?;

        let paths: Vec<_> = result
            .folders
            .iter()
            .map(|f| f.display_path.clone())
            .collect();

        assert!(paths.contains(&"src".to_string()));
        assert!(!paths.iter().any(|p| p.contains("skipme")));
        assert!(!paths.iter().any(|p| p.contains("cache-dir")));
        Ok(())
    }

    #[test]
    fn respects_stepcountignore() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();

        fs::create_dir_all(root.join("generated"))?;
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join(STEPCOUNT_IGNORE), "generated/\n# a comment\n\n")?;

        let scanner_cfg = ScannerConfig::from_root(root.to_path_buf(), build_config());
        let result = Scanner::new().scan(&scanner_cfg)?;

        let paths: Vec<_> = result
            .folders
            .iter()
            .map(|f| f.display_path.as_str())
            .collect();

        assert!(paths.contains(&"src"));
        assert!(!paths.iter().any(|p| p.starts_with("generated")));
        Ok(())
    }

    #[test]
    fn hidden_directories_follow_config() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join(".internal"))?;
        fs::create_dir_all(root.join("visible"))?;

        let scanner_cfg = ScannerConfig::from_root(root.to_path_buf(), build_config());
        let result = Scanner::new().scan(&scanner_cfg)?;
        assert!(
            !result
                .folders
                .iter()
                .any(|f| f.display_path.starts_with(".internal"))
        );

        let mut config = build_config();
        config.defaults.show_hidden = true;
        let scanner_cfg = ScannerConfig::from_root(root.to_path_buf(), config);
        let result = Scanner::new().scan(&scanner_cfg)?;
        assert!(
            result
                .folders
                .iter()
                .any(|f| f.display_path.starts_with(".internal"))
        );
        Ok(())
    }
}
