//! End-to-end counting over a scanned directory tree.

use std::fs;
use std::path::Path;

use anyhow::Result;

use stepcount::app::count::StepCounter;
use stepcount::app::scan::{Scanner, ScannerConfig};
use stepcount::app::selection::Selector;
use stepcount::infra::config::Config;

fn write_fixture(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("src/core"))?;
    fs::create_dir_all(root.join("notebooks"))?;
    fs::create_dir_all(root.join("docs"))?;

    // 3 steps.
    fs::write(
        root.join("src/main.py"),
        "# entry\n\ndef main():\n    value = compute()\n    print(value)\n",
    )?;
    // 2 steps.
    fs::write(root.join("src/core/lib.c"), "int x = 1;\nreturn x;\n")?;
    // 2 steps in the single code cell; markdown cell ignored.
    fs::write(
        root.join("notebooks/analysis.ipynb"),
        r#"{
            "cells": [
                {"cell_type": "markdown", "source": ["a = b\n"]},
                {"cell_type": "code", "source": ["total = 0\n", "total += 1\n"]}
            ]
        }"#,
    )?;
    // Unsupported extension, never counted.
    fs::write(root.join("docs/guide.md"), "x = 5\ncall();\n")?;
    Ok(())
}

#[test]
fn scan_select_count_round_trip() -> Result<()> {
    let temp = tempfile::tempdir()?;
    write_fixture(temp.path())?;

    let scanner_cfg = ScannerConfig::from_root(temp.path().to_path_buf(), Config::default());
    let scan = Scanner::new().scan(&scanner_cfg)?;
    let display: Vec<_> = scan
        .folders
        .iter()
        .map(|f| f.display_path.as_str())
        .collect();
    assert_eq!(display, vec!["docs", "notebooks", "src", "src/core"]);

    let mut selector = Selector::new();
    for folder in &scan.folders {
        if folder.display_path != "docs" {
            selector.toggle(folder.path.clone());
        }
    }

    let counter = StepCounter::new();
    let report = counter.count_folders(&selector.checked_paths());

    // notebooks (2) + src (3 + 2) + src/core counted again (2) = 9.
    assert_eq!(report.folders.len(), 3);
    assert_eq!(report.total_steps, 9);
    Ok(())
}

#[test]
fn docs_only_selection_counts_nothing() -> Result<()> {
    let temp = tempfile::tempdir()?;
    write_fixture(temp.path())?;

    let counter = StepCounter::new();
    let report = counter.count_folders(&[temp.path().join("docs")]);
    assert_eq!(report.total_steps, 0);
    assert_eq!(report.total_files(), 0);
    Ok(())
}
