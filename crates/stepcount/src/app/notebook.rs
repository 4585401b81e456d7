//! Notebook document parsing.

use serde::Deserialize;

use crate::app::classify::count_logical_lines;

const CODE_CELL: &str = "code";

/// A notebook document: an ordered sequence of typed cells, each holding an
/// ordered list of source lines. Only code cells contribute to counting.
#[derive(Debug, Clone, Deserialize)]
pub struct NotebookDocument {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Clone, Deserialize)]
struct Cell {
    #[serde(default)]
    cell_type: String,
    #[serde(default)]
    source: Vec<String>,
}

impl NotebookDocument {
    /// Parse a notebook from raw JSON text. Missing `cells`, `cell_type`, or
    /// `source` fields default to empty; type mismatches are malformed.
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Sum logical steps across the source lines of every code cell.
    pub fn count_logical_steps(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.cell_type == CODE_CELL)
            .map(|cell| count_logical_lines(cell.source.iter().map(String::as_str)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_code_cells() {
        let raw = r##"{
            "cells": [
                {"cell_type": "markdown", "source": ["x = 5\n", "y = 6\n"]},
                {"cell_type": "code", "source": ["import os\n", "x = 5\n", "foo(x)\n"]},
                {"cell_type": "code", "source": ["# comment only\n", "\n"]}
            ],
            "nbformat": 4
        }"##;
        let notebook = NotebookDocument::parse(raw).unwrap();
        assert_eq!(notebook.count_logical_steps(), 2);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let notebook = NotebookDocument::parse("{}").unwrap();
        assert_eq!(notebook.count_logical_steps(), 0);

        let notebook = NotebookDocument::parse(r#"{"cells": [{}, {"cell_type": "code"}]}"#).unwrap();
        assert_eq!(notebook.count_logical_steps(), 0);
    }

    #[test]
    fn type_mismatches_are_malformed() {
        assert!(NotebookDocument::parse("[1, 2, 3]").is_err());
        assert!(NotebookDocument::parse(r#"{"cells": [{"cell_type": "code", "source": "x = 5"}]}"#).is_err());
        assert!(NotebookDocument::parse("not json at all").is_err());
    }
}
