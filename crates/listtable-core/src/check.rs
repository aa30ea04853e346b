//! Batch checking of every list table under a set of roots

use crate::error::{Error, Result};
use crate::grid::build_grid;
use crate::scanner::{load_document, scan_directory, TableBlock};
use crate::section::partition;
use crate::validate::{validate_grid, Diagnostic, DiagnosticKind, ValidationMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Findings for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    /// 1-based line of the table in its file
    pub line: usize,
    /// Number of author rows
    pub rows: usize,
    /// Problems found
    pub diagnostics: Vec<Diagnostic>,
}

impl TableReport {
    /// Number of error diagnostics
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Findings for one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Problems with the file itself, such as it being unreadable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    pub tables: Vec<TableReport>,
}

impl FileReport {
    /// Number of error diagnostics, file-level and per table
    pub fn error_count(&self) -> usize {
        let own = self.diagnostics.iter().filter(|d| d.is_error()).count();
        own + self.tables.iter().map(TableReport::error_count).sum::<usize>()
    }
}

/// Findings for a whole check run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// When the check ran
    pub generated_at: DateTime<Utc>,
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// One entry per scanned file
    pub files: Vec<FileReport>,
}

impl CheckReport {
    /// Total number of error diagnostics
    pub fn error_count(&self) -> usize {
        self.files.iter().map(FileReport::error_count).sum()
    }

    /// Total number of tables checked
    pub fn table_count(&self) -> usize {
        self.files.iter().map(|f| f.tables.len()).sum()
    }

    /// Check if no errors were found
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// Save the report as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Validate one table block, turning blocking failures into diagnostics
///
/// `Off` is only honoured when passed explicitly as `mode_override`; a
/// table that turns validation off in its own options is still checked in
/// warn mode so the scan sees its problems.
pub fn check_table(block: &TableBlock, mode_override: Option<ValidationMode>) -> TableReport {
    let mode = match mode_override {
        Some(mode) => mode,
        None if block.options.validation == ValidationMode::Off => ValidationMode::Warn,
        None => block.options.validation,
    };

    let grid = match build_grid(&block.content) {
        Ok(grid) => grid,
        Err(err) => {
            return TableReport {
                line: block.line,
                rows: 0,
                diagnostics: vec![Diagnostic::error(DiagnosticKind::Structure, err.to_string())],
            }
        }
    };

    let mut diagnostics = validate_grid(&grid, mode).diagnostics;

    if let Err(err @ Error::Bounds { .. }) = partition(
        grid.row_count(),
        block.options.header_rows,
        block.options.footer_rows,
    ) {
        diagnostics.push(Diagnostic::error(DiagnosticKind::Bounds, err.to_string()));
    }

    TableReport {
        line: block.line,
        rows: grid.row_count(),
        diagnostics,
    }
}

/// Check every table in every Markdown file under `roots`
///
/// A file that cannot be loaded is reported with a file-level diagnostic
/// and the scan carries on.
pub fn check_documents<P: AsRef<Path>>(
    roots: &[P],
    mode_override: Option<ValidationMode>,
) -> Result<CheckReport> {
    let scan = scan_directory(roots)?;
    let mut files = Vec::new();

    for path in &scan.files {
        let report = match load_document(path) {
            Ok(document) => FileReport {
                path: document.path,
                diagnostics: Vec::new(),
                tables: document
                    .tables
                    .iter()
                    .map(|block| check_table(block, mode_override))
                    .collect(),
            },
            Err(err) => {
                log::warn!("skipping '{}': {}", path.display(), err);
                FileReport {
                    path: path.clone(),
                    diagnostics: vec![Diagnostic::error(DiagnosticKind::Unreadable, err.to_string())],
                    tables: Vec::new(),
                }
            }
        };
        files.push(report);
    }

    Ok(CheckReport {
        generated_at: Utc::now(),
        roots: scan.roots,
        files,
    })
}
