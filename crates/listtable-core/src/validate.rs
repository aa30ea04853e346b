//! Structural validation of an author grid
//!
//! Checks row widths, span values, span overflow, placeholder counts and
//! orphaned placeholders. Validation never changes the grid; rendering
//! goes ahead with coerced spans whatever is reported here, unless the
//! caller is in strict mode.

use crate::grid::Grid;
use crate::occupancy::OccupiedSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How structural problems are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Replace the table with an error report when anything is wrong
    Strict,
    /// Log every problem and render anyway
    #[default]
    Warn,
    /// Skip validation entirely
    Off,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "warn" => Ok(ValidationMode::Warn),
            "off" => Ok(ValidationMode::Off),
            other => Err(format!(
                "unknown validation mode '{}', expected strict, warn or off",
                other
            )),
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationMode::Strict => write!(f, "strict"),
            ValidationMode::Warn => write!(f, "warn"),
            ValidationMode::Off => write!(f, "off"),
        }
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported but never blocks rendering
    Warning,
    /// Makes the table invalid
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Kind of structural problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// Row cell count differs from the first row
    InconsistentWidth,
    /// Row span is zero or negative
    InvalidRowSpan,
    /// Column span is zero or negative
    InvalidColSpan,
    /// Row span reaches past the last row
    RowSpanOverflow,
    /// Column span reaches past the end of its row
    ColSpanOverflow,
    /// Too few placeholders after a column span
    MissingColSpanPlaceholders,
    /// Too few placeholders below a row span
    MissingRowSpanPlaceholders,
    /// Placeholder not covered by any span
    OrphanedPlaceholder,
    /// Content was not a list of rows
    Structure,
    /// Header and footer rows exceed the table
    Bounds,
    /// The document holding the table could not be loaded
    Unreadable,
}

/// A single structural problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Kind of issue
    pub kind: DiagnosticKind,
    /// Human-readable message
    pub message: String,
    /// Row index, when the problem belongs to a row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Source cell index within the row, when the problem belongs to a cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            row: None,
            col: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    /// Attach a row index
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Attach a cell position
    pub fn at(mut self, row: usize, col: usize) -> Self {
        self.row = Some(row);
        self.col = Some(col);
        self
    }

    /// Check if this diagnostic makes the table invalid
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Location prefix such as `Row 1, Col 2: `, empty when unknown
    pub fn location(&self) -> String {
        match (self.row, self.col) {
            (Some(row), Some(col)) => format!("Row {}, Col {}: ", row, col),
            (Some(row), None) => format!("Row {}: ", row),
            _ => String::new(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.location(), self.message)
    }
}

/// Outcome of validating a grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when no diagnostic is an error
    pub is_valid: bool,
    /// Every problem found, in detection order
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            is_valid: !diagnostics.iter().any(Diagnostic::is_error),
            diagnostics,
        }
    }

    /// Number of error diagnostics
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Number of warning diagnostics
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Validate the structure of a grid
pub fn validate_grid(grid: &Grid, mode: ValidationMode) -> ValidationReport {
    if mode == ValidationMode::Off {
        return ValidationReport::from_diagnostics(Vec::new());
    }

    let mut diagnostics = Vec::new();
    let mut occupied = OccupiedSet::new();
    let total_rows = grid.row_count();
    let expected_cols = grid.expected_width();

    for (r, row) in grid.rows.iter().enumerate() {
        if row.len() != expected_cols {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::InconsistentWidth,
                    format!(
                        "Row has inconsistent width. Expected {} cells, found {}.",
                        expected_cols,
                        row.len()
                    ),
                )
                .at_row(r),
            );
        }

        for (c, cell) in row.iter().enumerate() {
            if cell.row_span <= 0 {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::InvalidRowSpan,
                        format!(
                            "Invalid rowSpan value: {}. Must be a positive integer.",
                            cell.row_span
                        ),
                    )
                    .at(r, c),
                );
            }
            if cell.col_span <= 0 {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::InvalidColSpan,
                        format!(
                            "Invalid colSpan value: {}. Must be a positive integer.",
                            cell.col_span
                        ),
                    )
                    .at(r, c),
                );
            }

            // Placeholders are only checked by the orphan pass below
            if cell.is_placeholder {
                continue;
            }

            let row_span = cell.effective_row_span();
            let col_span = cell.effective_col_span();
            let span_end_row = r.saturating_add(row_span);

            if row_span > 1 && span_end_row > total_rows {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::RowSpanOverflow,
                        format!(
                            "Cell rowSpan ({}) extends beyond table bounds. Table has {} rows (0-{}), but span reaches row {}.",
                            cell.row_span,
                            total_rows,
                            total_rows - 1,
                            span_end_row - 1
                        ),
                    )
                    .at(r, c),
                );
            }

            if col_span > 1 {
                let remaining = row.len() - c;
                if col_span > remaining {
                    diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::ColSpanOverflow,
                            format!(
                                "Cell colSpan ({}) extends beyond row bounds. Row has {} remaining cells (including this one), but colSpan requires {}.",
                                cell.col_span, remaining, col_span
                            ),
                        )
                        .at(r, c),
                    );
                } else {
                    let found = row[c + 1..c + col_span]
                        .iter()
                        .filter(|next| next.is_placeholder)
                        .count();
                    if found < col_span - 1 {
                        diagnostics.push(
                            Diagnostic::error(
                                DiagnosticKind::MissingColSpanPlaceholders,
                                format!(
                                    "Cell colSpan ({}) doesn't have enough placeholders. Expected {} placeholders after this cell, found {}.",
                                    cell.col_span,
                                    col_span - 1,
                                    found
                                ),
                            )
                            .at(r, c),
                        );
                    }
                }
            }

            if row_span > 1 {
                let last_row = span_end_row.min(total_rows);
                let found = grid.rows[r + 1..last_row]
                    .iter()
                    .filter(|below| below.get(c).is_some_and(|cell| cell.is_placeholder))
                    .count();
                if found < row_span - 1 {
                    diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::MissingRowSpanPlaceholders,
                            format!(
                                "Cell rowSpan ({}) doesn't have enough placeholders. Expected {} placeholders in following rows at column {}, found {}.",
                                cell.row_span,
                                row_span - 1,
                                c,
                                found
                            ),
                        )
                        .at(r, c),
                    );
                }
            }

            occupied.cover(r, c, row_span, col_span);
        }
    }

    // Spans may be anchored in any earlier row, so orphans are checked last
    for (r, row) in grid.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_placeholder && !occupied.contains(r, c) {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::OrphanedPlaceholder,
                        "Placeholder found that doesn't belong to a rowSpan or colSpan.",
                    )
                    .at(r, c),
                );
            }
        }
    }

    ValidationReport::from_diagnostics(diagnostics)
}
