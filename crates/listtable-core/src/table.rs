//! Table building: the full pipeline from content to resolved sections

use crate::content::ContentNode;
use crate::error::{Error, Result};
use crate::grid::{build_grid, Grid};
use crate::occupancy::OccupiedSet;
use crate::render::{render_section, ResolvedCell, ResolvedRow};
use crate::section::{partition, SectionKind};
use crate::validate::{validate_grid, Severity, ValidationMode};
use serde::{Deserialize, Serialize};

/// Widest slot grid `to_slot_grid` will build
pub const MAX_SLOT_COLUMNS: usize = 1 << 14;

/// Options controlling how a table is built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    /// Rows rendered as the header section
    pub header_rows: usize,
    /// Leading logical columns rendered as row headers
    pub header_columns: usize,
    /// Rows rendered as the footer section
    pub footer_rows: usize,
    /// Optional caption content
    pub caption: Option<Vec<ContentNode>>,
    /// How structural problems are handled
    pub validation: ValidationMode,
    /// Extra class name passed through to the presentation layer
    pub class_name: Option<String>,
}

impl TableOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header row count
    pub fn with_header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    /// Set the header column count
    pub fn with_header_columns(mut self, columns: usize) -> Self {
        self.header_columns = columns;
        self
    }

    /// Set the footer row count
    pub fn with_footer_rows(mut self, rows: usize) -> Self {
        self.footer_rows = rows;
        self
    }

    /// Set a plain-text caption
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(vec![ContentNode::text(caption)]);
        self
    }

    /// Set the validation mode
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    /// Set the class name
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

/// A fully resolved table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Vec<ContentNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Header rows, absent when there are none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<ResolvedRow>>,
    /// Body rows
    pub body: Vec<ResolvedRow>,
    /// Footer rows, absent when there are none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Vec<ResolvedRow>>,
    /// Cell count of the widest author row
    #[serde(default)]
    pub source_width: usize,
}

impl ResolvedTable {
    /// All rows in render order: header, body, footer
    pub fn rows(&self) -> impl Iterator<Item = &ResolvedRow> {
        self.header
            .iter()
            .flatten()
            .chain(self.body.iter())
            .chain(self.footer.iter().flatten())
    }

    /// Rows of one section
    pub fn section(&self, kind: SectionKind) -> &[ResolvedRow] {
        match kind {
            SectionKind::Header => self.header.as_deref().unwrap_or(&[]),
            SectionKind::Body => &self.body,
            SectionKind::Footer => self.footer.as_deref().unwrap_or(&[]),
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Number of logical columns, the right edge of the widest row
    pub fn column_count(&self) -> usize {
        self.rows()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.col.saturating_add(c.cols_spanned()))
            .max()
            .unwrap_or(0)
    }

    /// Find the cell anchored at a logical position
    pub fn find_cell(&self, row: usize, col: usize) -> Option<&ResolvedCell> {
        self.rows()
            .find(|r| r.index == row)
            .and_then(|r| r.cells.iter().find(|c| c.col == col))
    }

    /// Expand spans into a dense grid of logical slots
    ///
    /// Each anchor appears once at its own slot; slots it covers are `None`.
    /// The grid is as wide as the widest author row or the rightmost anchor,
    /// whichever is further, so cells pushed right by a missing placeholder
    /// keep their place. Spans reaching past that edge are clipped.
    pub fn to_slot_grid(&self) -> Result<Vec<Vec<Option<&ResolvedCell>>>> {
        let width = self
            .rows()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.col.saturating_add(1))
            .fold(self.source_width, usize::max);

        if width > MAX_SLOT_COLUMNS {
            return Err(Error::SlotGridTooWide {
                width,
                limit: MAX_SLOT_COLUMNS,
            });
        }

        let mut grid: Vec<Vec<Option<&ResolvedCell>>> = vec![vec![None; width]; self.row_count()];
        for cell in self.rows().flat_map(|r| r.cells.iter()) {
            if let Some(slot) = grid.get_mut(cell.row).and_then(|r| r.get_mut(cell.col)) {
                *slot = Some(cell);
            }
        }
        Ok(grid)
    }
}

/// One line of an error report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(row) = self.row {
            write!(f, "Row {}", row)?;
            if let Some(col) = self.col {
                write!(f, ", Col {}", col)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}", self.message)
    }
}

/// What is shown instead of a table that could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub title: String,
    pub entries: Vec<ReportEntry>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        match err {
            Error::Invalid(report) => ErrorReport {
                title: "Table Validation Errors".to_string(),
                entries: report
                    .diagnostics
                    .iter()
                    .map(|d| ReportEntry {
                        severity: d.severity,
                        row: d.row,
                        col: d.col,
                        message: d.message.clone(),
                    })
                    .collect(),
            },
            other => ErrorReport {
                title: "Table Error".to_string(),
                entries: vec![ReportEntry {
                    severity: Severity::Error,
                    row: None,
                    col: None,
                    message: other.to_string(),
                }],
            },
        }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.title)?;
        for entry in &self.entries {
            writeln!(f, "  - {}", entry)?;
        }
        Ok(())
    }
}

/// Result of building a table, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableOutput {
    Table(ResolvedTable),
    Error(ErrorReport),
}

impl TableOutput {
    /// The table, if one was built
    pub fn table(&self) -> Option<&ResolvedTable> {
        match self {
            TableOutput::Table(table) => Some(table),
            TableOutput::Error(_) => None,
        }
    }

    /// The error report, if the table was replaced by one
    pub fn error_report(&self) -> Option<&ErrorReport> {
        match self {
            TableOutput::Table(_) => None,
            TableOutput::Error(report) => Some(report),
        }
    }
}

/// Build a table, reporting every failure as an error report
pub fn build_table(content: &[ContentNode], options: &TableOptions) -> TableOutput {
    match try_build_table(content, options) {
        Ok(table) => TableOutput::Table(table),
        Err(err) => TableOutput::Error(ErrorReport::from(&err)),
    }
}

/// Build a table, returning the first blocking failure as an error
pub fn try_build_table(content: &[ContentNode], options: &TableOptions) -> Result<ResolvedTable> {
    let grid = build_grid(content)?;
    resolve_grid(&grid, options)
}

/// Validate, partition and render an already built grid
pub fn resolve_grid(grid: &Grid, options: &TableOptions) -> Result<ResolvedTable> {
    let report = validate_grid(grid, options.validation);

    if !report.is_valid && options.validation == ValidationMode::Strict {
        return Err(Error::Invalid(report));
    }

    if options.validation == ValidationMode::Warn {
        for d in &report.diagnostics {
            match d.row {
                Some(row) => {
                    log::warn!(target: "listtable", "{}: {} Row {}", d.severity, d.message, row)
                }
                None => log::warn!(target: "listtable", "{}: {}", d.severity, d.message),
            }
        }
    }

    let sections = partition(grid.row_count(), options.header_rows, options.footer_rows)?;

    let mut occupied = OccupiedSet::new();
    let mut header = None;
    let mut body = Vec::new();
    let mut footer = None;

    for (kind, range) in sections.in_order() {
        let start = range.start;
        let rows = render_section(
            &grid.rows[range],
            start,
            kind,
            &mut occupied,
            options.header_columns,
        );
        match kind {
            SectionKind::Header if options.header_rows > 0 => header = Some(rows),
            SectionKind::Body => body = rows,
            SectionKind::Footer if options.footer_rows > 0 => footer = Some(rows),
            _ => {}
        }
    }

    Ok(ResolvedTable {
        caption: options.caption.clone(),
        class_name: options.class_name.clone(),
        header,
        body,
        footer,
        source_width: grid.rows.iter().map(Vec::len).max().unwrap_or(0),
    })
}
