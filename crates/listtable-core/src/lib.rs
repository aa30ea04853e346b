//! listtable-core: Core library for turning nested lists into tables
//!
//! This library provides functionality to:
//! - Read author content from Markdown, CSV or JSON into a content tree
//! - Build a grid of cells, reading `[rNcM]` span markers and `_` placeholders
//! - Validate the grid structure with strict, warn or off handling
//! - Split rows into header, body and footer sections
//! - Resolve spans into a table ready for presentation
//! - Scan directories of Markdown documents and check every table in them

pub mod cell;
pub mod check;
pub mod content;
pub mod error;
pub mod grid;
pub mod occupancy;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod section;
pub mod table;
pub mod validate;

pub use cell::{annotate_cell, parse_span_marker, Cell, SpanMarker};
pub use check::{check_documents, check_table, CheckReport, FileReport, TableReport};
pub use content::{text_content, ContentNode};
pub use error::{Error, Result};
pub use grid::{build_grid, Grid};
pub use occupancy::OccupiedSet;
pub use parser::{parse_csv, parse_csv_str, parse_json_str, parse_markdown};
pub use render::{render_section, CellKind, ResolvedCell, ResolvedRow, Scope};
pub use scanner::{extract_blocks, load_document, scan_directory, Document, ScanResult, TableBlock};
pub use section::{partition, SectionKind, Sections};
pub use table::{
    build_table, resolve_grid, try_build_table, ErrorReport, ReportEntry, ResolvedTable,
    TableOptions, TableOutput, MAX_SLOT_COLUMNS,
};
pub use validate::{
    validate_grid, Diagnostic, DiagnosticKind, Severity, ValidationMode, ValidationReport,
};
