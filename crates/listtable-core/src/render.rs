//! Grid renderer: resolves spans into final cells
//!
//! Rows are walked with two cursors: the logical column in the resolved
//! grid and the pointer into the cells the author actually wrote. Slots
//! covered by an earlier span advance the logical column and swallow a
//! placeholder when one is there.

use crate::cell::Cell;
use crate::content::ContentNode;
use crate::occupancy::OccupiedSet;
use crate::section::SectionKind;
use serde::{Deserialize, Serialize};

/// Element kind of a resolved cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Header cell (`th`)
    Header,
    /// Data cell (`td`)
    Data,
}

/// Direction a header cell applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Heads the cells below it
    Col,
    /// Heads the cells to its right
    Row,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Col => write!(f, "col"),
            Scope::Row => write!(f, "row"),
        }
    }
}

/// A cell placed in the resolved grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCell {
    /// Cell content, marker removed
    pub content: Vec<ContentNode>,
    /// Absolute row index
    pub row: usize,
    /// Logical column index
    pub col: usize,
    /// Row span, absent when 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<usize>,
    /// Column span, absent when 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<usize>,
    /// Header or data cell
    pub kind: CellKind,
    /// Scope of a header cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

impl ResolvedCell {
    /// Row span, 1 when absent
    pub fn rows_spanned(&self) -> usize {
        self.row_span.unwrap_or(1)
    }

    /// Column span, 1 when absent
    pub fn cols_spanned(&self) -> usize {
        self.col_span.unwrap_or(1)
    }

    /// Check if this is a header cell
    pub fn is_header(&self) -> bool {
        self.kind == CellKind::Header
    }

    /// Plain text of the content
    pub fn text(&self) -> String {
        crate::content::text_content(&self.content)
    }
}

/// A rendered row: only the cells that anchor in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRow {
    /// Absolute row index
    pub index: usize,
    /// Cells in emission order
    pub cells: Vec<ResolvedCell>,
}

/// Render one section
///
/// `start_row` is the absolute index of `rows[0]`. The occupied set is
/// shared with the other sections of the same table so spans can cross
/// section boundaries.
pub fn render_section(
    rows: &[Vec<Cell>],
    start_row: usize,
    section: SectionKind,
    occupied: &mut OccupiedSet,
    header_columns: usize,
) -> Vec<ResolvedRow> {
    rows.iter()
        .enumerate()
        .map(|(offset, row)| {
            render_row(row, start_row + offset, section, occupied, header_columns)
        })
        .collect()
}

fn render_row(
    row: &[Cell],
    row_index: usize,
    section: SectionKind,
    occupied: &mut OccupiedSet,
    header_columns: usize,
) -> ResolvedRow {
    let mut cells = Vec::new();
    let mut logical_col = 0usize;
    let mut ptr = 0usize;

    while ptr < row.len() {
        if occupied.contains(row_index, logical_col) {
            if row[ptr].is_placeholder {
                ptr += 1;
                logical_col = logical_col.saturating_add(1);
            } else {
                // A real cell where a span landed: it waits for the next free slot
                logical_col = occupied.next_free_col(row_index, logical_col);
            }
            continue;
        }

        let cell = &row[ptr];
        ptr += 1;

        if cell.is_placeholder {
            logical_col = logical_col.saturating_add(1);
            continue;
        }

        let row_span = cell.effective_row_span();
        let col_span = cell.effective_col_span();

        let is_header_row = section.is_header();
        let is_header_col = logical_col < header_columns;
        let kind = if is_header_row || is_header_col {
            CellKind::Header
        } else {
            CellKind::Data
        };

        // Column scope first; a header column overrides it
        let mut scope = None;
        if is_header_row {
            scope = Some(Scope::Col);
        }
        if is_header_col {
            scope = Some(Scope::Row);
        }

        occupied.cover(row_index, logical_col, row_span, col_span);

        cells.push(ResolvedCell {
            content: cell.content.clone(),
            row: row_index,
            col: logical_col,
            row_span: (row_span > 1).then_some(row_span),
            col_span: (col_span > 1).then_some(col_span),
            kind,
            scope,
        });

        logical_col = logical_col.saturating_add(col_span);

        if col_span > 1 {
            let trailing = row[ptr..]
                .iter()
                .take(col_span - 1)
                .take_while(|next| next.is_placeholder)
                .count();
            ptr += trailing;
        }
    }

    ResolvedRow {
        index: row_index,
        cells,
    }
}
