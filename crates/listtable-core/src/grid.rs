//! Grid builder: nested lists to rows of annotated cells

use crate::cell::{annotate_cell, Cell};
use crate::content::ContentNode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Author rows in author order, before any span resolution
///
/// Rows keep exactly the number of cells the author wrote; nothing is padded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Cells of each row
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create a grid from rows of cells
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width every row is measured against: the first row's cell count
    pub fn expected_width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Get a cell by row and source index
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Check if the grid has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the grid from the content given to a table
///
/// The content must be exactly one list whose items each hold a nested
/// list of cells. Whitespace between nodes is ignored. Rows without a
/// nested list are dropped.
pub fn build_grid(content: &[ContentNode]) -> Result<Grid> {
    let significant: Vec<&ContentNode> = content.iter().filter(|n| !n.is_blank_text()).collect();

    let outer = match significant.as_slice() {
        [node] if node.is_list() => *node,
        _ => {
            return Err(Error::structure(
                "table content must be a single Markdown list",
                describe_shape(&significant),
            ))
        }
    };

    let mut rows = Vec::new();
    for (index, row_item) in outer.children().iter().enumerate() {
        if !row_item.is_item() {
            log::debug!("skipping non-item node '{}' in row list", row_item.kind_name());
            continue;
        }

        let Some(cell_list) = row_item.children().iter().find(|c| c.is_list()) else {
            log::debug!("dropping row item {} without a nested cell list", index);
            continue;
        };

        let cells: Vec<Cell> = cell_list
            .children()
            .iter()
            .filter(|c| c.is_item())
            .map(|c| annotate_cell(c.children()))
            .collect();
        rows.push(cells);
    }

    Ok(Grid::new(rows))
}

fn describe_shape(nodes: &[&ContentNode]) -> String {
    match nodes {
        [] => "no content".to_string(),
        [node] => format!("a single {} node", node.kind_name()),
        _ => {
            let kinds: Vec<&str> = nodes.iter().map(|n| n.kind_name()).collect();
            format!("{} nodes: {}", nodes.len(), kinds.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(rows: &[&[&str]]) -> ContentNode {
        ContentNode::list(
            rows.iter()
                .map(|row| {
                    ContentNode::item(vec![ContentNode::list(
                        row.iter()
                            .map(|cell| ContentNode::item(vec![ContentNode::text(*cell)]))
                            .collect(),
                    )])
                })
                .collect(),
        )
    }

    #[test]
    fn test_build_simple_grid() {
        let grid = build_grid(&[rows_of(&[&["A", "B"], &["C", "D"]])]).unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.expected_width(), 2);
        assert_eq!(grid.get(1, 0).unwrap().content, vec![ContentNode::text("C")]);
    }

    #[test]
    fn test_build_preserves_ragged_rows() {
        let grid = build_grid(&[rows_of(&[&["A", "B", "C"], &["D"]])]).unwrap();
        assert_eq!(grid.rows[0].len(), 3);
        assert_eq!(grid.rows[1].len(), 1);
    }

    #[test]
    fn test_build_annotates_cells() {
        let grid = build_grid(&[rows_of(&[&["[r2] X", "Y"], &["_", "Z"]])]).unwrap();
        assert_eq!(grid.rows[0][0].row_span, 2);
        assert!(grid.rows[1][0].is_placeholder);
    }

    #[test]
    fn test_build_skips_whitespace_and_stray_nodes() {
        let outer = ContentNode::list(vec![
            ContentNode::text("\n"),
            ContentNode::item(vec![
                ContentNode::text("Row label"),
                ContentNode::list(vec![
                    ContentNode::item(vec![ContentNode::text("A")]),
                    ContentNode::text("\n"),
                    ContentNode::item(vec![ContentNode::text("B")]),
                ]),
            ]),
        ]);
        let grid = build_grid(&[ContentNode::text("\n"), outer, ContentNode::text("  ")]).unwrap();
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.rows[0].len(), 2);
    }

    #[test]
    fn test_build_drops_row_without_cell_list() {
        let outer = ContentNode::list(vec![
            ContentNode::item(vec![ContentNode::text("no cells here")]),
            ContentNode::item(vec![ContentNode::list(vec![ContentNode::item(vec![
                ContentNode::text("A"),
            ])])]),
        ]);
        let grid = build_grid(&[outer]).unwrap();
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn test_build_rejects_non_list() {
        let err = build_grid(&[ContentNode::text("just text")]).unwrap_err();
        match err {
            Error::Structure { observed, .. } => assert_eq!(observed, "a single text node"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_rejects_multiple_lists() {
        let err = build_grid(&[rows_of(&[&["A"]]), rows_of(&[&["B"]])]).unwrap_err();
        match err {
            Error::Structure { observed, .. } => assert_eq!(observed, "2 nodes: list, list"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_rejects_empty_content() {
        assert!(matches!(build_grid(&[]), Err(Error::Structure { .. })));
    }
}
