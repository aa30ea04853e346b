//! Property-based tests for grid resolution.

use proptest::prelude::*;

use listtable_core::{
    build_grid, try_build_table, validate_grid, ContentNode, DiagnosticKind, TableOptions,
    ValidationMode,
};

// ============================================================================
// Strategies
// ============================================================================

/// Plain cell text: never a placeholder, never a marker.
fn plain_cell() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// Any cell an author might write, valid or not.
fn any_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("_".to_string()),
        "[a-z]{1,4}",
        "\\[r-?[0-9]c-?[0-9]\\] [a-z]{1,3}",
        "\\[r[0-9]\\] [a-z]{1,3}",
        "\\[c[0-9]\\] [a-z]{1,3}",
    ]
}

fn rectangular_grid() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..6, 1usize..6)
        .prop_flat_map(|(rows, cols)| prop::collection::vec(prop::collection::vec(plain_cell(), cols), rows))
}

fn ragged_grid() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(any_cell(), 0..5), 0..5)
}

fn content(rows: &[Vec<String>]) -> Vec<ContentNode> {
    vec![ContentNode::list(
        rows.iter()
            .map(|row| {
                ContentNode::item(vec![ContentNode::list(
                    row.iter()
                        .map(|cell| ContentNode::item(vec![ContentNode::text(cell.as_str())]))
                        .collect(),
                )])
            })
            .collect(),
    )]
}

fn is_placeholder(cell: &str) -> bool {
    cell.trim() == "_"
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn rectangular_grid_keeps_its_shape(rows in rectangular_grid()) {
        let table = try_build_table(&content(&rows), &TableOptions::new()).unwrap();

        prop_assert_eq!(table.body.len(), rows.len());
        for (rendered, source) in table.body.iter().zip(&rows) {
            prop_assert_eq!(rendered.cells.len(), source.len());
            for (col, cell) in rendered.cells.iter().enumerate() {
                prop_assert_eq!(cell.col, col);
                prop_assert_eq!(&cell.text(), &source[col]);
            }
        }
    }

    #[test]
    fn placeholders_are_never_rendered(rows in ragged_grid()) {
        for mode in [ValidationMode::Off, ValidationMode::Warn] {
            let options = TableOptions::new().with_validation(mode);
            let table = try_build_table(&content(&rows), &options).unwrap();

            prop_assert_eq!(table.body.len(), rows.len());
            for (rendered, source) in table.body.iter().zip(&rows) {
                let real = source.iter().filter(|c| !is_placeholder(c)).count();
                prop_assert_eq!(rendered.cells.len(), real);
                prop_assert!(rendered.cells.iter().all(|c| !c.text().is_empty()));
            }
        }
    }

    #[test]
    fn rendering_is_idempotent(rows in ragged_grid()) {
        let options = TableOptions::new();
        let first = try_build_table(&content(&rows), &options).unwrap();
        let second = try_build_table(&content(&rows), &options).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn warn_and_strict_find_the_same_problems(rows in ragged_grid()) {
        let grid = build_grid(&content(&rows)).unwrap();
        let warn = validate_grid(&grid, ValidationMode::Warn);
        let strict = validate_grid(&grid, ValidationMode::Strict);
        prop_assert_eq!(warn, strict);
    }

    #[test]
    fn non_positive_spans_render_as_one(row_span in -3i64..=0, col_span in -3i64..=0) {
        let rows = vec![vec![format!("[r{}c{}] x", row_span, col_span)]];

        let grid = build_grid(&content(&rows)).unwrap();
        let report = validate_grid(&grid, ValidationMode::Warn);
        let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
        prop_assert_eq!(kinds, vec![DiagnosticKind::InvalidRowSpan, DiagnosticKind::InvalidColSpan]);

        let table = try_build_table(&content(&rows), &TableOptions::new()).unwrap();
        let cell = &table.body[0].cells[0];
        prop_assert_eq!(cell.row_span, None);
        prop_assert_eq!(cell.col_span, None);
    }

    #[test]
    fn covered_block_resolves_to_its_span(row_span in 1usize..5, col_span in 1usize..5) {
        let rows: Vec<Vec<String>> = (0..row_span)
            .map(|r| {
                (0..col_span)
                    .map(|c| {
                        if r == 0 && c == 0 {
                            format!("[r{}c{}] X", row_span, col_span)
                        } else {
                            "_".to_string()
                        }
                    })
                    .collect()
            })
            .collect();

        let options = TableOptions::new().with_validation(ValidationMode::Strict);
        let table = try_build_table(&content(&rows), &options).unwrap();

        let anchor = &table.body[0].cells[0];
        prop_assert_eq!(anchor.row_span, (row_span > 1).then_some(row_span));
        prop_assert_eq!(anchor.col_span, (col_span > 1).then_some(col_span));
        prop_assert_eq!(table.body[0].cells.len(), 1);
        prop_assert!(table.body[1..].iter().all(|r| r.cells.is_empty()));
    }
}
