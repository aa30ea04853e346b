//! Coordinates covered by spans
//!
//! Validation and rendering each build their own set, but both mark and
//! query it through this type so they cannot disagree on what a span covers.

/// A rectangle claimed by a spanning cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    row: usize,
    col: usize,
    row_end: usize,
    col_end: usize,
}

impl Region {
    fn covers(&self, row: usize, col: usize) -> bool {
        // The anchor itself is never covered
        (self.row..self.row_end).contains(&row)
            && (self.col..self.col_end).contains(&col)
            && !(row == self.row && col == self.col)
    }
}

/// Set of `(row, col)` slots covered by a span anchored elsewhere
///
/// Spans are kept as rectangles, so an oversized span costs no more than a
/// small one.
#[derive(Debug, Clone, Default)]
pub struct OccupiedSet {
    regions: Vec<Region>,
}

impl OccupiedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every slot of a `row_span` x `col_span` region except its anchor
    pub fn cover(&mut self, row: usize, col: usize, row_span: usize, col_span: usize) {
        if row_span <= 1 && col_span <= 1 {
            return;
        }
        self.regions.push(Region {
            row,
            col,
            row_end: row.saturating_add(row_span),
            col_end: col.saturating_add(col_span),
        });
    }

    /// Check if a slot is covered
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.regions.iter().any(|r| r.covers(row, col))
    }

    /// First column at or after `col` in `row` that is not covered
    pub fn next_free_col(&self, row: usize, mut col: usize) -> usize {
        while let Some(region) = self.regions.iter().find(|r| r.covers(row, col)) {
            col = region.col_end;
        }
        col
    }

    /// Check if nothing is covered
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_excludes_anchor() {
        let mut set = OccupiedSet::new();
        set.cover(0, 0, 2, 2);
        assert!(!set.contains(0, 0));
        assert!(set.contains(0, 1));
        assert!(set.contains(1, 0));
        assert!(set.contains(1, 1));
        assert!(!set.contains(2, 0));
        assert!(!set.contains(0, 2));
    }

    #[test]
    fn test_single_slot_covers_nothing() {
        let mut set = OccupiedSet::new();
        set.cover(3, 3, 1, 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_huge_span_is_cheap() {
        let mut set = OccupiedSet::new();
        set.cover(0, 1, usize::MAX, 1);
        assert!(set.contains(1_000_000, 1));
        assert!(!set.contains(1_000_000, 2));
    }

    #[test]
    fn test_next_free_col_skips_adjacent_regions() {
        let mut set = OccupiedSet::new();
        set.cover(0, 0, 2, 2);
        set.cover(0, 2, 2, 3);
        assert_eq!(set.next_free_col(1, 0), 5);
        assert_eq!(set.next_free_col(1, 7), 7);
        assert_eq!(set.next_free_col(0, 1), 2);
    }
}
