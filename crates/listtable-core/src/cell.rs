//! Cell annotation: span markers and placeholders
//!
//! An author writes `[r2c3] Text` at the head of a cell to make it span two
//! rows and three columns, and a lone `_` in every slot such a span covers.

use crate::content::ContentNode;
use serde::{Deserialize, Serialize};

/// One author-supplied cell, with its marker already extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Content with any span marker stripped
    pub content: Vec<ContentNode>,
    /// Declared row span, unvalidated
    pub row_span: i64,
    /// Declared column span, unvalidated
    pub col_span: i64,
    /// Whether the author wrote `_` for this slot
    pub is_placeholder: bool,
}

impl Cell {
    /// Create a plain cell spanning one slot
    pub fn new(content: Vec<ContentNode>) -> Self {
        Self {
            content,
            row_span: 1,
            col_span: 1,
            is_placeholder: false,
        }
    }

    /// Create a placeholder cell
    pub fn placeholder() -> Self {
        Self {
            content: vec![ContentNode::text("")],
            row_span: 1,
            col_span: 1,
            is_placeholder: true,
        }
    }

    /// Set the declared spans
    pub fn with_span(mut self, row_span: i64, col_span: i64) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    /// Row span used for layout: invalid values count as 1
    pub fn effective_row_span(&self) -> usize {
        effective_span(self.row_span)
    }

    /// Column span used for layout: invalid values count as 1
    pub fn effective_col_span(&self) -> usize {
        effective_span(self.col_span)
    }

    /// Whether this cell anchors a merged region
    pub fn is_spanning(&self) -> bool {
        !self.is_placeholder && (self.effective_row_span() > 1 || self.effective_col_span() > 1)
    }
}

fn effective_span(value: i64) -> usize {
    usize::try_from(value.max(1)).unwrap_or(usize::MAX)
}

/// A span marker found at the head of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanMarker {
    /// Value after `r`, if present
    pub row_span: Option<i64>,
    /// Value after `c`, if present
    pub col_span: Option<i64>,
    /// Byte length of the marker, brackets included
    pub len: usize,
}

/// Scan a `[ r<int> c<int> ]` marker anchored at the start of `text`
///
/// Both parts are optional, whitespace is allowed around them, and the
/// integers may be zero or negative so the validator can report them.
pub fn parse_span_marker(text: &str) -> Option<SpanMarker> {
    let mut scanner = Scanner::new(text);
    if !scanner.eat('[') {
        return None;
    }
    scanner.skip_whitespace();
    let row_span = scanner.tagged_int('r');
    scanner.skip_whitespace();
    let col_span = scanner.tagged_int('c');
    scanner.skip_whitespace();
    if !scanner.eat(']') {
        return None;
    }

    Some(SpanMarker {
        row_span,
        col_span,
        len: scanner.pos,
    })
}

/// Whether the text marks a placeholder slot
pub fn is_placeholder_text(text: &str) -> bool {
    text.trim() == "_"
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// `<tag>-?<digits>`, consuming nothing unless the whole group matches
    fn tagged_int(&mut self, tag: char) -> Option<i64> {
        let rest = self.rest().strip_prefix(tag)?;
        let (negative, digits_start) = match rest.strip_prefix('-') {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let digit_len = digits_start
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digit_len == 0 {
            return None;
        }

        let digits = &digits_start[..digit_len];
        let value = digits.bytes().fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });
        self.pos += tag.len_utf8() + usize::from(negative) + digit_len;
        Some(if negative { -value } else { value })
    }
}

/// Turn the content of one list item into a cell
///
/// Only the first content node is inspected. A placeholder takes precedence
/// over a span marker; text that looks bracketed but does not follow the
/// marker grammar stays ordinary content.
pub fn annotate_cell(children: &[ContentNode]) -> Cell {
    let mut content = children.to_vec();
    if content.is_empty() {
        return Cell::new(content);
    }
    let first = &mut content[0];

    let text_check = first.text_content();

    if is_placeholder_text(&text_check) {
        *first = ContentNode::text("");
        return Cell {
            content,
            row_span: 1,
            col_span: 1,
            is_placeholder: true,
        };
    }

    let Some(marker) = parse_span_marker(&text_check) else {
        return Cell::new(content);
    };

    // Only literal text can be stripped; other nodes keep the marker visible
    if let ContentNode::Text { value } = first {
        *value = value[marker.len..].trim().to_string();
    }

    Cell {
        content,
        row_span: marker.row_span.unwrap_or(1),
        col_span: marker.col_span.unwrap_or(1),
        is_placeholder: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_cell(s: &str) -> Cell {
        annotate_cell(&[ContentNode::text(s)])
    }

    #[test]
    fn test_marker_both_parts() {
        let marker = parse_span_marker("[r2c3] Merged").unwrap();
        assert_eq!(marker.row_span, Some(2));
        assert_eq!(marker.col_span, Some(3));
        assert_eq!(marker.len, 6);
    }

    #[test]
    fn test_marker_whitespace_and_missing_parts() {
        let marker = parse_span_marker("[ r2 ]x").unwrap();
        assert_eq!(marker.row_span, Some(2));
        assert_eq!(marker.col_span, None);

        let marker = parse_span_marker("[c4]").unwrap();
        assert_eq!(marker.row_span, None);
        assert_eq!(marker.col_span, Some(4));

        let marker = parse_span_marker("[]").unwrap();
        assert_eq!(marker.row_span, None);
        assert_eq!(marker.col_span, None);
    }

    #[test]
    fn test_marker_negative_and_zero() {
        let marker = parse_span_marker("[r0c-1]").unwrap();
        assert_eq!(marker.row_span, Some(0));
        assert_eq!(marker.col_span, Some(-1));
    }

    #[test]
    fn test_marker_rejects_other_grammar() {
        assert!(parse_span_marker("[c2r3]").is_none());
        assert!(parse_span_marker("[r]").is_none());
        assert!(parse_span_marker("[R2]").is_none());
        assert!(parse_span_marker("[r2").is_none());
        assert!(parse_span_marker(" [r2]").is_none());
        assert!(parse_span_marker("[link](http://x)").is_none());
    }

    #[test]
    fn test_marker_saturates_huge_values() {
        let marker = parse_span_marker("[r99999999999999999999999]").unwrap();
        assert_eq!(marker.row_span, Some(i64::MAX));
    }

    #[test]
    fn test_annotate_strips_marker() {
        let cell = text_cell("[r2] RowSpan");
        assert_eq!(cell.row_span, 2);
        assert_eq!(cell.col_span, 1);
        assert!(!cell.is_placeholder);
        assert_eq!(cell.content, vec![ContentNode::text("RowSpan")]);
    }

    #[test]
    fn test_annotate_placeholder() {
        let cell = text_cell(" _ ");
        assert!(cell.is_placeholder);
        assert_eq!(cell.content, vec![ContentNode::text("")]);
    }

    #[test]
    fn test_annotate_plain_text() {
        let cell = text_cell("[not a marker] text");
        assert_eq!(cell, Cell::new(vec![ContentNode::text("[not a marker] text")]));
    }

    #[test]
    fn test_annotate_non_text_keeps_marker_visible() {
        let strong = ContentNode::element("strong", vec![ContentNode::text("[c2] Bold")]);
        let cell = annotate_cell(&[strong.clone()]);
        assert_eq!(cell.col_span, 2);
        assert_eq!(cell.content, vec![strong]);
    }

    #[test]
    fn test_annotate_only_first_node() {
        let cell = annotate_cell(&[ContentNode::text("Plain "), ContentNode::text("[r2]")]);
        assert_eq!(cell.row_span, 1);
    }

    #[test]
    fn test_annotate_empty_content() {
        let cell = annotate_cell(&[]);
        assert_eq!(cell, Cell::new(vec![]));
    }

    #[test]
    fn test_effective_spans() {
        let cell = Cell::new(vec![]).with_span(-3, 0);
        assert_eq!(cell.effective_row_span(), 1);
        assert_eq!(cell.effective_col_span(), 1);
        assert!(!cell.is_spanning());

        let cell = Cell::new(vec![]).with_span(2, 1);
        assert!(cell.is_spanning());
    }
}
