//! Header / body / footer partitioning

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Which part of the table a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Body,
    Footer,
}

impl SectionKind {
    /// Whether every cell in this section is a column header
    pub fn is_header(&self) -> bool {
        matches!(self, SectionKind::Header)
    }
}

/// Row ranges of the three sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub header: Range<usize>,
    pub body: Range<usize>,
    pub footer: Range<usize>,
}

impl Sections {
    /// Sections in render order
    pub fn in_order(&self) -> [(SectionKind, Range<usize>); 3] {
        [
            (SectionKind::Header, self.header.clone()),
            (SectionKind::Body, self.body.clone()),
            (SectionKind::Footer, self.footer.clone()),
        ]
    }
}

/// Split `total_rows` into header, body and footer ranges
pub fn partition(total_rows: usize, header_rows: usize, footer_rows: usize) -> Result<Sections> {
    let framed = header_rows.checked_add(footer_rows);
    if framed.map_or(true, |n| n > total_rows) {
        return Err(Error::Bounds {
            header_rows,
            footer_rows,
            total_rows,
        });
    }

    let footer_start = total_rows - footer_rows;
    log::trace!(
        "sections: header {}, body {}, footer {}",
        header_rows,
        footer_start - header_rows,
        footer_rows
    );

    Ok(Sections {
        header: 0..header_rows,
        body: header_rows..footer_start,
        footer: footer_start..total_rows,
    })
}
