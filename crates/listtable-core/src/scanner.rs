//! Document scanner for discovering list tables in Markdown files

use crate::content::ContentNode;
use crate::error::{Error, Result};
use crate::parser::{parse_csv, parse_json_str, parse_markdown};
use crate::table::TableOptions;
use crate::validate::ValidationMode;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<ListTable\b((?:\s+[A-Za-z][A-Za-z0-9]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^}]*\}))?)*)\s*>(.*?)</ListTable\s*>"#,
    )
    .expect("valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z][A-Za-z0-9]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\})"#)
        .expect("valid regex")
});

/// One table found in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableBlock {
    /// 1-based line of the opening tag (1 for whole-file tables)
    pub line: usize,
    /// Options read from the opening tag
    pub options: TableOptions,
    /// Content between the tags
    pub content: Vec<ContentNode>,
}

/// A loaded document and the tables it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source file path
    pub path: PathBuf,
    /// Tables in document order
    pub tables: Vec<TableBlock>,
}

/// Result of scanning directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Markdown files found, sorted by path
    pub files: Vec<PathBuf>,
}

impl ScanResult {
    /// Get the number of files found
    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}

/// Find every `<ListTable ...>...</ListTable>` block in a Markdown/MDX source
///
/// Tags that start inside fenced, indented or inline code are samples, not
/// tables, and are skipped.
pub fn extract_blocks(source: &str) -> Result<Vec<TableBlock>> {
    let code = code_ranges(source);
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(caps) = BLOCK_RE.captures_at(source, pos) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(2)) else {
            break;
        };
        let line = source[..whole.start()].matches('\n').count() + 1;

        if let Some(range) = code.iter().find(|r| r.contains(&whole.start())) {
            log::debug!("skipping ListTable sample in code at line {}", line);
            // Resume after the code so a tag inside it cannot pair with a later close
            pos = range.end;
            continue;
        }

        let attrs = caps.get(1).map_or("", |m| m.as_str());
        blocks.push(TableBlock {
            line,
            options: parse_attributes(attrs)?,
            content: parse_markdown(inner.as_str()),
        });
        pos = whole.end();
    }

    Ok(blocks)
}

/// Byte ranges of code blocks and code spans
fn code_ranges(source: &str) -> Vec<Range<usize>> {
    Parser::new(source)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

/// Read table options from the attributes of an opening tag
fn parse_attributes(attrs: &str) -> Result<TableOptions> {
    let mut options = TableOptions::default();

    for caps in ATTR_RE.captures_iter(attrs) {
        let name = &caps[1];
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        let value = unquote(raw.trim());

        match name {
            "headerRows" => options.header_rows = parse_count(name, value)?,
            "headerColumns" => options.header_columns = parse_count(name, value)?,
            "footerRows" => options.footer_rows = parse_count(name, value)?,
            "validation" => {
                options.validation = value
                    .parse::<ValidationMode>()
                    .map_err(|e| Error::InvalidOption(format!("{}: {}", name, e)))?
            }
            "caption" => options.caption = Some(vec![ContentNode::text(value)]),
            "className" => options.class_name = Some(value.to_string()),
            other => log::debug!("ignoring unknown ListTable attribute '{}'", other),
        }
    }

    Ok(options)
}

/// Strip one level of JS string quotes, as in `{"strict"}`
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| {
        Error::InvalidOption(format!(
            "{} must be a non-negative integer, found '{}'",
            name, value
        ))
    })
}

/// Load a document, choosing the front-end from the file extension
///
/// Markdown files without any `<ListTable>` block are read as one table.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let tables = match extension.as_deref() {
        Some("md") | Some("mdx") | Some("markdown") => {
            let source = read_to_string(path)?;
            let blocks = extract_blocks(&source)?;
            if blocks.is_empty() {
                vec![whole_file_table(parse_markdown(&source))]
            } else {
                blocks
            }
        }
        Some("csv") => vec![whole_file_table(parse_csv(path)?)],
        Some("json") => vec![whole_file_table(parse_json_str(&read_to_string(path)?)?)],
        _ => return Err(Error::UnsupportedInput(path.to_path_buf())),
    };

    Ok(Document {
        path: path.to_path_buf(),
        tables,
    })
}

fn whole_file_table(content: Vec<ContentNode>) -> TableBlock {
    TableBlock {
        line: 1,
        options: TableOptions::default(),
        content,
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Scan one or more directories for Markdown files
///
/// A root that cannot be read is an error; unreadable entries below it are
/// logged and skipped.
pub fn scan_directory<P: AsRef<Path>>(roots: &[P]) -> Result<ScanResult> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    log::warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_file() && is_markdown(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();

    Ok(ScanResult {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        files,
    })
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "md" | "mdx"))
}
