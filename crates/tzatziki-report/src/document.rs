//! Document context: the page/paragraph primitives a report is drawn with.
//!
//! The pipeline only drives this trait; page geometry, fonts and the output
//! format belong to the implementation. [`crate::text::TextDocument`] is the
//! bundled plain-text implementation.

use serde::{Deserialize, Serialize};
use tzatziki_core::Result;

/// A section heading as handed to the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub title: String,
    pub level: u8,
    /// `"1.2."`-style number, `None` for unnumbered sections
    pub number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    Normal,
    Title,
    Subtitle,
    Emphasis,
    Code,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub level: u8,
    pub number: Option<String>,
    /// Content page the section starts on (1-based)
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOfContents {
    pub title: String,
    pub entries: Vec<TocEntry>,
}

/// Rendered header and footer of one physical page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDecoration {
    pub page: u32,
    pub header: String,
    pub footer: String,
}

pub trait DocumentContext {
    /// Acquire the output; called once before anything else
    fn open(&mut self) -> Result<()>;

    fn heading(&mut self, heading: &Heading) -> Result<()>;

    fn paragraph(&mut self, text: &str, style: TextStyle) -> Result<()>;

    fn list_item(&mut self, depth: u8, text: &str, style: TextStyle) -> Result<()>;

    fn table(&mut self, table: &Table) -> Result<()>;

    /// Start a new page and return its (physical, 1-based) number
    fn new_page(&mut self) -> Result<u32>;

    /// Current physical page number
    fn page_number(&self) -> u32;

    /// Mark the current page as the first page of the numbered content
    fn start_content(&mut self) -> Result<()>;

    /// Write out the document with its table of contents and page decorations
    fn close(&mut self, toc: &TableOfContents, decorations: &[PageDecoration]) -> Result<()>;
}
