//! Plain-text document.
//!
//! Pages are buffered in memory and written to the sink on `close`, in order:
//! front matter (cover), table of contents, content pages framed by their
//! header and footer. Pages are separated by a form feed line. Nothing is
//! written if the report fails before `close`.

use crate::document::{DocumentContext, Heading, PageDecoration, Table, TableOfContents, TextStyle};
use std::io::Write;
use tzatziki_core::{Result, TzatzikiError};

const PAGE_BREAK: &str = "\u{c}";

pub struct TextDocument<W: Write> {
    out: W,
    pages: Vec<Vec<String>>,
    content_start: usize,
    opened: bool,
}

impl<W: Write> TextDocument<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pages: Vec::new(),
            content_start: 0,
            opened: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn lines(&mut self) -> Result<&mut Vec<String>> {
        self.pages.last_mut().ok_or_else(|| {
            TzatzikiError::InvariantViolation("text document used before open".to_string())
        })
    }

    fn push(&mut self, line: String) -> Result<()> {
        self.lines()?.push(line);
        Ok(())
    }

    fn styled(text: &str, style: TextStyle) -> String {
        match style {
            TextStyle::Normal | TextStyle::Subtitle => text.to_string(),
            TextStyle::Title => text.to_uppercase(),
            TextStyle::Emphasis => format!("_{}_", text),
            TextStyle::Code => format!("    {}", text),
            TextStyle::Error => format!("! {}", text),
        }
    }

    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn write_toc(&mut self, toc: &TableOfContents) -> Result<()> {
        if toc.entries.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", toc.title)?;
        writeln!(self.out)?;
        for entry in &toc.entries {
            let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
            let label = match &entry.number {
                Some(number) => format!("{} {}", number, entry.title),
                None => entry.title.clone(),
            };
            writeln!(self.out, "{}{} .... {}", indent, label, entry.page)?;
        }
        writeln!(self.out, "{}", PAGE_BREAK)?;
        Ok(())
    }
}

impl<W: Write> DocumentContext for TextDocument<W> {
    fn open(&mut self) -> Result<()> {
        if self.opened {
            return Err(TzatzikiError::InvariantViolation(
                "text document opened twice".to_string(),
            ));
        }
        self.opened = true;
        self.pages.push(Vec::new());
        Ok(())
    }

    fn heading(&mut self, heading: &Heading) -> Result<()> {
        let marker = "#".repeat(usize::from(heading.level.max(1)));
        let line = match &heading.number {
            Some(number) => format!("{} {} {}", marker, number, heading.title),
            None => format!("{} {}", marker, heading.title),
        };
        let lines = self.lines()?;
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(line);
        lines.push(String::new());
        Ok(())
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) -> Result<()> {
        for line in text.lines() {
            self.push(Self::styled(line, style))?;
        }
        self.push(String::new())
    }

    fn list_item(&mut self, depth: u8, text: &str, style: TextStyle) -> Result<()> {
        let indent = "  ".repeat(usize::from(depth));
        self.push(format!("{}- {}", indent, Self::styled(text, style)))
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        let row = |cells: &[String]| format!("| {} |", cells.join(" | "));
        let separator = format!(
            "|{}|",
            table.columns.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        );

        let mut lines = vec![row(&table.columns), separator];
        lines.extend(table.rows.iter().map(|cells| row(cells)));
        lines.push(String::new());
        self.lines()?.extend(lines);
        Ok(())
    }

    fn new_page(&mut self) -> Result<u32> {
        self.lines()?;
        self.pages.push(Vec::new());
        Ok(self.page_number())
    }

    fn page_number(&self) -> u32 {
        self.pages.len() as u32
    }

    fn start_content(&mut self) -> Result<()> {
        self.lines()?;
        self.content_start = self.pages.len() - 1;
        Ok(())
    }

    fn close(&mut self, toc: &TableOfContents, decorations: &[PageDecoration]) -> Result<()> {
        let pages = std::mem::take(&mut self.pages);
        let (front, content) = pages.split_at(self.content_start.min(pages.len()));

        for page in front {
            self.write_lines(page)?;
            writeln!(self.out, "{}", PAGE_BREAK)?;
        }

        self.write_toc(toc)?;

        for (index, page) in content.iter().enumerate() {
            let number = (self.content_start + index + 1) as u32;
            let decoration = decorations.iter().find(|d| d.page == number);
            if index > 0 {
                writeln!(self.out, "{}", PAGE_BREAK)?;
            }
            if let Some(header) = decoration.map(|d| &d.header).filter(|h| !h.is_empty()) {
                writeln!(self.out, "{}", header)?;
                writeln!(self.out)?;
            }
            self.write_lines(page)?;
            if let Some(footer) = decoration.map(|d| &d.footer).filter(|f| !f.is_empty()) {
                writeln!(self.out)?;
                writeln!(self.out, "{}", footer)?;
            }
        }

        self.out.flush()?;
        Ok(())
    }
}
