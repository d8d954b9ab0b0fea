//! Live report context: the document plus the state that spans a whole render.
//!
//! Sections are only entered through [`ReportContext::section`], which returns
//! a [`SectionScope`]. The scope derefs to the context and leaves its section
//! when dropped, so an emitter that bails out with `?` halfway through a
//! section still leaves the stack balanced for whatever is emitted next.

use crate::document::{DocumentContext, Heading, Table, TextStyle};
use crate::header_footer::TableOfContentsPostProcessor;
use crate::l10n::Localization;
use crate::sections::Sections;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use tzatziki_core::{Result, TzatzikiError};

/// A section as it appeared in the content, for the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEvent {
    pub title: String,
    pub level: u8,
    pub number: Option<String>,
    /// Content page (1-based)
    pub page: u32,
}

/// A content page, for headers and footers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEvent {
    /// Physical page number
    pub page: u32,
    /// Page number within the content (1-based)
    pub content_page: u32,
    pub first: bool,
    pub chapter_title: Option<String>,
}

pub struct ReportContext<'a> {
    document: &'a mut dyn DocumentContext,
    l10n: &'a Localization,
    sections: Sections,
    section_events: Vec<SectionEvent>,
    page_events: Vec<PageEvent>,
    content_start: Option<u32>,
    page_has_content: bool,
}

impl<'a> ReportContext<'a> {
    /// Wrap an already opened document
    pub fn new(document: &'a mut dyn DocumentContext, l10n: &'a Localization) -> Self {
        Self {
            document,
            l10n,
            sections: Sections::new(),
            section_events: Vec::new(),
            page_events: Vec::new(),
            content_start: None,
            page_has_content: false,
        }
    }

    pub fn l10n(&self) -> &'a Localization {
        self.l10n
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn section_events(&self) -> &[SectionEvent] {
        &self.section_events
    }

    pub fn page_events(&self) -> &[PageEvent] {
        &self.page_events
    }

    /// Enter a section; it is left when the returned scope is closed or dropped.
    ///
    /// Level-1 sections in the content start on a fresh page.
    pub fn section(
        &mut self,
        title: impl Into<String>,
        level: u8,
        numbered: bool,
    ) -> Result<SectionScope<'_, 'a>> {
        self.sections.check_enter(level)?;
        if level == 1 && self.content_start.is_some() && self.page_has_content {
            self.new_page()?;
        }

        let entry = self.sections.enter(title, level, numbered)?.clone();
        let scope = SectionScope {
            ctx: self,
            level,
            open: true,
        };

        if level == 1 {
            if let Some(page) = scope.ctx.page_events.last_mut() {
                page.chapter_title.get_or_insert_with(|| entry.title.clone());
            }
        }
        if scope.ctx.content_start.is_some() {
            let page = scope.ctx.content_page();
            scope.ctx.section_events.push(SectionEvent {
                title: entry.title.clone(),
                level,
                number: entry.number.clone(),
                page,
            });
        }

        scope.ctx.document.heading(&Heading {
            title: entry.title,
            level,
            number: entry.number,
        })?;
        scope.ctx.page_has_content = true;
        Ok(scope)
    }

    /// Leave the innermost section, which must be at `level`
    pub fn leave_section(&mut self, level: u8) -> Result<()> {
        self.sections.leave(level)?;
        Ok(())
    }

    pub fn paragraph(&mut self, text: &str, style: TextStyle) -> Result<()> {
        self.page_has_content = true;
        self.document.paragraph(text, style)
    }

    pub fn list_item(&mut self, depth: u8, text: &str, style: TextStyle) -> Result<()> {
        self.page_has_content = true;
        self.document.list_item(depth, text, style)
    }

    pub fn table(&mut self, table: &Table) -> Result<()> {
        self.page_has_content = true;
        self.document.table(table)
    }

    pub fn new_page(&mut self) -> Result<()> {
        let page = self.document.new_page()?;
        self.page_has_content = false;
        if self.content_start.is_some() {
            let content_page = self.content_page();
            self.page_events.push(PageEvent {
                page,
                content_page,
                first: false,
                chapter_title: self.sections.chapter().map(|entry| entry.title.clone()),
            });
        }
        Ok(())
    }

    /// Start the numbered content region on the current page
    pub fn start_content(&mut self) -> Result<()> {
        if self.content_start.is_some() {
            return Err(TzatzikiError::InvariantViolation(
                "content region started twice".to_string(),
            ));
        }
        self.document.start_content()?;
        let page = self.document.page_number();
        self.content_start = Some(page);
        self.page_events.push(PageEvent {
            page,
            content_page: 1,
            first: true,
            chapter_title: None,
        });
        Ok(())
    }

    /// Current page number within the content, 0 before the content starts
    pub fn content_page(&self) -> u32 {
        match self.content_start {
            Some(start) => self.document.page_number().saturating_sub(start) + 1,
            None => 0,
        }
    }

    /// Close the document, post-processing the recorded events
    pub fn end_report(self, post_processor: &TableOfContentsPostProcessor<'_>) -> Result<()> {
        if let Some(open) = self.sections.current() {
            return Err(TzatzikiError::InvariantViolation(format!(
                "section '{}' is still open at end of report",
                open.title
            )));
        }
        let (toc, decorations) =
            post_processor.process(&self.section_events, &self.page_events, self.l10n);
        self.document.close(&toc, &decorations)
    }
}

/// An open section; leaves it on [`close`](Self::close) or drop
pub struct SectionScope<'s, 'a> {
    ctx: &'s mut ReportContext<'a>,
    level: u8,
    open: bool,
}

impl SectionScope<'_, '_> {
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Leave the section now, reporting a mismatch instead of logging it
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.ctx.leave_section(self.level)
    }
}

impl<'a> Deref for SectionScope<'_, 'a> {
    type Target = ReportContext<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.ctx
    }
}

impl DerefMut for SectionScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.ctx
    }
}

impl Drop for SectionScope<'_, '_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.ctx.leave_section(self.level) {
                tracing::error!(level = self.level, error = %e, "section released out of order");
            }
        }
    }
}
