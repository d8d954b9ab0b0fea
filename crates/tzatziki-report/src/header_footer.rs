//! Page headers/footers and the table-of-contents pass run when the document closes.

use crate::configuration::Configuration;
use crate::context::{PageEvent, SectionEvent};
use crate::document::{PageDecoration, TableOfContents, TocEntry};
use crate::l10n::Localization;
use serde_json::json;

/// Header and footer templates with the report title bound in.
///
/// Templates see `title`, `chapterTitle` and `pageNumber`. A missing template
/// renders as an empty string.
#[derive(Debug, Clone)]
pub struct HeaderFooter {
    title: String,
    header_first: String,
    header_other: String,
    footer_first: String,
    footer_other: String,
}

impl HeaderFooter {
    pub fn new(title: Option<&str>, l10n: &Localization) -> Self {
        let template = |key: &str| l10n.template(key).unwrap_or_default().to_string();
        Self {
            title: title.unwrap_or_default().to_string(),
            header_first: template("header.firstPageTemplate"),
            header_other: template("header.otherPageTemplate"),
            footer_first: template("footer.firstPageTemplate"),
            footer_other: template("footer.otherPageTemplate"),
        }
    }

    /// Uses `headerTitle`, falling back to `title`
    pub fn from_configuration(configuration: &Configuration, l10n: &Localization) -> Self {
        Self::new(configuration.header_title(), l10n)
    }

    pub fn decorate(&self, event: &PageEvent, l10n: &Localization) -> PageDecoration {
        let data = json!({
            "title": self.title,
            "chapterTitle": event.chapter_title.as_deref().unwrap_or_default(),
            "pageNumber": event.content_page,
        });
        let (header, footer) = if event.first {
            (&self.header_first, &self.footer_first)
        } else {
            (&self.header_other, &self.footer_other)
        };
        PageDecoration {
            page: event.page,
            header: l10n.render_template(header, &data),
            footer: l10n.render_template(footer, &data),
        }
    }
}

pub struct TableOfContentsPostProcessor<'h> {
    header_footer: &'h HeaderFooter,
}

impl<'h> TableOfContentsPostProcessor<'h> {
    pub fn new(header_footer: &'h HeaderFooter) -> Self {
        Self { header_footer }
    }

    pub fn process(
        &self,
        sections: &[SectionEvent],
        pages: &[PageEvent],
        l10n: &Localization,
    ) -> (TableOfContents, Vec<PageDecoration>) {
        let toc = TableOfContents {
            title: l10n.text("toc.title"),
            entries: sections
                .iter()
                .map(|section| TocEntry {
                    title: section.title.clone(),
                    level: section.level,
                    number: section.number.clone(),
                    page: section.page,
                })
                .collect(),
        };
        let decorations = pages
            .iter()
            .map(|page| self.header_footer.decorate(page, l10n))
            .collect();
        tracing::debug!(
            entries = toc.entries.len(),
            pages = pages.len(),
            "table of contents post-processed"
        );
        (toc, decorations)
    }
}
