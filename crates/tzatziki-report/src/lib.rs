//! Tzatziki Report: renders execution trees as documents
//!
//! A [`ReportBuilder`] records fragments (features, overviews, markup, sample
//! steps) while composing and replays them once, in order, when the report is
//! generated. Sections opened by fragments are scoped, so one failing fragment
//! never leaves the document nesting broken for the next.
//!
//! # Example
//!
//! ```ignore
//! use tzatziki_core::{json, TagDictionaryLoader};
//! use tzatziki_report::ReportBuilder;
//!
//! let features = json::load_file("target/exec.json")?;
//! let dictionary = TagDictionaryLoader::from_utf8_file("tags.properties")?;
//!
//! let mut builder = ReportBuilder::new();
//! builder
//!     .title("Coffee machine")?
//!     .tag_dictionary(dictionary)?
//!     .default_overview()?
//!     .features(features)?;
//! builder.generate_to_path("target/report.txt")?;
//! ```

pub mod builder;
pub mod configuration;
pub mod context;
pub mod document;
pub mod emitters;
pub mod header_footer;
pub mod l10n;
pub mod sections;
pub mod text;

pub use builder::{BuilderState, Fragment, Overview, ReportBuilder};
pub use configuration::Configuration;
pub use context::{PageEvent, ReportContext, SectionEvent, SectionScope};
pub use document::{DocumentContext, Heading, PageDecoration, Table, TableOfContents, TextStyle, TocEntry};
pub use emitters::{CoverEmitter, Markup};
pub use header_footer::{HeaderFooter, TableOfContentsPostProcessor};
pub use l10n::Localization;
pub use sections::{SectionEntry, Sections};
pub use text::TextDocument;
