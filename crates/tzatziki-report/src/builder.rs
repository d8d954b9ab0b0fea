//! Report builder: deferred fragments replayed once against a document.
//!
//! While composing, every call only records configuration or a [`Fragment`].
//! `generate` validates the required configuration, switches the builder to
//! finalized, then replays the fragments in registration order. A finalized
//! builder rejects every further call with `AlreadyFinalized`.

use crate::configuration::Configuration;
use crate::context::ReportContext;
use crate::document::DocumentContext;
use crate::emitters::{self, CoverEmitter, Markup};
use crate::header_footer::{HeaderFooter, TableOfContentsPostProcessor};
use crate::l10n::Localization;
use crate::text::TextDocument;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tzatziki_core::{Feature, Result, TagDictionary, TagView, TagViewConsolidator, TzatzikiError};

/// Subsections an overview fragment can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Overview {
    FeatureSummary,
    TagDictionary,
    TagViews,
}

impl Overview {
    pub const ALL: [Overview; 3] = [
        Overview::FeatureSummary,
        Overview::TagDictionary,
        Overview::TagViews,
    ];

    fn title_key(&self) -> &'static str {
        match self {
            Self::FeatureSummary => "overview.subsection.features.title",
            Self::TagDictionary => "overview.subsection.tags.title",
            Self::TagViews => "overview.subsection.tagViews.title",
        }
    }
}

/// A deferred rendering command
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Features registered in one `features` call, as a range of the builder's list
    Features(Range<usize>),
    Overview(Vec<Overview>),
    Markup(Markup),
    SampleSteps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Composing,
    Finalized,
}

pub struct ReportBuilder {
    state: BuilderState,
    configuration: Configuration,
    required: Vec<String>,
    cover: Option<Box<dyn CoverEmitter>>,
    tag_dictionary: Arc<TagDictionary>,
    tag_views: Vec<TagView>,
    features: Vec<Feature>,
    fragments: Vec<Fragment>,
    l10n: Localization,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// Empty builder with the default localization and the "by tag" and
    /// "by category" views
    pub fn new() -> Self {
        Self {
            state: BuilderState::Composing,
            configuration: Configuration::new(),
            required: Vec::new(),
            cover: None,
            tag_dictionary: Arc::new(TagDictionary::new()),
            tag_views: vec![TagView::by_tag(), TagView::by_category()],
            features: Vec::new(),
            fragments: Vec::new(),
            l10n: Localization::defaults(),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    fn composing(&mut self) -> Result<&mut Self> {
        match self.state {
            BuilderState::Composing => Ok(self),
            BuilderState::Finalized => Err(TzatzikiError::AlreadyFinalized),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Merge every property of `configuration`, overwriting existing keys
    pub fn using(&mut self, configuration: &Configuration) -> Result<&mut Self> {
        let this = self.composing()?;
        for (key, value) in configuration.properties() {
            this.configuration.declare_property(key, value);
        }
        Ok(this)
    }

    pub fn declare_property(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<&mut Self> {
        let this = self.composing()?;
        this.configuration.declare_property(key, value);
        Ok(this)
    }

    /// Make `generate` fail unless `key` is configured
    pub fn require(&mut self, key: impl Into<String>) -> Result<&mut Self> {
        let this = self.composing()?;
        this.required.push(key.into());
        Ok(this)
    }

    pub fn title(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        self.declare_property(Configuration::TITLE, title)
    }

    pub fn sub_title(&mut self, sub_title: impl Into<String>) -> Result<&mut Self> {
        self.declare_property(Configuration::SUB_TITLE, sub_title)
    }

    pub fn header_title(&mut self, header_title: impl Into<String>) -> Result<&mut Self> {
        self.declare_property(Configuration::HEADER_TITLE, header_title)
    }

    pub fn localization(&mut self, l10n: Localization) -> Result<&mut Self> {
        let this = self.composing()?;
        this.l10n = l10n;
        Ok(this)
    }

    pub fn tag_dictionary(&mut self, dictionary: impl Into<Arc<TagDictionary>>) -> Result<&mut Self> {
        let this = self.composing()?;
        this.tag_dictionary = dictionary.into();
        Ok(this)
    }

    /// Replace the views consolidated by overview fragments
    pub fn tag_views<I>(&mut self, views: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = TagView>,
    {
        let this = self.composing()?;
        this.tag_views = views.into_iter().collect();
        Ok(this)
    }

    /// Replace the built-in title page
    pub fn cover_page(&mut self, cover: impl CoverEmitter + 'static) -> Result<&mut Self> {
        let this = self.composing()?;
        this.cover = Some(Box::new(cover));
        Ok(this)
    }

    // ========================================================================
    // Fragments
    // ========================================================================

    fn push(&mut self, fragment: Fragment) -> Result<&mut Self> {
        let this = self.composing()?;
        this.fragments.push(fragment);
        Ok(this)
    }

    /// Register features; they are rendered at this point of the report and
    /// counted by every overview
    pub fn features<I>(&mut self, features: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Feature>,
    {
        let this = self.composing()?;
        let start = this.features.len();
        this.features.extend(features);
        let range = start..this.features.len();
        this.push(Fragment::Features(range))
    }

    /// Overview rendering the given subsections in the given order
    pub fn overview<I>(&mut self, overviews: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Overview>,
    {
        self.push(Fragment::Overview(overviews.into_iter().collect()))
    }

    pub fn default_overview(&mut self) -> Result<&mut Self> {
        self.overview(Overview::ALL)
    }

    pub fn markup(&mut self, text: impl Into<String>) -> Result<&mut Self> {
        self.push(Fragment::Markup(Markup::new(text)))
    }

    pub fn sample_steps(&mut self) -> Result<&mut Self> {
        self.push(Fragment::SampleSteps)
    }

    // ========================================================================
    // Generation
    // ========================================================================

    fn check_required(&self) -> Result<()> {
        match self.required.iter().find(|key| !self.configuration.contains(key)) {
            Some(key) => Err(TzatzikiError::MissingConfiguration(key.clone())),
            None => Ok(()),
        }
    }

    /// Render as plain text into `out`
    pub fn generate<W: Write>(&mut self, out: W) -> Result<()> {
        let mut document = TextDocument::new(out);
        self.generate_with(&mut document)
    }

    /// Render as plain text into a file; the file is only created once the
    /// builder is known to be generatable
    pub fn generate_to_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.composing()?.check_required()?;
        let file = File::create(path.as_ref())?;
        self.generate(BufWriter::new(file))
    }

    /// Render against any document; finalizes the builder
    pub fn generate_with(&mut self, document: &mut dyn DocumentContext) -> Result<()> {
        self.composing()?.check_required()?;
        self.state = BuilderState::Finalized;
        tracing::info!(
            fragments = self.fragments.len(),
            features = self.features.len(),
            "generating report"
        );

        document.open()?;
        let header_footer = HeaderFooter::from_configuration(&self.configuration, &self.l10n);
        let mut ctx = ReportContext::new(document, &self.l10n);

        self.emit_cover(&mut ctx)?;
        ctx.start_content()?;
        for fragment in &self.fragments {
            self.replay(&mut ctx, fragment)?;
        }
        ctx.end_report(&TableOfContentsPostProcessor::new(&header_footer))?;

        tracing::info!("report generated");
        Ok(())
    }

    fn emit_cover(&self, ctx: &mut ReportContext<'_>) -> Result<()> {
        match (&self.cover, self.configuration.title()) {
            (Some(cover), _) => cover.emit(ctx)?,
            (None, Some(title)) => {
                emitters::emit_title_page(ctx, title, self.configuration.sub_title())?
            }
            (None, None) => return Ok(()),
        }
        ctx.new_page()
    }

    fn replay(&self, ctx: &mut ReportContext<'_>, fragment: &Fragment) -> Result<()> {
        tracing::debug!(?fragment, "replaying fragment");
        match fragment {
            Fragment::Features(range) => {
                let features = self.features.get(range.clone()).unwrap_or_default();
                emitters::emit_features(ctx, features)
            }
            Fragment::Overview(overviews) => self.emit_overview(ctx, overviews),
            Fragment::Markup(markup) => emitters::emit_markup(ctx, markup),
            Fragment::SampleSteps => emitters::emit_sample_steps(ctx),
        }
    }

    fn emit_overview(&self, ctx: &mut ReportContext<'_>, overviews: &[Overview]) -> Result<()> {
        if overviews.is_empty() {
            tracing::debug!("empty overview skipped");
            return Ok(());
        }

        // Every feature registered on the builder, including those registered
        // after this fragment.
        let consolidator = TagViewConsolidator::new(&self.tag_dictionary, self.tag_views.clone());
        let views = consolidator.consolidate(&self.features)?;

        let l10n = ctx.l10n();
        let mut section = ctx.section(l10n.text("overview.section-title"), 1, true)?;
        for overview in overviews {
            let mut sub = section.section(l10n.text(overview.title_key()), 2, true)?;
            match overview {
                Overview::FeatureSummary => emitters::emit_feature_summary(&mut sub, &self.features)?,
                Overview::TagDictionary => emitters::emit_tag_dictionary(&mut sub, &self.tag_dictionary)?,
                Overview::TagViews => emitters::emit_tag_views(&mut sub, &views)?,
            }
            sub.close()?;
        }
        section.close()
    }
}
