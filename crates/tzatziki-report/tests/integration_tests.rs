//! Integration tests for report generation.

use tzatziki_core::{
    ExecResult, Feature, Result, Scenario, Step, TagDictionary, TagEntry, TzatzikiError,
};
use tzatziki_report::{
    DocumentContext, Heading, Overview, PageDecoration, ReportBuilder, ReportContext, Table,
    TableOfContents, TextStyle,
};

// ============================================================================
// Fixtures
// ============================================================================

fn smoke_feature() -> Feature {
    Feature::new("Smoke").with_tags(["smoke"]).with_scenario(
        Scenario::new("Login").with_step(
            Step::new("Given", "a registered user").with_result(ExecResult::passed(500)),
        ),
    )
}

fn dictionary() -> TagDictionary {
    TagDictionary::new().declare_tag("smoke", TagEntry::parse("suite|Smoke tests"))
}

fn render(builder: &mut ReportBuilder) -> String {
    let mut out = Vec::new();
    builder.generate(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Records every call as a short line
#[derive(Default)]
struct RecordingDocument {
    events: Vec<String>,
    pages: u32,
    toc: Option<TableOfContents>,
}

impl RecordingDocument {
    fn headings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.starts_with('h'))
            .map(String::as_str)
            .collect()
    }
}

impl DocumentContext for RecordingDocument {
    fn open(&mut self) -> Result<()> {
        self.pages = 1;
        self.events.push("open".to_string());
        Ok(())
    }

    fn heading(&mut self, heading: &Heading) -> Result<()> {
        self.events.push(format!("h{} {}", heading.level, heading.title));
        Ok(())
    }

    fn paragraph(&mut self, text: &str, _style: TextStyle) -> Result<()> {
        self.events.push(format!("p {}", text));
        Ok(())
    }

    fn list_item(&mut self, depth: u8, text: &str, _style: TextStyle) -> Result<()> {
        self.events.push(format!("li{} {}", depth, text));
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        self.events.push(format!("table {} rows", table.rows.len()));
        Ok(())
    }

    fn new_page(&mut self) -> Result<u32> {
        self.pages += 1;
        self.events.push("page".to_string());
        Ok(self.pages)
    }

    fn page_number(&self) -> u32 {
        self.pages
    }

    fn start_content(&mut self) -> Result<()> {
        self.events.push("content".to_string());
        Ok(())
    }

    fn close(&mut self, toc: &TableOfContents, _decorations: &[PageDecoration]) -> Result<()> {
        self.toc = Some(toc.clone());
        self.events.push("close".to_string());
        Ok(())
    }
}

// ============================================================================
// Builder lifecycle
// ============================================================================

#[test]
fn test_generate_twice_fails_and_keeps_first_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    let mut builder = ReportBuilder::new();
    builder.title("Coffee machine").unwrap().features([smoke_feature()]).unwrap();
    builder.generate_to_path(&path).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();
    assert!(first.contains("# 1. Smoke"));

    let err = builder.generate_to_path(&path).unwrap_err();
    assert!(matches!(err, TzatzikiError::AlreadyFinalized));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_missing_configuration_names_first_missing_key() {
    let mut builder = ReportBuilder::new();
    builder
        .require("subTitle")
        .unwrap()
        .require("title")
        .unwrap()
        .require("headerTitle")
        .unwrap();
    builder.title("Only the title").unwrap();

    let mut document = RecordingDocument::default();
    let err = builder.generate_with(&mut document).unwrap_err();
    assert!(matches!(err, TzatzikiError::MissingConfiguration(ref key) if key == "subTitle"));
    assert!(document.events.is_empty());
}

#[test]
fn test_step_without_result_aborts_without_output() {
    let broken = Feature::new("Broken")
        .with_scenario(Scenario::new("No result").with_step(Step::new("Given", "nothing")));
    let mut builder = ReportBuilder::new();
    builder.features([smoke_feature(), broken]).unwrap();

    let mut out = Vec::new();
    let err = builder.generate(&mut out).unwrap_err();
    assert!(matches!(err, TzatzikiError::InvariantViolation(_)));
    assert!(out.is_empty());
}

// ============================================================================
// Fragments
// ============================================================================

#[test]
fn test_fragments_replay_in_registration_order() {
    let mut builder = ReportBuilder::new();
    builder
        .sample_steps()
        .unwrap()
        .features([smoke_feature()])
        .unwrap()
        .markup("Closing *notes*.")
        .unwrap();

    let mut document = RecordingDocument::default();
    builder.generate_with(&mut document).unwrap();

    assert_eq!(
        document.headings(),
        vec!["h1 Sample Steps", "h1 Smoke", "h2 Login"]
    );
    assert_eq!(document.events.first().map(String::as_str), Some("open"));
    assert_eq!(document.events.last().map(String::as_str), Some("close"));
    assert!(document.events.contains(&"p Closing notes.".to_string()));
}

#[test]
fn test_overview_subset_and_order() {
    let mut builder = ReportBuilder::new();
    builder
        .overview([Overview::TagViews, Overview::FeatureSummary])
        .unwrap()
        .features([smoke_feature()])
        .unwrap();

    let mut document = RecordingDocument::default();
    builder.generate_with(&mut document).unwrap();

    assert_eq!(
        document.headings(),
        vec![
            "h1 Overview",
            "h2 Consolidated tag views",
            "h3 by tag",
            "h3 by category",
            "h2 Features",
            "h1 Smoke",
            "h2 Login",
        ]
    );
}

#[test]
fn test_empty_overview_is_skipped() {
    let mut builder = ReportBuilder::new();
    builder.overview(Vec::<Overview>::new()).unwrap();

    let mut document = RecordingDocument::default();
    builder.generate_with(&mut document).unwrap();
    assert!(document.headings().is_empty());
}

#[test]
fn test_overview_counts_features_registered_later() {
    let mut builder = ReportBuilder::new();
    builder
        .tag_dictionary(dictionary())
        .unwrap()
        .default_overview()
        .unwrap()
        .features([smoke_feature()])
        .unwrap();

    let output = render(&mut builder);
    assert!(output.contains("| Smoke | 1 | 1 | 1 | 0 | 0 | 0 | 0 | 100% | 500ms |"));
    assert!(output.contains("| smoke | suite | Smoke tests |"));
    assert!(output.contains("| smoke | 1 | 1 | 0 | 0 | 0 | 0 | 500ms |"));
    assert!(output.contains("| suite | 1 | 1 | 0 | 0 | 0 | 0 | 500ms |"));
}

// ============================================================================
// Document structure
// ============================================================================

#[test]
fn test_cover_toc_and_footer() {
    let mut builder = ReportBuilder::new();
    builder
        .title("Coffee machine")
        .unwrap()
        .sub_title("Acceptance run")
        .unwrap()
        .default_overview()
        .unwrap()
        .features([smoke_feature()])
        .unwrap();

    let output = render(&mut builder);

    let cover = output.find("COFFEE MACHINE").unwrap();
    let sub_title = output.find("Acceptance run").unwrap();
    let toc = output.find("Table of contents").unwrap();
    let overview = output.find("# 1. Overview").unwrap();
    let feature = output.find("# 2. Smoke").unwrap();
    let footer = output.find("Coffee machine | Smoke").unwrap();
    assert!(cover < sub_title && sub_title < toc && toc < overview);
    assert!(overview < feature && feature < footer);

    assert!(output.contains("1. Overview .... 1"));
    assert!(output.contains("  1.1. Features .... 1"));
    assert!(output.contains("    by tag .... 1"));
    assert!(output.contains("2. Smoke .... 2"));
    assert!(output.contains("  2.1. Login .... 2"));
}

fn custom_cover(ctx: &mut ReportContext<'_>) -> Result<()> {
    ctx.paragraph("Custom cover", TextStyle::Title)
}

#[test]
fn test_custom_cover_replaces_title_page() {
    let mut builder = ReportBuilder::new();
    builder.title("Coffee machine").unwrap().cover_page(custom_cover).unwrap();

    let mut document = RecordingDocument::default();
    builder.generate_with(&mut document).unwrap();
    assert_eq!(
        document.events,
        vec!["open", "p Custom cover", "page", "content", "close"]
    );
}

#[test]
fn test_no_title_no_cover() {
    let mut builder = ReportBuilder::new();
    builder.features([smoke_feature()]).unwrap();

    let mut document = RecordingDocument::default();
    builder.generate_with(&mut document).unwrap();
    assert_eq!(&document.events[..3], &["open", "content", "h1 Smoke"]);

    let toc = document.toc.unwrap();
    assert_eq!(toc.entries.len(), 2);
    assert_eq!(toc.entries[1].number.as_deref(), Some("1.1."));
}
