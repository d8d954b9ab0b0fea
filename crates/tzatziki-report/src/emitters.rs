//! Emitters: the rendering logic each fragment runs against the live context.
//!
//! Every emitter enters its sections through [`ReportContext::section`], so an
//! error raised halfway through leaves the section stack balanced.

use crate::context::ReportContext;
use crate::document::{Table, TextStyle};
use crate::l10n::Localization;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tzatziki_core::{
    ConsolidatedView, ExecResult, Feature, Result, Status, StatusCounts, Step, TagDictionary,
};

// ============================================================================
// Cover page
// ============================================================================

/// Caller-supplied cover page
pub trait CoverEmitter {
    fn emit(&self, ctx: &mut ReportContext<'_>) -> Result<()>;
}

impl<F> CoverEmitter for F
where
    F: Fn(&mut ReportContext<'_>) -> Result<()>,
{
    fn emit(&self, ctx: &mut ReportContext<'_>) -> Result<()> {
        self(ctx)
    }
}

/// Built-in cover: title and optional subtitle
pub fn emit_title_page(ctx: &mut ReportContext<'_>, title: &str, sub_title: Option<&str>) -> Result<()> {
    ctx.paragraph(title, TextStyle::Title)?;
    match sub_title {
        Some(sub_title) => ctx.paragraph(sub_title, TextStyle::Subtitle),
        None => Ok(()),
    }
}

// ============================================================================
// Features
// ============================================================================

pub fn emit_features(ctx: &mut ReportContext<'_>, features: &[Feature]) -> Result<()> {
    for feature in features {
        emit_feature(ctx, feature)?;
    }
    Ok(())
}

pub fn emit_feature(ctx: &mut ReportContext<'_>, feature: &Feature) -> Result<()> {
    let l10n = ctx.l10n();
    tracing::debug!(feature = %feature.name, "emitting feature");

    let mut section = ctx.section(feature.name.as_str(), 1, true)?;
    if !feature.tags.is_empty() {
        let tags = l10n.format("feature.tags", &json!({ "tags": feature.tags }));
        section.paragraph(&tags, TextStyle::Emphasis)?;
    }
    if let Some(description) = &feature.description {
        section.paragraph(description, TextStyle::Normal)?;
    }

    for scenario in &feature.scenarios {
        let mut sub = section.section(scenario.name.as_str(), 2, true)?;
        if !scenario.tags.is_empty() {
            let tags = l10n.format("feature.tags", &json!({ "tags": scenario.tags }));
            sub.paragraph(&tags, TextStyle::Emphasis)?;
        }
        if let Some(description) = &scenario.description {
            sub.paragraph(description, TextStyle::Normal)?;
        }
        emit_steps(&mut sub, &scenario.steps)?;
        sub.close()?;
    }
    section.close()
}

fn emit_steps(ctx: &mut ReportContext<'_>, steps: &[Step]) -> Result<()> {
    for step in steps {
        let result = step.require_result()?;
        emit_step(ctx, &step.keyword, &step.name, result)?;
    }
    Ok(())
}

fn emit_step(ctx: &mut ReportContext<'_>, keyword: &str, sentence: &str, result: &ExecResult) -> Result<()> {
    let l10n = ctx.l10n();
    let line = l10n.format(
        "step.line",
        &json!({
            "keyword": keyword,
            "sentence": sentence,
            "status": result.status.as_str(),
            "durationMillis": result.duration_millis,
        }),
    );
    let style = match result.status {
        Status::Failed => TextStyle::Error,
        _ => TextStyle::Normal,
    };
    ctx.list_item(0, &line, style)?;

    if result.status == Status::Failed {
        let message = l10n.format("step.error", &json!({ "message": result.error_message }));
        ctx.list_item(1, &message, TextStyle::Error)?;
    }
    Ok(())
}

// ============================================================================
// Overview subsections
// ============================================================================

fn status_columns(l10n: &Localization) -> impl Iterator<Item = String> + '_ {
    Status::ALL
        .into_iter()
        .map(move |status| l10n.text(&format!("column.status.{}", status.as_str())))
}

fn status_cells(counts: &StatusCounts) -> impl Iterator<Item = String> + '_ {
    Status::ALL.into_iter().map(move |status| counts.get(status).to_string())
}

fn duration_cell(l10n: &Localization, millis: u64) -> String {
    l10n.format("cell.duration", &json!({ "millis": millis }))
}

pub fn emit_feature_summary(ctx: &mut ReportContext<'_>, features: &[Feature]) -> Result<()> {
    let l10n = ctx.l10n();
    let mut columns = vec![
        l10n.text("column.feature"),
        l10n.text("column.scenarios"),
        l10n.text("column.steps"),
    ];
    columns.extend(status_columns(l10n));
    columns.push(l10n.text("column.passRate"));
    columns.push(l10n.text("column.duration"));
    let mut table = Table::new(columns);

    for feature in features {
        let mut counts = StatusCounts::new();
        let mut duration = 0u64;
        for step in feature.steps() {
            let result = step.require_result()?;
            counts.increment(result.status);
            duration = duration.saturating_add(result.duration_millis.unwrap_or(0));
        }

        let pass_rate = counts
            .pass_rate()
            .map(|rate| l10n.format("cell.passRate", &json!({ "rate": rate })))
            .unwrap_or_else(|| "-".to_string());

        let mut row = vec![
            feature.name.clone(),
            feature.scenarios.len().to_string(),
            counts.total().to_string(),
        ];
        row.extend(status_cells(&counts));
        row.push(pass_rate);
        row.push(duration_cell(l10n, duration));
        table.push_row(row);
    }
    ctx.table(&table)
}

pub fn emit_tag_dictionary(ctx: &mut ReportContext<'_>, dictionary: &TagDictionary) -> Result<()> {
    let l10n = ctx.l10n();
    if dictionary.is_empty() {
        return ctx.paragraph(&l10n.text("overview.tags.empty"), TextStyle::Emphasis);
    }

    let mut table = Table::new([
        l10n.text("column.tag"),
        l10n.text("column.category"),
        l10n.text("column.description"),
    ]);
    for (tag, entry) in dictionary.entries() {
        table.push_row(vec![
            tag.to_string(),
            entry.category.clone().unwrap_or_default(),
            entry.description.clone().unwrap_or_default(),
        ]);
    }
    ctx.table(&table)
}

pub fn emit_tag_views(ctx: &mut ReportContext<'_>, views: &[ConsolidatedView]) -> Result<()> {
    let l10n = ctx.l10n();
    for view in views {
        let mut section = ctx.section(view.name.as_str(), 3, false)?;
        if view.is_empty() {
            section.paragraph(&l10n.text("overview.tagViews.empty"), TextStyle::Emphasis)?;
        } else {
            let mut columns = vec![l10n.text("column.bucket"), l10n.text("column.occurrences")];
            columns.extend(status_columns(l10n));
            columns.push(l10n.text("column.duration"));
            let mut table = Table::new(columns);

            for (bucket, stats) in &view.buckets {
                let mut row = vec![bucket.clone(), stats.occurrence_count.to_string()];
                row.extend(status_cells(&stats.status_counts));
                row.push(duration_cell(l10n, stats.total_duration_millis));
                table.push_row(row);
            }
            section.table(&table)?;
        }
        section.close()?;
    }
    Ok(())
}

// ============================================================================
// Markup
// ============================================================================

/// Markdown text replayed as paragraphs, list items and code lines.
///
/// Markdown headings are rendered as styled paragraphs and do not enter the
/// section stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup(pub String);

impl Markup {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn emit_markup(ctx: &mut ReportContext<'_>, markup: &Markup) -> Result<()> {
    let mut buffer = String::new();
    let mut list_depth = 0u8;
    let mut item_depth = 0u8;

    for event in Parser::new(markup.as_str()) {
        match event {
            Event::Start(Tag::List(_)) => {
                if item_depth > 0 && !buffer.trim().is_empty() {
                    ctx.list_item(list_depth.saturating_sub(1), buffer.trim(), TextStyle::Normal)?;
                }
                buffer.clear();
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
            Event::Start(Tag::Item) => {
                buffer.clear();
                item_depth += 1;
            }
            Event::End(TagEnd::Item) => {
                if !buffer.trim().is_empty() {
                    ctx.list_item(list_depth.saturating_sub(1), buffer.trim(), TextStyle::Normal)?;
                }
                buffer.clear();
                item_depth = item_depth.saturating_sub(1);
            }
            Event::End(TagEnd::Heading(level)) => {
                let style = if level == HeadingLevel::H1 {
                    TextStyle::Title
                } else {
                    TextStyle::Subtitle
                };
                ctx.paragraph(buffer.trim(), style)?;
                buffer.clear();
            }
            Event::End(TagEnd::Paragraph) if item_depth == 0 => {
                ctx.paragraph(buffer.trim(), TextStyle::Normal)?;
                buffer.clear();
            }
            Event::End(TagEnd::Paragraph) => buffer.push(' '),
            Event::End(TagEnd::CodeBlock) => {
                ctx.paragraph(buffer.trim_end_matches('\n'), TextStyle::Code)?;
                buffer.clear();
            }
            Event::Text(text) | Event::Code(text) => buffer.push_str(&text),
            Event::SoftBreak => buffer.push(' '),
            Event::HardBreak => buffer.push('\n'),
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// Sample steps
// ============================================================================

/// One step per status, with the localized keyword and sentence
pub fn sample_steps() -> [ExecResult; 5] {
    [
        ExecResult::new(Status::Passed, Some(500)),
        ExecResult::new(Status::Failed, Some(230)),
        ExecResult::pending(),
        ExecResult::undefined(),
        ExecResult::skipped(),
    ]
}

pub fn emit_sample_steps(ctx: &mut ReportContext<'_>) -> Result<()> {
    let l10n = ctx.l10n();
    let mut section = ctx.section(l10n.text("sample-steps.section-title"), 1, false)?;
    for (index, result) in sample_steps().iter().enumerate() {
        let key = format!("sample-steps.step-{}", index + 1);
        let keyword = l10n.text(&format!("{}.keyword", key));
        let sentence = l10n.text(&format!("{}.sentence", key));
        emit_step(&mut section, &keyword, &sentence, result)?;
    }
    section.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentContext;
    use crate::text::TextDocument;
    use tzatziki_core::{Scenario, TzatzikiError};

    fn render(emit: impl FnOnce(&mut ReportContext<'_>) -> Result<()>) -> (Result<()>, String) {
        let l10n = Localization::defaults();
        let mut document = TextDocument::new(Vec::new());
        document.open().unwrap();
        let outcome = {
            let mut ctx = ReportContext::new(&mut document, &l10n);
            ctx.start_content().unwrap();
            emit(&mut ctx)
        };
        document
            .close(&Default::default(), &[])
            .unwrap();
        (outcome, String::from_utf8(document.into_inner()).unwrap())
    }

    fn coffee_feature() -> Feature {
        Feature::new("Make coffee").with_tags(["@coffee"]).with_scenario(
            Scenario::new("Espresso")
                .with_step(Step::new("Given", "a machine").with_result(ExecResult::passed(500)))
                .with_step(
                    Step::new("Then", "coffee flows")
                        .with_result(ExecResult::failed(1250, "no water")),
                ),
        )
    }

    #[test]
    fn test_emit_feature() {
        let (outcome, output) = render(|ctx| emit_feature(ctx, &coffee_feature()));
        outcome.unwrap();

        assert!(output.contains("# 1. Make coffee"));
        assert!(output.contains("_Tags: @coffee_"));
        assert!(output.contains("## 1.1. Espresso"));
        assert!(output.contains("- Given a machine [passed, 500ms]"));
        assert!(output.contains("- ! Then coffee flows [failed, 1.25s]"));
        assert!(output.contains("  - ! no water"));
    }

    #[test]
    fn test_step_without_result_is_an_invariant_violation() {
        let feature = Feature::new("Broken")
            .with_scenario(Scenario::new("No result").with_step(Step::new("Given", "nothing")));
        let (outcome, _) = render(|ctx| {
            let outcome = emit_feature(ctx, &feature);
            assert!(ctx.sections().is_empty());
            outcome
        });
        assert!(matches!(outcome, Err(TzatzikiError::InvariantViolation(_))));
    }

    #[test]
    fn test_feature_summary() {
        let (outcome, output) = render(|ctx| emit_feature_summary(ctx, &[coffee_feature()]));
        outcome.unwrap();
        assert!(output.contains("| Make coffee | 1 | 2 | 1 | 1 | 0 | 0 | 0 | 50% | 1.75s |"));
    }

    #[test]
    fn test_feature_summary_duration_saturates() {
        let long = u64::MAX / 2 + 1;
        let feature = Feature::new("Long").with_scenario(
            Scenario::new("S")
                .with_step(Step::new("Given", "x").with_result(ExecResult::passed(long)))
                .with_step(Step::new("When", "y").with_result(ExecResult::passed(long))),
        );
        let (outcome, output) = render(|ctx| emit_feature_summary(ctx, &[feature]));
        outcome.unwrap();

        let total = crate::l10n::format_duration(u64::MAX);
        assert!(output.contains(&format!("| 100% | {} |", total)));
    }

    #[test]
    fn test_empty_tag_dictionary() {
        let (outcome, output) = render(|ctx| emit_tag_dictionary(ctx, &TagDictionary::new()));
        outcome.unwrap();
        assert!(output.contains("No tag dictionary declared."));
    }

    #[test]
    fn test_sample_steps() {
        let (outcome, output) = render(emit_sample_steps);
        outcome.unwrap();

        assert!(output.contains("# Sample Steps"));
        assert!(output.contains("- Given a passed step [passed, 500ms]"));
        assert!(output.contains("- ! And a failed step [failed, 230ms]"));
        assert!(output.contains("  - ! unknown error"));
        assert!(output.contains("- When a pending step [pending]"));
        assert!(output.contains("- But an undefined step [undefined]"));
        assert!(output.contains("- Then a skipped step [skipped]"));
    }

    #[test]
    fn test_markup() {
        let markup = Markup::new("# Notes\n\nSome *text* here.\n\n- one\n- two\n\n```\nlet x = 1;\n```\n");
        let (outcome, output) = render(|ctx| emit_markup(ctx, &markup));
        outcome.unwrap();

        assert!(output.contains("NOTES"));
        assert!(output.contains("Some text here."));
        assert!(output.contains("- one\n- two"));
        assert!(output.contains("    let x = 1;"));
    }

    fn custom_cover(ctx: &mut ReportContext<'_>) -> Result<()> {
        ctx.paragraph("custom cover", TextStyle::Normal)
    }

    #[test]
    fn test_function_cover_emitter() {
        let (outcome, output) = render(|ctx| custom_cover.emit(ctx));
        outcome.unwrap();
        assert!(output.contains("custom cover"));
    }
}
