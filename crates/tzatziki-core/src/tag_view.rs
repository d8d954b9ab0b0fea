//! Tag views: per-tag statistics consolidated over execution trees
//!
//! Tags are inherited top-down: a step's effective tags are its own tags plus
//! those of its scenario and feature, deduplicated. Each effective tag is
//! mapped to a bucket by the view's [`TagGrouping`]; tags that map to no bucket
//! are left out of that view only.

use crate::dictionary::TagDictionary;
use crate::error::Result;
use crate::model::{ExecResult, Feature, StatusCounts};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// How tags are mapped to buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "tags")]
pub enum TagGrouping {
    /// One bucket per tag
    Tag,
    /// One bucket per dictionary category; uncategorized tags are dropped
    Category,
    /// One bucket per listed tag; other tags are dropped
    Selected(Vec<String>),
}

impl TagGrouping {
    pub fn bucket_of(&self, tag: &str, dictionary: &TagDictionary) -> Option<String> {
        match self {
            Self::Tag => Some(tag.to_string()),
            Self::Category => dictionary.category_of(tag).map(str::to_string),
            Self::Selected(tags) => tags.iter().any(|t| t == tag).then(|| tag.to_string()),
        }
    }
}

/// A named grouping rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub name: String,
    pub grouping: TagGrouping,
}

impl TagView {
    pub fn new(name: impl Into<String>, grouping: TagGrouping) -> Self {
        Self {
            name: name.into(),
            grouping,
        }
    }

    pub fn by_tag() -> Self {
        Self::new("by tag", TagGrouping::Tag)
    }

    pub fn by_category() -> Self {
        Self::new("by category", TagGrouping::Category)
    }

    pub fn selected<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            TagGrouping::Selected(tags.into_iter().map(Into::into).collect()),
        )
    }
}

/// Accumulator for one bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub occurrence_count: u64,
    pub status_counts: StatusCounts,
    pub total_duration_millis: u64,
}

impl TagStats {
    fn record(&mut self, result: &ExecResult) {
        self.occurrence_count += 1;
        self.status_counts.increment(result.status);
        if let Some(duration) = result.duration_millis {
            self.total_duration_millis = self.total_duration_millis.saturating_add(duration);
        }
    }
}

/// The outcome of consolidating one [`TagView`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedView {
    pub name: String,
    pub buckets: IndexMap<String, TagStats>,
}

impl ConsolidatedView {
    pub fn get(&self, bucket: &str) -> Option<&TagStats> {
        self.buckets.get(bucket)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Effective tags of a step: feature, then scenario, then step tags, deduplicated
pub fn effective_tags<'a>(
    feature_tags: &'a [String],
    scenario_tags: &'a [String],
    step_tags: &'a [String],
) -> IndexSet<&'a str> {
    feature_tags
        .iter()
        .chain(scenario_tags)
        .chain(step_tags)
        .map(String::as_str)
        .collect()
}

/// Walks execution trees and builds consolidated views from scratch
pub struct TagViewConsolidator<'d> {
    dictionary: &'d TagDictionary,
    views: Vec<TagView>,
}

impl<'d> TagViewConsolidator<'d> {
    pub fn new(dictionary: &'d TagDictionary, views: Vec<TagView>) -> Self {
        Self { dictionary, views }
    }

    pub fn views(&self) -> &[TagView] {
        &self.views
    }

    /// Consolidate every configured view over `features`, in order.
    ///
    /// Fails with `InvariantViolation` on a step that has no result.
    pub fn consolidate(&self, features: &[Feature]) -> Result<Vec<ConsolidatedView>> {
        let mut consolidated: Vec<ConsolidatedView> = self
            .views
            .iter()
            .map(|view| ConsolidatedView {
                name: view.name.clone(),
                buckets: IndexMap::new(),
            })
            .collect();

        for feature in features {
            for scenario in &feature.scenarios {
                for step in &scenario.steps {
                    let result = step.require_result()?;

                    let tags = effective_tags(&feature.tags, &scenario.tags, &step.tags);
                    for (view, target) in self.views.iter().zip(consolidated.iter_mut()) {
                        self.record(view, target, &tags, result);
                    }
                }
            }
        }

        tracing::debug!(
            features = features.len(),
            views = consolidated.len(),
            "consolidated tag views"
        );
        Ok(consolidated)
    }

    fn record(
        &self,
        view: &TagView,
        target: &mut ConsolidatedView,
        tags: &IndexSet<&str>,
        result: &ExecResult,
    ) {
        // Every effective tag counts, even when several share a bucket.
        for tag in tags {
            if let Some(bucket) = view.grouping.bucket_of(tag, self.dictionary) {
                target.buckets.entry(bucket).or_default().record(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::TagEntry;
    use crate::error::TzatzikiError;
    use crate::model::{Scenario, Status, Step};

    fn category(name: &str) -> TagEntry {
        TagEntry {
            category: Some(name.to_string()),
            description: None,
        }
    }

    #[test]
    fn test_effective_tags_are_a_set_union() {
        let feature = vec!["@a".to_string(), "@b".to_string()];
        let scenario = vec!["@b".to_string(), "@c".to_string()];
        let tags = effective_tags(&feature, &scenario, &[]);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["@a", "@b", "@c"]);
    }

    #[test]
    fn test_grouping_buckets() {
        let dictionary = TagDictionary::new().declare_tag("@smoke", category("suite"));

        assert_eq!(
            TagGrouping::Tag.bucket_of("@other", &dictionary),
            Some("@other".to_string())
        );
        assert_eq!(
            TagGrouping::Category.bucket_of("@smoke", &dictionary),
            Some("suite".to_string())
        );
        assert_eq!(TagGrouping::Category.bucket_of("@other", &dictionary), None);

        let selected = TagGrouping::Selected(vec!["@smoke".to_string()]);
        assert!(selected.bucket_of("@smoke", &dictionary).is_some());
        assert!(selected.bucket_of("@other", &dictionary).is_none());
    }

    #[test]
    fn test_shared_category_counts_every_tag() {
        let dictionary = TagDictionary::new()
            .declare_tag("@fast", category("speed"))
            .declare_tag("@slow", category("speed"));
        let features = vec![Feature::new("F").with_tags(["@fast", "@slow"]).with_scenario(
            Scenario::new("S").with_step(Step::new("Given", "x").with_result(ExecResult::passed(10))),
        )];

        let views = TagViewConsolidator::new(&dictionary, vec![TagView::by_category()])
            .consolidate(&features)
            .unwrap();
        let speed = views[0].get("speed").unwrap();
        assert_eq!(speed.occurrence_count, 2);
        assert_eq!(speed.status_counts.get(Status::Passed), 2);
        assert_eq!(speed.total_duration_millis, 20);
    }

    #[test]
    fn test_total_duration_saturates() {
        let dictionary = TagDictionary::new();
        let long = u64::MAX / 2 + 1;
        let features = vec![Feature::new("F").with_tags(["@t"]).with_scenario(
            Scenario::new("S")
                .with_step(Step::new("Given", "x").with_result(ExecResult::passed(long)))
                .with_step(Step::new("When", "y").with_result(ExecResult::passed(long))),
        )];

        let views = TagViewConsolidator::new(&dictionary, vec![TagView::by_tag()])
            .consolidate(&features)
            .unwrap();
        let stats = views[0].get("@t").unwrap();
        assert_eq!(stats.occurrence_count, 2);
        assert_eq!(stats.total_duration_millis, u64::MAX);
    }

    #[test]
    fn test_step_without_result_is_an_invariant_violation() {
        let dictionary = TagDictionary::new();
        let features = vec![Feature::new("F")
            .with_scenario(Scenario::new("S").with_step(Step::new("Given", "no result")))];

        let err = TagViewConsolidator::new(&dictionary, vec![TagView::by_tag()])
            .consolidate(&features)
            .unwrap_err();
        assert!(matches!(err, TzatzikiError::InvariantViolation(_)));
    }
}
