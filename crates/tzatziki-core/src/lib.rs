//! Tzatziki Core: execution model, tag dictionary and tag views
//!
//! The execution model is a read-only tree of features, scenarios and steps.
//! Tag views consolidate step results per tag (or per tag category) across
//! that tree; the report crate renders them.

pub mod dictionary;
pub mod error;
pub mod json;
pub mod model;
pub mod properties;
pub mod resource;
pub mod tag_view;

pub use dictionary::{TagDictionary, TagDictionaryLoader, TagEntry};
pub use error::{Result, TzatzikiError};
pub use model::{ExecResult, Feature, Scenario, Status, StatusCounts, Step};
pub use tag_view::{ConsolidatedView, TagGrouping, TagStats, TagView, TagViewConsolidator};
