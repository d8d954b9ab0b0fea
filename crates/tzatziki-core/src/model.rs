//! Execution Model: Feature → Scenario → Step, with step results
//!
//! The tree is plain data. It is built once (usually by [`crate::json`]) and
//! only read afterwards. Tags are attached to the node that declares them;
//! inheritance down the tree is decided at consolidation time.

use crate::error::{Result, TzatzikiError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Pending,
    Skipped,
    Undefined,
}

impl Status {
    /// Every status, in display order
    pub const ALL: [Status; 5] = [
        Status::Passed,
        Status::Failed,
        Status::Pending,
        Status::Skipped,
        Status::Undefined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Undefined => "undefined",
        }
    }

    /// Whether a result with this status carries a duration
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result attached to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_millis: Option<u64>,
}

impl ExecResult {
    pub fn new(status: Status, duration_millis: Option<u64>) -> Self {
        Self {
            status,
            error_message: None,
            error_trace: None,
            duration_millis,
        }
    }

    pub fn passed(duration_millis: u64) -> Self {
        Self::timed(Status::Passed, duration_millis)
    }

    pub fn failed(duration_millis: u64, error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..Self::timed(Status::Failed, duration_millis)
        }
    }

    pub fn pending() -> Self {
        Self::untimed(Status::Pending)
    }

    pub fn skipped() -> Self {
        Self::untimed(Status::Skipped)
    }

    pub fn undefined() -> Self {
        Self::untimed(Status::Undefined)
    }

    fn timed(status: Status, duration_millis: u64) -> Self {
        Self::new(status, Some(duration_millis))
    }

    fn untimed(status: Status) -> Self {
        Self::new(status, None)
    }

    pub fn with_error_trace(mut self, trace: impl Into<String>) -> Self {
        self.error_trace = Some(trace.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub keyword: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExecResult>,
}

impl Step {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            tags: Vec::new(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: ExecResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// The step's result; a step without one is a malformed tree
    pub fn require_result(&self) -> Result<&ExecResult> {
        self.result.as_ref().ok_or_else(|| {
            TzatzikiError::InvariantViolation(format!(
                "step '{} {}' has no result",
                self.keyword, self.name
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub keyword: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            keyword: "Scenario".to_string(),
            name: name.into(),
            description: None,
            tags: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub keyword: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            keyword: "Feature".to_string(),
            name: name.into(),
            description: None,
            tags: Vec::new(),
            scenarios: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.scenarios.iter().flat_map(|s| s.steps.iter())
    }
}

/// Per-status counters, iterated in [`Status::ALL`] order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts(BTreeMap<Status, u64>);

impl StatusCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, status: Status) {
        *self.0.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: Status) -> u64 {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, u64)> + '_ {
        self.0.iter().map(|(status, count)| (*status, *count))
    }

    /// Ratio of passed over total, `None` when nothing was counted
    pub fn pass_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.get(Status::Passed) as f64 / total as f64)
    }
}
