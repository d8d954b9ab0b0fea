//! Localized strings for reports.
//!
//! Every entry is a Handlebars template rendered in non-strict mode, with
//! custom helpers:
//! - duration: Format milliseconds (500 -> "500ms", 1234 -> "1.23s")
//! - percent: Format ratio as percentage
//! - join: Join array with separator
//! - default: Value or fallback
//!
//! Lookups never fail: a missing key renders as the key itself and a broken
//! template renders as its raw text.

use handlebars::{handlebars_helper, no_escape, Handlebars};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::path::Path;
use tzatziki_core::{resource, Result};

const DEFAULT_ENTRIES: &str = include_str!("../resources/l10n.en.yaml");

/// Localized templates keyed by message key
#[derive(Clone)]
pub struct Localization {
    handlebars: Handlebars<'static>,
    entries: IndexMap<String, String>,
}

impl Localization {
    /// Built-in English entries
    pub fn defaults() -> Self {
        Self::embedded(DEFAULT_ENTRIES)
    }

    fn embedded(yaml: &str) -> Self {
        let mut localization = Self::empty();
        match serde_yaml::from_str::<IndexMap<String, String>>(yaml) {
            Ok(entries) => localization.declare_all(entries),
            Err(e) => tracing::warn!(error = %e, "embedded localization could not be parsed, keys will be used"),
        }
        localization
    }

    /// No entries at all; every lookup falls back to its key
    pub fn empty() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("duration", Box::new(duration));
        handlebars.register_helper("percent", Box::new(percent));
        handlebars.register_helper("join", Box::new(join));
        handlebars.register_helper("default", Box::new(default_value));

        Self {
            handlebars,
            entries: IndexMap::new(),
        }
    }

    /// Override entries from a YAML mapping of `key: template`
    pub fn with_overrides_from_yaml(mut self, yaml: &str) -> Result<Self> {
        let entries: IndexMap<String, String> = serde_yaml::from_str(yaml)?;
        self.declare_all(entries);
        Ok(self)
    }

    /// Override entries from a UTF-8 YAML file
    pub fn with_overrides_from_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let yaml = resource::read_utf8(path.as_ref())?;
        self.with_overrides_from_yaml(&yaml)
    }

    pub fn declare(&mut self, key: impl Into<String>, template: impl Into<String>) {
        let key = key.into();
        let template = template.into();
        if let Err(e) = self.handlebars.register_template_string(&key, &template) {
            tracing::warn!(key = %key, error = %e, "invalid localized template, raw text will be used");
            self.handlebars.unregister_template(&key);
        }
        self.entries.insert(key, template);
    }

    fn declare_all(&mut self, entries: IndexMap<String, String>) {
        for (key, template) in entries {
            self.declare(key, template);
        }
    }

    /// Raw template text for a key
    pub fn template(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Render a key without data
    pub fn text(&self, key: &str) -> String {
        self.format(key, &json!({}))
    }

    /// Render a key with data
    pub fn format(&self, key: &str, data: &Value) -> String {
        let Some(template) = self.entries.get(key) else {
            tracing::warn!(key, "missing localized entry");
            return key.to_string();
        };
        if !self.handlebars.has_template(key) {
            return template.clone();
        }
        self.handlebars.render(key, data).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "localized entry could not be rendered");
            template.clone()
        })
    }

    /// Render an arbitrary template string with the same helpers
    pub fn render_template(&self, template: &str, data: &Value) -> String {
        self.handlebars
            .render_template(template, data)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "template could not be rendered");
                template.to_string()
            })
    }
}

impl Default for Localization {
    fn default() -> Self {
        Self::defaults()
    }
}

impl std::fmt::Debug for Localization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Localization")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Human-readable duration: `500ms`, `1.23s`, `2m 03s`
pub fn format_duration(millis: u64) -> String {
    match millis {
        0..=999 => format!("{}ms", millis),
        1_000..=59_999 => format!("{:.2}s", millis as f64 / 1000.0),
        _ => format!("{}m {:02}s", millis / 60_000, (millis % 60_000) / 1000),
    }
}

// ============================================================================
// Custom Helpers
// ============================================================================

handlebars_helper!(duration: |millis: u64| format_duration(millis));

handlebars_helper!(percent: |ratio: f64| format!("{}%", (ratio * 100.0).round() as i64));

handlebars_helper!(join: |items: array, separator: str| {
    items
        .iter()
        .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
        .collect::<Vec<_>>()
        .join(separator)
});

handlebars_helper!(default_value: |value: Json, fallback: str| {
    match value {
        Value::Null => Value::String(fallback.to_string()),
        Value::String(s) if s.is_empty() => Value::String(fallback.to_string()),
        other => other.clone(),
    }
});
