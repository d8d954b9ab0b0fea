//! Report configuration: an ordered string map with a few recognized keys.
//!
//! Unknown keys are kept as-is so that custom emitters can read them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tzatziki_core::{resource, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    properties: IndexMap<String, String>,
}

impl Configuration {
    pub const TITLE: &'static str = "title";
    pub const SUB_TITLE: &'static str = "subTitle";
    pub const HEADER_TITLE: &'static str = "headerTitle";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_property(Self::TITLE)
    }

    pub fn sub_title(&self) -> Option<&str> {
        self.get_property(Self::SUB_TITLE)
    }

    /// Title shown in page headers/footers, defaults to the title
    pub fn header_title(&self) -> Option<&str> {
        self.get_property(Self::HEADER_TITLE).or_else(|| self.title())
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a YAML mapping; scalar values are stringified, nulls are skipped
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(yaml)?;
        let mut configuration = Self::new();
        for (key, value) in raw {
            let value = match value {
                serde_yaml::Value::Null => continue,
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                other => serde_yaml::to_string(&other)?.trim_end().to_string(),
            };
            configuration.declare_property(key, value);
        }
        Ok(configuration)
    }

    /// Load a UTF-8 YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = resource::read_utf8(path.as_ref())?;
        Self::from_yaml(&yaml)
    }
}
