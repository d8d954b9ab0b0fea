//! Tag Dictionary: descriptive metadata keyed by tag name
//!
//! Loaded once from a UTF-8 `.properties` resource and read-only afterwards,
//! so a single dictionary can be shared between report runs.
//!
//! Entry values are either `description` or `category|description`.

use crate::error::Result;
use crate::{properties, resource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata for a single tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub category: Option<String>,
    pub description: Option<String>,
}

impl TagEntry {
    /// Parse a `category|description` or plain `description` value
    pub fn parse(value: &str) -> Self {
        let (category, description) = match value.split_once('|') {
            Some((category, description)) => (non_empty(category), non_empty(description)),
            None => (None, non_empty(value)),
        };
        Self {
            category,
            description,
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagDictionary {
    entries: IndexMap<String, TagEntry>,
}

impl TagDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) a tag. A redeclared tag keeps its original position.
    pub fn declare_tag(mut self, tag: impl Into<String>, entry: TagEntry) -> Self {
        self.entries.insert(tag.into(), entry);
        self
    }

    pub fn lookup(&self, tag: &str) -> Option<&TagEntry> {
        self.entries.get(tag)
    }

    pub fn category_of(&self, tag: &str) -> Option<&str> {
        self.lookup(tag).and_then(|entry| entry.category.as_deref())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TagEntry)> {
        self.entries.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads dictionaries from UTF-8 properties resources
pub struct TagDictionaryLoader;

impl TagDictionaryLoader {
    /// Load from a file; the bytes must be valid UTF-8.
    pub fn from_utf8_file(path: impl AsRef<Path>) -> Result<TagDictionary> {
        let path = path.as_ref();
        let text = resource::read_utf8(path)?;
        Ok(Self::from_text(&path.display().to_string(), &text))
    }

    /// Load from raw bytes; `name` identifies the source in errors.
    pub fn from_utf8_bytes(name: &str, bytes: &[u8]) -> Result<TagDictionary> {
        let text = resource::decode_utf8(name, bytes)?;
        Ok(Self::from_text(name, text))
    }

    fn from_text(name: &str, text: &str) -> TagDictionary {
        let dictionary = properties::parse(text)
            .into_iter()
            .fold(TagDictionary::new(), |dictionary, (tag, value)| {
                dictionary.declare_tag(tag, TagEntry::parse(&value))
            });

        tracing::debug!(resource = name, tags = dictionary.len(), "loaded tag dictionary");
        dictionary
    }
}
