//! JSON I/O for the execution model
//!
//! Documents have the shape `{"features": [...]}` with camelCase fields.

use crate::error::{Result, TzatzikiError};
use crate::model::Feature;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct ExecDocument {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ExecDocumentRef<'a> {
    features: &'a [Feature],
}

/// Load features from a reader
pub fn load<R: Read>(reader: R) -> Result<Vec<Feature>> {
    let document: ExecDocument = serde_json::from_reader(reader)?;
    Ok(document.features)
}

/// Load features from a file
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TzatzikiError::not_found(path.display().to_string()),
        _ => TzatzikiError::Io(e),
    })?;
    let features = load(std::io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), features = features.len(), "loaded execution model");
    Ok(features)
}

/// Load features from a JSON string
pub fn from_str(json: &str) -> Result<Vec<Feature>> {
    load(json.as_bytes())
}

/// Serialize features back to the document shape
pub fn to_string_pretty(features: &[Feature]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExecDocumentRef { features })?)
}
