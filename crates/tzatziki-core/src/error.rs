//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TzatzikiError {
    #[error("RESOURCE/NOT_FOUND: resource not found '{resource}'")]
    ResourceNotFound { resource: String },

    #[error("RESOURCE/ENCODING: '{resource}' is not valid UTF-8: {source}")]
    Encoding {
        resource: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("MODEL/INVARIANT: {0}")]
    InvariantViolation(String),

    #[error("SECTION/MISMATCH: level {expected} does not fit the section stack top {found:?}")]
    SectionMismatch { expected: u8, found: Option<u8> },

    #[error("CONFIG/MISSING: required configuration '{0}' is not set")]
    MissingConfiguration(String),

    #[error("BUILDER/FINALIZED: report builder has already generated its report")]
    AlreadyFinalized,

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),

    #[error("JSON/{0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML/{0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TzatzikiError>;

impl TzatzikiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }
}
