//! Error types for the DataCite tooling

use thiserror::Error;

/// Result type for DataCite tooling operations
pub type Result<T> = std::result::Result<T, DataciteError>;

/// Errors raised by the library.
///
/// Per-record validation failures are reported as data (see
/// [`crate::jskos::RecordOutcome`]), never through this type.
#[derive(Error, Debug)]
pub enum DataciteError {
    #[error("Invalid JSON Schema {name}: {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("Unknown bundled schema: {0}")]
    UnknownSchema(String),

    #[error("{what} not found at {path}")]
    NotFound { what: String, path: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid timestamp {value}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IRI error: {0}")]
    Url(#[from] url::ParseError),
}

impl DataciteError {
    pub(crate) fn not_found(what: impl Into<String>, path: &std::path::Path) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.display().to_string(),
        }
    }
}
