//! Validation of JSON documents against a schema profile

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{DataciteError, Result};
use crate::schema::{bundled, CompiledSchema, Violation};

/// Violations for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// File path, with `:line` appended for NDJSON records
    pub source: String,
    pub violations: Vec<Violation>,
}

impl DocumentReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn unreadable(source: String, reason: impl Into<String>) -> Self {
        Self {
            source,
            violations: vec![Violation {
                instance_path: String::new(),
                message: reason.into(),
            }],
        }
    }
}

/// Validates documents against one compiled profile
#[derive(Debug)]
pub struct ProfileValidator {
    schema: CompiledSchema,
}

impl ProfileValidator {
    /// Use a schema bundled with the crate, e.g. `datacite/doi-submission.schema.json`
    pub fn from_bundled(name: &str) -> Result<Self> {
        Ok(Self {
            schema: bundled::compile(name)?,
        })
    }

    /// Load a schema from a file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DataciteError::not_found("Schema", path));
        }
        let schema: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        Self::from_value(path.display().to_string(), &schema)
    }

    pub fn from_value(name: impl Into<String>, schema: &Value) -> Result<Self> {
        Ok(Self {
            schema: CompiledSchema::compile(name, schema)?,
        })
    }

    /// Bundled schema when `spec` names one, otherwise a file path
    pub fn resolve(spec: &str) -> Result<Self> {
        if bundled::names().iter().any(|name| name == spec) {
            Self::from_bundled(spec)
        } else {
            Self::from_path(Path::new(spec))
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn validate_document(&self, document: &Value) -> Vec<Violation> {
        self.schema.validate(document)
    }

    /// Validate a `.json` document or every record of an `.ndjson` file.
    ///
    /// Unparseable input is reported as a violation at the document root.
    pub fn validate_path(&self, path: &Path) -> Result<Vec<DocumentReport>> {
        if !path.is_file() {
            return Err(DataciteError::not_found("Document", path));
        }
        let text = fs::read_to_string(path)?;
        let source = path.display().to_string();
        debug!("validating {} against {}", source, self.name());

        if is_ndjson(path) {
            let reports = text
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(index, line)| self.report(format!("{}:{}", source, index + 1), line))
                .collect();
            return Ok(reports);
        }
        Ok(vec![self.report(source, &text)])
    }

    fn report(&self, source: String, text: &str) -> DocumentReport {
        match serde_json::from_str::<Value>(text) {
            Ok(document) => DocumentReport {
                violations: self.validate_document(&document),
                source,
            },
            Err(e) => DocumentReport::unreadable(source, format!("invalid JSON: {}", e)),
        }
    }
}

fn is_ndjson(path: &Path) -> bool {
    path.extension().map(|ext| ext == "ndjson").unwrap_or(false)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "json" || ext == "ndjson")
        .unwrap_or(false)
}

/// Expand directories into the `.json`/`.ndjson` files beneath them.
///
/// Explicit file arguments are kept whatever their extension.
pub fn collect_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_document(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            documents.extend(found);
        } else {
            documents.push(path.clone());
        }
    }
    documents
}
