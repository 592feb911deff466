//! Compiled JSON Schemas and the bundled schema set

use std::fmt;

use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataciteError, Result};

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer into the validated document
    pub instance_path: String,
    /// Message produced by the validator
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// A JSON Schema compiled and ready for validation
pub struct CompiledSchema {
    name: String,
    inner: JSONSchema,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema").field("name", &self.name).finish()
    }
}

impl CompiledSchema {
    /// Compile a schema document.
    ///
    /// Schemas without a `$schema` keyword are treated as draft-07. The schema
    /// is checked against its meta-schema during compilation.
    pub fn compile(name: impl Into<String>, schema: &Value) -> Result<Self> {
        let name = name.into();
        let mut options = JSONSchema::options();
        if schema.get("$schema").is_none() {
            options.with_draft(Draft::Draft7);
        }
        let inner = options
            .compile(schema)
            .map_err(|e| DataciteError::InvalidSchema {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { name, inner })
    }

    /// Name the schema was compiled under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate a document, returning every violation (empty when valid)
    pub fn validate(&self, instance: &Value) -> Vec<Violation> {
        match self.inner.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| Violation {
                    instance_path: e.instance_path.to_string(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }

    /// Check a document without collecting violations
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.inner.is_valid(instance)
    }
}

/// Schemas embedded from the `schemas/` directory
pub mod bundled {
    use include_dir::{include_dir, Dir};
    use serde_json::Value;

    use super::CompiledSchema;
    use crate::error::{DataciteError, Result};

    static SCHEMAS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/schemas");

    pub const JSKOS_MAPPING: &str = "jskos/mapping.schema.json";
    pub const JSKOS_CONCEPT: &str = "jskos/concept.schema.json";
    pub const JSKOS_SCHEME: &str = "jskos/scheme.schema.json";
    pub const DOI_SUBMISSION: &str = "datacite/doi-submission.schema.json";
    pub const DOI_RESPONSE: &str = "datacite/doi-response.schema.json";

    /// Relative paths of all bundled schemas, sorted
    pub fn names() -> Vec<String> {
        let mut names = Vec::new();
        collect(&SCHEMAS, &mut names);
        names.sort();
        names
    }

    fn collect(dir: &Dir<'_>, names: &mut Vec<String>) {
        for file in dir.files() {
            let path = file.path().to_string_lossy().replace('\\', "/");
            if path.ends_with(".json") {
                names.push(path);
            }
        }
        for sub in dir.dirs() {
            collect(sub, names);
        }
    }

    /// Parsed JSON of a bundled schema
    pub fn get(name: &str) -> Result<Value> {
        let file = SCHEMAS
            .get_file(name)
            .ok_or_else(|| DataciteError::UnknownSchema(name.to_string()))?;
        let text = file.contents_utf8().ok_or_else(|| DataciteError::InvalidSchema {
            name: name.to_string(),
            reason: "not UTF-8".to_string(),
        })?;
        Ok(serde_json::from_str(text)?)
    }

    /// Compile a bundled schema
    pub fn compile(name: &str) -> Result<CompiledSchema> {
        CompiledSchema::compile(name, &get(name)?)
    }

    /// Compile every bundled schema, reporting each outcome
    pub fn check_all() -> Vec<(String, Result<()>)> {
        names()
            .into_iter()
            .map(|name| {
                let result = compile(&name).map(|_| ());
                (name, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_and_validate() {
        let schema = CompiledSchema::compile(
            "inline",
            &json!({
                "type": "object",
                "required": ["name"],
                "properties": { "name": { "type": "string" } }
            }),
        )
        .unwrap();

        assert!(schema.is_valid(&json!({ "name": "x" })));
        let violations = schema.validate(&json!({ "name": 3 }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].instance_path, "/name");
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let result = CompiledSchema::compile("broken", &json!({ "type": 12 }));
        assert!(matches!(result, Err(DataciteError::InvalidSchema { .. })));
    }

    #[test]
    fn test_violation_display() {
        let root = Violation {
            instance_path: String::new(),
            message: "\"from\" is a required property".to_string(),
        };
        assert!(root.to_string().starts_with("(root): "));
    }

    #[test]
    fn test_bundled_names() {
        let names = bundled::names();
        assert!(names.contains(&bundled::JSKOS_MAPPING.to_string()));
        assert!(names.contains(&bundled::DOI_SUBMISSION.to_string()));
    }

    #[test]
    fn test_bundled_schemas_compile() {
        for (name, result) in bundled::check_all() {
            assert!(result.is_ok(), "{} failed to compile: {:?}", name, result.err());
        }
    }

    #[test]
    fn test_unknown_bundled_schema() {
        assert!(matches!(
            bundled::get("nope.schema.json"),
            Err(DataciteError::UnknownSchema(_))
        ));
    }
}
