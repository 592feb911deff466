//! JSKOS record classification and validation
//!
//! Records are sorted into mappings, concepts and concept schemes by their
//! `type` (or `@type`) field and checked against the matching bundled JSKOS
//! schema.

mod ndjson;

pub use ndjson::{validate_file, validate_reader, LineReport, ValidationSummary};

use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::schema::{bundled, CompiledSchema, Violation};

const SKOS_MAPPING_RELATIONS: &[&str] = &[
    "mappingRelation",
    "exactMatch",
    "closeMatch",
    "broadMatch",
    "narrowMatch",
    "relatedMatch",
];

/// Category of a JSKOS record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Mapping,
    Concept,
    Scheme,
}

impl RecordKind {
    /// Classify a record by its `type`, falling back to `@type`.
    ///
    /// Returns `None` for records without a recognised SKOS type.
    pub fn classify(record: &Value) -> Option<Self> {
        let types = record_types(record);
        if types.iter().any(|t| is_skos_term(t, SKOS_MAPPING_RELATIONS)) {
            Some(RecordKind::Mapping)
        } else if types.iter().any(|t| is_skos_term(t, &["ConceptScheme"])) {
            Some(RecordKind::Scheme)
        } else if types.iter().any(|t| is_skos_term(t, &["Concept"])) {
            Some(RecordKind::Concept)
        } else {
            None
        }
    }

    /// Bundled schema records of this kind are checked against
    pub fn schema_name(&self) -> &'static str {
        match self {
            RecordKind::Mapping => bundled::JSKOS_MAPPING,
            RecordKind::Concept => bundled::JSKOS_CONCEPT,
            RecordKind::Scheme => bundled::JSKOS_SCHEME,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Mapping => "mapping",
            RecordKind::Concept => "concept",
            RecordKind::Scheme => "scheme",
        };
        f.write_str(label)
    }
}

fn record_types(record: &Value) -> Vec<&str> {
    let field = record.get("type").or_else(|| record.get("@type"));
    match field {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Matches `http://www.w3.org/2004/02/skos/core#<local>` and `skos:<local>`
fn is_skos_term(value: &str, locals: &[&str]) -> bool {
    let local = value
        .strip_prefix(crate::namespace::SKOS)
        .or_else(|| value.strip_prefix("skos:"));
    match local {
        Some(local) => locals.contains(&local),
        None => false,
    }
}

/// Result of checking one record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Valid(RecordKind),
    Invalid(RecordKind, Vec<Violation>),
    /// The line was not a JSON object
    Malformed(String),
    /// No recognised type; carries the type field as found
    Skipped(String),
}

impl RecordOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, RecordOutcome::Valid(_))
    }

    /// Counts against the invalid tally
    pub fn is_invalid(&self) -> bool {
        matches!(self, RecordOutcome::Invalid(..) | RecordOutcome::Malformed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RecordOutcome::Skipped(_))
    }
}

/// Validates JSKOS records against the bundled mapping, concept and scheme schemas
#[derive(Debug)]
pub struct JskosValidator {
    mapping: CompiledSchema,
    concept: CompiledSchema,
    scheme: CompiledSchema,
}

impl JskosValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            mapping: bundled::compile(RecordKind::Mapping.schema_name())?,
            concept: bundled::compile(RecordKind::Concept.schema_name())?,
            scheme: bundled::compile(RecordKind::Scheme.schema_name())?,
        })
    }

    fn schema_for(&self, kind: RecordKind) -> &CompiledSchema {
        match kind {
            RecordKind::Mapping => &self.mapping,
            RecordKind::Concept => &self.concept,
            RecordKind::Scheme => &self.scheme,
        }
    }

    /// Validate a record as the given kind
    pub fn validate(&self, kind: RecordKind, record: &Value) -> Vec<Violation> {
        self.schema_for(kind).validate(record)
    }

    /// Classify and validate a record
    pub fn check(&self, record: &Value) -> RecordOutcome {
        if !record.is_object() {
            return RecordOutcome::Malformed("record is not a JSON object".to_string());
        }
        let Some(kind) = RecordKind::classify(record) else {
            let found = record
                .get("type")
                .or_else(|| record.get("@type"))
                .map(Value::to_string)
                .unwrap_or_else(|| "no type".to_string());
            return RecordOutcome::Skipped(found);
        };
        let violations = self.validate(kind, record);
        if violations.is_empty() {
            RecordOutcome::Valid(kind)
        } else {
            RecordOutcome::Invalid(kind, violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping() -> Value {
        json!({
            "from": { "memberSet": [{ "uri": "https://selgebali.github.io/datacite4.6-jsonld/main_context.jsonld#Creator" }] },
            "to": { "memberSet": [{ "uri": "http://schema.org/creator" }] },
            "type": ["http://www.w3.org/2004/02/skos/core#exactMatch"],
            "creator": [{ "uri": "https://github.com/selgebali" }],
            "created": "2025-07-24T00:00:00Z",
            "identifier": ["https://selgebali.github.io/datacite4.6-jsonld/jskos-mappings.json#Creator--exactMatch--http___schema.org_creator"]
        })
    }

    #[test]
    fn test_classify_by_type() {
        assert_eq!(RecordKind::classify(&mapping()), Some(RecordKind::Mapping));
        let concept = json!({ "type": ["http://www.w3.org/2004/02/skos/core#Concept"] });
        assert_eq!(RecordKind::classify(&concept), Some(RecordKind::Concept));
        assert_eq!(
            RecordKind::classify(&json!({ "@type": "skos:ConceptScheme" })),
            Some(RecordKind::Scheme)
        );
        assert_eq!(
            RecordKind::classify(&json!({ "@type": "skos:closeMatch" })),
            Some(RecordKind::Mapping)
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(RecordKind::classify(&json!({ "type": ["schema:Dataset"] })), None);
        assert_eq!(RecordKind::classify(&json!({ "uri": "http://example.org/x" })), None);
        assert_eq!(RecordKind::classify(&json!({ "type": 7 })), None);
    }

    #[test]
    fn test_type_takes_precedence_over_at_type() {
        let record = json!({ "type": ["skos:Concept"], "@type": "skos:ConceptScheme" });
        assert_eq!(RecordKind::classify(&record), Some(RecordKind::Concept));
    }

    #[test]
    fn test_valid_mapping() {
        let validator = JskosValidator::new().unwrap();
        assert_eq!(validator.check(&mapping()), RecordOutcome::Valid(RecordKind::Mapping));
    }

    #[test]
    fn test_mapping_without_from_is_invalid() {
        let validator = JskosValidator::new().unwrap();
        let mut record = mapping();
        record.as_object_mut().unwrap().remove("from");
        match validator.check(&record) {
            RecordOutcome::Invalid(RecordKind::Mapping, violations) => {
                assert!(!violations.is_empty())
            }
            other => panic!("Expected invalid mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_mapping_with_bad_created_is_invalid() {
        let validator = JskosValidator::new().unwrap();
        let mut record = mapping();
        record["created"] = json!("24 July 2025");
        let outcome = validator.check(&record);
        assert!(outcome.is_invalid());
    }

    #[test]
    fn test_concept_and_scheme() {
        let validator = JskosValidator::new().unwrap();
        let concept = json!({
            "uri": "http://example.org/concept/1",
            "type": ["http://www.w3.org/2004/02/skos/core#Concept"],
            "prefLabel": { "en": "Creator" },
            "inScheme": [{ "uri": "http://example.org/scheme" }]
        });
        assert!(validator.check(&concept).is_valid());

        let scheme = json!({
            "type": ["http://www.w3.org/2004/02/skos/core#ConceptScheme"],
            "prefLabel": { "en": "Resource types" }
        });
        assert!(validator.check(&scheme).is_invalid());
    }

    #[test]
    fn test_skipped_and_malformed() {
        let validator = JskosValidator::new().unwrap();
        assert!(validator.check(&json!({ "type": ["schema:Dataset"] })).is_skipped());
        assert!(matches!(validator.check(&json!([1, 2])), RecordOutcome::Malformed(_)));
    }
}
