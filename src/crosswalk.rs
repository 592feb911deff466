//! SKOS crosswalk to JSKOS mappings
//!
//! Reads the `@graph` of the SKOS crosswalk JSON-LD document and emits one
//! JSKOS mapping per `skos:*Match` statement on every `skos:Concept` node.

use std::io::Write;

use chrono::DateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DataciteConfig;
use crate::error::{DataciteError, Result};
use crate::namespace::{Namespaces, SKOS};

/// Characters left unescaped in mapping identifier fragments
const FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// SKOS mapping predicates, in output order
pub const MAPPING_PREDICATES: &[&str] = &[
    "skos:exactMatch",
    "skos:closeMatch",
    "skos:broadMatch",
    "skos:narrowMatch",
    "skos:relatedMatch",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptBundle {
    pub member_set: Vec<ResourceRef>,
}

impl ConceptBundle {
    fn single(uri: impl Into<String>) -> Self {
        Self {
            member_set: vec![ResourceRef { uri: uri.into() }],
        }
    }
}

/// A JSKOS concept mapping, serialised in JSKOS field order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JskosMapping {
    pub from: ConceptBundle,
    pub to: ConceptBundle,
    #[serde(rename = "type")]
    pub mapping_type: Vec<String>,
    pub creator: Vec<ResourceRef>,
    pub created: String,
    pub identifier: Vec<String>,
}

/// Converts SKOS crosswalk documents into JSKOS mappings
#[derive(Debug, Clone)]
pub struct CrosswalkConverter {
    namespaces: Namespaces,
    concept_base: String,
    mapping_base: String,
    creator: String,
    created: String,
}

impl CrosswalkConverter {
    /// Build a converter from configuration.
    ///
    /// Fails when the configured `created` timestamp is not RFC 3339.
    pub fn from_config(config: &DataciteConfig) -> Result<Self> {
        Self::new(
            config.namespaces(),
            &config.iri.concept_base,
            &config.iri.mapping_base,
            &config.jskos.creator,
            &config.jskos.created,
        )
    }

    pub fn new(
        namespaces: Namespaces,
        concept_base: &str,
        mapping_base: &str,
        creator: &str,
        created: &str,
    ) -> Result<Self> {
        DateTime::parse_from_rfc3339(created).map_err(|e| DataciteError::InvalidTimestamp {
            value: created.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            namespaces,
            concept_base: concept_base.to_string(),
            mapping_base: mapping_base.to_string(),
            creator: creator.to_string(),
            created: created.to_string(),
        })
    }

    /// Replace the `created` stamp
    pub fn with_created(mut self, created: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(created).map_err(|e| DataciteError::InvalidTimestamp {
            value: created.to_string(),
            reason: e.to_string(),
        })?;
        self.created = created.to_string();
        Ok(self)
    }

    /// Convert a crosswalk JSON-LD document
    pub fn convert(&self, document: &Value) -> Vec<JskosMapping> {
        let Some(graph) = document.get("@graph").and_then(Value::as_array) else {
            warn!("crosswalk document has no @graph");
            return Vec::new();
        };

        let mut mappings = Vec::new();
        for node in graph.iter().filter(|n| is_skos_concept(n)) {
            let Some(raw_id) = node.get("@id").and_then(Value::as_str) else {
                warn!("skipping skos:Concept without @id");
                continue;
            };
            // rsplit always yields at least one item
            let local_id = raw_id.rsplit(':').next().unwrap_or(raw_id);
            let concept_uri = format!("{}#{}", self.concept_base, local_id);

            for predicate in MAPPING_PREDICATES {
                let Some(value) = node.get(*predicate) else {
                    continue;
                };
                let targets: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    single => vec![single],
                };
                for target in targets {
                    match self.target_uri(target) {
                        Some(uri) => {
                            mappings.push(self.mapping(local_id, &concept_uri, predicate, uri))
                        }
                        None => warn!(
                            "skipping mapping from {} to invalid target: {}",
                            concept_uri, target
                        ),
                    }
                }
            }
        }

        debug!("converted {} mappings", mappings.len());
        mappings
    }

    fn target_uri(&self, target: &Value) -> Option<String> {
        let raw = match target {
            Value::Object(obj) => obj
                .get("@id")
                .or_else(|| obj.get("id"))
                .and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }?;
        if raw.is_empty() {
            return None;
        }
        Some(self.namespaces.expand(raw))
    }

    fn mapping(
        &self,
        local_id: &str,
        concept_uri: &str,
        predicate: &str,
        uri: String,
    ) -> JskosMapping {
        let relation = predicate.trim_start_matches("skos:");
        let fragment = format!("{}--{}--{}", local_id, relation, uri).replace([':', '/'], "_");
        let identifier = format!(
            "{}#{}",
            self.mapping_base,
            utf8_percent_encode(&fragment, FRAGMENT)
        );

        JskosMapping {
            from: ConceptBundle::single(concept_uri),
            to: ConceptBundle::single(uri),
            mapping_type: vec![format!("{}{}", SKOS, relation)],
            creator: vec![ResourceRef {
                uri: self.creator.clone(),
            }],
            created: self.created.clone(),
            identifier: vec![identifier],
        }
    }
}

fn is_skos_concept(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == "skos:Concept",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("skos:Concept")),
        _ => false,
    }
}

/// Write mappings as NDJSON, one compact object per line
pub fn write_ndjson<W: Write>(mappings: &[JskosMapping], mut out: W) -> Result<()> {
    for mapping in mappings {
        serde_json::to_writer(&mut out, mapping)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn converter() -> CrosswalkConverter {
        CrosswalkConverter::from_config(&DataciteConfig::default()).unwrap()
    }

    #[test]
    fn test_single_and_list_targets() {
        let doc = json!({
            "@graph": [
                {
                    "@id": "datacite:Creator",
                    "@type": "skos:Concept",
                    "skos:exactMatch": "schema:creator",
                    "skos:closeMatch": [
                        { "@id": "dcterms:creator" },
                        { "id": "http://www.wikidata.org/entity/P50" }
                    ]
                },
                { "@id": "datacite:Scheme", "@type": "skos:ConceptScheme", "skos:exactMatch": "schema:Thing" }
            ]
        });
        let mappings = converter().convert(&doc);
        assert_eq!(mappings.len(), 3);

        assert_eq!(
            mappings[0].from.member_set[0].uri,
            "https://selgebali.github.io/datacite4.6-jsonld/main_context.jsonld#Creator"
        );
        assert_eq!(mappings[0].to.member_set[0].uri, "http://schema.org/creator");
        assert_eq!(
            mappings[0].mapping_type,
            vec!["http://www.w3.org/2004/02/skos/core#exactMatch"]
        );
        assert_eq!(mappings[1].to.member_set[0].uri, "http://purl.org/dc/terms/creator");
        assert_eq!(mappings[2].to.member_set[0].uri, "http://www.wikidata.org/entity/P50");
        assert_eq!(
            mappings[2].mapping_type,
            vec!["http://www.w3.org/2004/02/skos/core#closeMatch"]
        );
    }

    #[test]
    fn test_identifier_fragment() {
        let doc = json!({
            "@graph": [{ "@id": "dc:Title", "@type": "skos:Concept", "skos:exactMatch": "schema:name" }]
        });
        let mappings = converter().convert(&doc);
        assert_eq!(
            mappings[0].identifier,
            vec!["https://selgebali.github.io/datacite4.6-jsonld/jskos-mappings.json#Title--exactMatch--http___schema.org_name"]
        );
    }

    #[test]
    fn test_fragment_escapes_reserved_characters() {
        let doc = json!({
            "@graph": [{ "@id": "dc:Size", "@type": "skos:Concept", "skos:relatedMatch": "http://example.org/a b?c" }]
        });
        let mappings = converter().convert(&doc);
        assert!(mappings[0].identifier[0]
            .ends_with("#Size--relatedMatch--http___example.org_a%20b%3Fc"));
    }

    #[test]
    fn test_invalid_targets_are_skipped() {
        let doc = json!({
            "@graph": [{
                "@id": "dc:Format",
                "@type": "skos:Concept",
                "skos:broadMatch": [{ "label": "no id" }, 42, "", "dcat:mediaType"]
            }]
        });
        let mappings = converter().convert(&doc);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].to.member_set[0].uri, "http://www.w3.org/ns/dcat#mediaType");
    }

    #[test]
    fn test_missing_graph() {
        assert!(converter().convert(&json!({ "@context": {} })).is_empty());
    }

    #[test]
    fn test_serialized_field_order() {
        let doc = json!({
            "@graph": [{ "@id": "dc:Language", "@type": "skos:Concept", "skos:exactMatch": "dcterms:language" }]
        });
        let mappings = converter().convert(&doc);
        let mut out = Vec::new();
        write_ndjson(&mappings, &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with("{\"from\":{\"memberSet\":[{\"uri\":"));
        assert!(line.ends_with("]}\n"));
        let keys: Vec<String> = serde_json::from_str::<Value>(line.trim())
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["from", "to", "type", "creator", "created", "identifier"]);
    }

    #[test]
    fn test_bad_created_timestamp() {
        let result = converter().with_created("yesterday");
        assert!(matches!(result, Err(DataciteError::InvalidTimestamp { .. })));
    }
}
