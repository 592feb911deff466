//! Namespace prefixes, CURIE expansion and JSON-LD `@context` documents

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Vocabulary of DataCite kernel-4 property names
pub const DATACITE_VOCAB: &str = "http://datacite.org/schema/kernel-4#";

pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";

const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("schema", "http://schema.org/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("skos", SKOS),
    ("wd", "http://www.wikidata.org/entity/"),
    ("dcat", "http://www.w3.org/ns/dcat#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// Prefix table used for CURIE expansion and context generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    prefixes: BTreeMap<String, String>,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            prefixes: BUILTIN_PREFIXES
                .iter()
                .map(|(p, iri)| (p.to_string(), iri.to_string()))
                .collect(),
        }
    }
}

impl Namespaces {
    /// Built-in prefixes with `overrides` added on top
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut namespaces = Self::default();
        for (prefix, iri) in overrides {
            namespaces.insert(prefix.clone(), iri.clone());
        }
        namespaces
    }

    pub fn insert(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, iri)| (p.as_str(), iri.as_str()))
    }

    /// Expand a CURIE such as `schema:identifier` to a full IRI.
    ///
    /// Absolute `http(s)` IRIs, strings without a colon and CURIEs with an
    /// unknown prefix are returned unchanged.
    pub fn expand(&self, curie: &str) -> String {
        if curie.starts_with("http") {
            return curie.to_string();
        }
        match curie.split_once(':') {
            Some((prefix, local)) => match self.get(prefix) {
                Some(base) => format!("{}{}", base, local),
                None => curie.to_string(),
            },
            None => curie.to_string(),
        }
    }

    /// The `@context` object: DataCite as `@vocab` plus every prefix
    pub fn context(&self) -> Value {
        let mut context = Map::new();
        context.insert("@vocab".to_string(), Value::String(DATACITE_VOCAB.to_string()));
        for (prefix, iri) in self.iter() {
            context.insert(prefix.to_string(), Value::String(iri.to_string()));
        }
        Value::Object(context)
    }

    /// Wrap a record's fields in a JSON-LD document of the given `@type`.
    ///
    /// Non-object records are placed under `value`.
    pub fn to_jsonld(&self, record: Value, jsonld_type: &str) -> Value {
        let mut doc = Map::new();
        doc.insert("@context".to_string(), self.context());
        doc.insert("@type".to_string(), Value::String(jsonld_type.to_string()));
        match record {
            Value::Object(fields) => {
                for (key, value) in fields {
                    doc.insert(key, value);
                }
            }
            other => {
                doc.insert("value".to_string(), other);
            }
        }
        Value::Object(doc)
    }
}
