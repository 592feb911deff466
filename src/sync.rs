//! Consistency check between profile `$defs` enumerations and `enum_lists/`
//!
//! For every `$defs` entry carrying both `enum` and `iriMap`:
//! 1. the enum terms equal the `iriMap` keys,
//! 2. the enum list JSON-LD file named by the `iriMap` IRIs holds exactly the
//!    same terms,
//! 3. every `iriMap` IRI sits under the published base, in that file, with a
//!    fragment naming its term.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::config::DataciteConfig;
use crate::error::{DataciteError, Result};

/// One inconsistency, tagged with the `$defs` key it was found under
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIssue {
    /// Enum terms with no `iriMap` entry
    MissingInIriMap { def: String, terms: BTreeSet<String> },
    /// `iriMap` keys that are not enum terms
    MissingInEnum { def: String, terms: BTreeSet<String> },
    EmptyIriMap { def: String },
    BadIri { def: String, reason: String },
    EnumFileNotFound { def: String, path: PathBuf },
    /// Enum terms absent from the enum list file
    MissingInEnumList { def: String, terms: BTreeSet<String> },
    /// Enum list terms absent from the profile enum
    MissingInDefs { def: String, terms: BTreeSet<String> },
    NotHttp { def: String, iri: String },
    UnexpectedBase { def: String, term: String, iri: String, expected_prefix: String },
    FragmentMismatch { def: String, term: String, fragment: String },
}

impl SyncIssue {
    pub fn def_key(&self) -> &str {
        match self {
            SyncIssue::MissingInIriMap { def, .. }
            | SyncIssue::MissingInEnum { def, .. }
            | SyncIssue::EmptyIriMap { def }
            | SyncIssue::BadIri { def, .. }
            | SyncIssue::EnumFileNotFound { def, .. }
            | SyncIssue::MissingInEnumList { def, .. }
            | SyncIssue::MissingInDefs { def, .. }
            | SyncIssue::NotHttp { def, .. }
            | SyncIssue::UnexpectedBase { def, .. }
            | SyncIssue::FragmentMismatch { def, .. } => def,
        }
    }
}

fn term_list(terms: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = terms.iter().map(|t| format!("'{}'", t)).collect();
    format!("[{}]", quoted.join(", "))
}

impl fmt::Display for SyncIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.def_key())?;
        match self {
            SyncIssue::MissingInIriMap { terms, .. } => {
                write!(f, "iriMap missing terms: {}", term_list(terms))
            }
            SyncIssue::MissingInEnum { terms, .. } => {
                write!(f, "enum missing terms: {}", term_list(terms))
            }
            SyncIssue::EmptyIriMap { .. } => write!(f, "iriMap is empty"),
            SyncIssue::BadIri { reason, .. } => write!(f, "{}", reason),
            SyncIssue::EnumFileNotFound { path, .. } => {
                write!(f, "enum JSON-LD file not found: {}", path.display())
            }
            SyncIssue::MissingInEnumList { terms, .. } => {
                write!(f, "enum_lists missing terms: {}", term_list(terms))
            }
            SyncIssue::MissingInDefs { terms, .. } => {
                write!(f, "$defs missing terms present in enum_lists: {}", term_list(terms))
            }
            SyncIssue::NotHttp { iri, .. } => write!(f, "IRI not http(s): {}", iri),
            SyncIssue::UnexpectedBase { term, iri, expected_prefix, .. } => write!(
                f,
                "Unexpected IRI base or filename for term '{}':\n  got:      {}\n  expected prefix: {}…",
                term, iri, expected_prefix
            ),
            SyncIssue::FragmentMismatch { term, fragment, .. } => write!(
                f,
                "IRI fragment '{}' does not match enum term '{}'.",
                fragment, term
            ),
        }
    }
}

/// Runs the sync check for one profile and enum list directory
#[derive(Debug, Clone)]
pub struct SyncChecker {
    profile: PathBuf,
    enum_dir: PathBuf,
    expected_base: String,
    aliases: BTreeMap<String, String>,
    ignore_suffixes: Vec<String>,
}

impl SyncChecker {
    pub fn new(
        profile: impl Into<PathBuf>,
        enum_dir: impl Into<PathBuf>,
        expected_base: impl Into<String>,
    ) -> Self {
        let defaults = crate::config::SyncConfig::default();
        Self {
            profile: profile.into(),
            enum_dir: enum_dir.into(),
            expected_base: expected_base.into(),
            aliases: defaults.aliases,
            ignore_suffixes: defaults.ignore_suffixes,
        }
    }

    pub fn from_config(config: &DataciteConfig) -> Self {
        Self {
            profile: config.paths.profile.clone(),
            enum_dir: config.paths.enum_dir.clone(),
            expected_base: config.iri.enum_base.clone(),
            aliases: config.sync.aliases.clone(),
            ignore_suffixes: config.sync.ignore_suffixes.clone(),
        }
    }

    /// Check every `$defs` entry of the profile.
    ///
    /// A missing profile or enum directory is an error; inconsistencies are
    /// returned as issues.
    pub fn run(&self) -> Result<Vec<SyncIssue>> {
        if !self.profile.is_file() {
            return Err(DataciteError::not_found("profile", &self.profile));
        }
        if !self.enum_dir.is_dir() {
            return Err(DataciteError::not_found("enum_lists dir", &self.enum_dir));
        }

        let profile = load_json(&self.profile)?;
        let mut issues = Vec::new();
        if let Some(defs) = profile.get("$defs").and_then(Value::as_object) {
            for (key, def) in defs {
                issues.extend(self.check_def(key, def)?);
            }
        }
        Ok(issues)
    }

    /// Check a single `$defs` entry; entries without `enum` and `iriMap` are ignored
    pub fn check_def(&self, key: &str, def: &Value) -> Result<Vec<SyncIssue>> {
        let (Some(enum_terms), Some(iri_map)) = (
            def.get("enum").and_then(Value::as_array),
            def.get("iriMap").and_then(Value::as_object),
        ) else {
            return Ok(Vec::new());
        };
        debug!(def = key, terms = enum_terms.len(), "checking enum");

        let def = key.to_string();
        let mut issues = Vec::new();

        let enum_set: BTreeSet<String> = enum_terms
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect();
        let iri_keys: BTreeSet<String> = iri_map.keys().cloned().collect();

        let missing_in_iri: BTreeSet<String> = enum_set.difference(&iri_keys).cloned().collect();
        let missing_in_enum: BTreeSet<String> = iri_keys.difference(&enum_set).cloned().collect();
        if !missing_in_iri.is_empty() {
            issues.push(SyncIssue::MissingInIriMap { def: def.clone(), terms: missing_in_iri });
        }
        if !missing_in_enum.is_empty() {
            issues.push(SyncIssue::MissingInEnum { def: def.clone(), terms: missing_in_enum });
        }

        let Some(sample_iri) = iri_map.values().next() else {
            issues.push(SyncIssue::EmptyIriMap { def });
            return Ok(issues);
        };
        let enum_file = match iri_filename(sample_iri) {
            Ok(name) => name,
            Err(reason) => {
                issues.push(SyncIssue::BadIri { def, reason });
                return Ok(issues);
            }
        };

        let enum_path = self.enum_dir.join(&enum_file);
        if !enum_path.is_file() {
            issues.push(SyncIssue::EnumFileNotFound { def, path: enum_path });
            return Ok(issues);
        }

        let jsonld_terms = self.extract_terms(&enum_path)?;
        let missing_in_jsonld: BTreeSet<String> =
            enum_set.difference(&jsonld_terms).cloned().collect();
        let missing_in_defs: BTreeSet<String> =
            jsonld_terms.difference(&enum_set).cloned().collect();
        if !missing_in_jsonld.is_empty() {
            issues.push(SyncIssue::MissingInEnumList {
                def: def.clone(),
                terms: missing_in_jsonld,
            });
        }
        if !missing_in_defs.is_empty() {
            issues.push(SyncIssue::MissingInDefs { def: def.clone(), terms: missing_in_defs });
        }

        self.check_iris(&def, iri_map, &mut issues);
        Ok(issues)
    }

    fn check_iris(&self, def: &str, iri_map: &Map<String, Value>, issues: &mut Vec<SyncIssue>) {
        for (term, iri) in iri_map {
            let fname = match iri_filename(iri) {
                Ok(name) => name,
                Err(reason) => {
                    issues.push(SyncIssue::BadIri { def: def.to_string(), reason });
                    continue;
                }
            };
            // iri_filename only succeeds on strings that parse
            let iri = iri.as_str().unwrap_or_default();
            if let Ok(parsed) = Url::parse(iri) {
                let http = matches!(parsed.scheme(), "http" | "https");
                if !(http && parsed.host_str().is_some_and(|h| !h.is_empty())) {
                    issues.push(SyncIssue::NotHttp { def: def.to_string(), iri: iri.to_string() });
                }
            }

            let expected_prefix = format!("{}{}#", self.expected_base, fname);
            if !iri.starts_with(&expected_prefix) {
                issues.push(SyncIssue::UnexpectedBase {
                    def: def.to_string(),
                    term: term.clone(),
                    iri: iri.to_string(),
                    expected_prefix,
                });
            }

            if let Some((_, raw_fragment)) = iri.rsplit_once('#') {
                let fragment = unquote(raw_fragment);
                if self.alias(&fragment) != self.alias(term) {
                    issues.push(SyncIssue::FragmentMismatch {
                        def: def.to_string(),
                        term: term.clone(),
                        fragment,
                    });
                }
            }
        }
    }

    fn alias<'a>(&'a self, term: &'a str) -> &'a str {
        self.aliases.get(term).map(String::as_str).unwrap_or(term)
    }

    /// Terms defined by an enum list JSON-LD file
    pub fn extract_terms(&self, path: &Path) -> Result<BTreeSet<String>> {
        let data = load_json(path)?;
        let mut terms = BTreeSet::new();
        let Some(graph) = data.get("@graph").and_then(Value::as_array) else {
            return Ok(terms);
        };

        for node in graph {
            let Some(term_id) = node.get("@id").and_then(Value::as_str) else {
                continue;
            };
            if term_id.is_empty() {
                continue;
            }
            let candidate = if term_id.contains(':') && !term_id.starts_with("http") {
                term_id.split_once(':').map(|(_, local)| local).unwrap_or(term_id)
            } else if let Some((_, fragment)) = term_id.rsplit_once('#') {
                fragment
            } else {
                term_id.rsplit('/').next().unwrap_or(term_id)
            };

            let candidate = unquote(candidate);
            if self.ignore_suffixes.iter().any(|s| candidate.ends_with(s.as_str())) {
                continue;
            }
            let candidate = self.alias(&candidate).to_string();
            if !candidate.is_empty() {
                terms.insert(candidate);
            }
        }
        Ok(terms)
    }
}

fn load_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn unquote(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// File name of the enum list an IRI points into (`…/enum_lists/<file>.jsonld#Term`)
fn iri_filename(iri: &Value) -> std::result::Result<String, String> {
    let Some(iri) = iri.as_str() else {
        return Err(format!("Cannot parse IRI '{}': not a string", iri));
    };
    let parsed = Url::parse(iri).map_err(|e| format!("Cannot parse IRI '{}': {}", iri, e))?;
    let fname = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string();
    if !fname.ends_with(".jsonld") {
        return Err(format!("IRI does not end with .jsonld path: {}", iri));
    }
    Ok(fname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://selgebali.github.io/datacite4.6-jsonld/enum_lists/";

    fn setup(enum_list: Value) -> (tempfile::TempDir, SyncChecker) {
        let dir = tempfile::tempdir().unwrap();
        let enum_dir = dir.path().join("enum_lists");
        fs::create_dir_all(&enum_dir).unwrap();
        fs::write(enum_dir.join("titleType.jsonld"), enum_list.to_string()).unwrap();
        let checker = SyncChecker::new(dir.path().join("profile.json"), enum_dir, BASE);
        (dir, checker)
    }

    fn title_list() -> Value {
        json!({
            "@graph": [
                { "@id": "dcite:TitleTypeScheme" },
                { "@id": "dcite:AlternativeTitle" },
                { "@id": "https://example.org/enum#Subtitle" },
                { "@id": "https://example.org/enum/TranslatedTitle" }
            ]
        })
    }

    fn iri(term: &str) -> String {
        format!("{}titleType.jsonld#{}", BASE, term)
    }

    #[test]
    fn test_consistent_def() {
        let (_dir, checker) = setup(title_list());
        let def = json!({
            "enum": ["AlternativeTitle", "Subtitle", "TranslatedTitle"],
            "iriMap": {
                "AlternativeTitle": iri("AlternativeTitle"),
                "Subtitle": iri("Subtitle"),
                "TranslatedTitle": iri("TranslatedTitle")
            }
        });
        assert!(checker.check_def("titleType", &def).unwrap().is_empty());
    }

    #[test]
    fn test_enum_and_iri_map_differ() {
        let (_dir, checker) = setup(title_list());
        let def = json!({
            "enum": ["AlternativeTitle", "Subtitle", "TranslatedTitle"],
            "iriMap": {
                "AlternativeTitle": iri("AlternativeTitle"),
                "Subtitle": iri("Subtitle"),
                "Other": iri("Other")
            }
        });
        let issues = checker.check_def("titleType", &def).unwrap();
        assert!(issues.contains(&SyncIssue::MissingInIriMap {
            def: "titleType".into(),
            terms: ["TranslatedTitle".to_string()].into(),
        }));
        assert!(issues.contains(&SyncIssue::MissingInEnum {
            def: "titleType".into(),
            terms: ["Other".to_string()].into(),
        }));
    }

    #[test]
    fn test_fragment_mismatch_and_base() {
        let (_dir, checker) = setup(title_list());
        let def = json!({
            "enum": ["AlternativeTitle", "Subtitle", "TranslatedTitle"],
            "iriMap": {
                "AlternativeTitle": iri("AlternativeTitle"),
                "Subtitle": iri("SubTitle"),
                "TranslatedTitle": "https://example.org/lists/titleType.jsonld#TranslatedTitle"
            }
        });
        let issues = checker.check_def("titleType", &def).unwrap();
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            SyncIssue::FragmentMismatch { term, .. } if term == "Subtitle"
        ));
        assert!(matches!(
            &issues[1],
            SyncIssue::UnexpectedBase { term, .. } if term == "TranslatedTitle"
        ));
    }

    #[test]
    fn test_alias_and_percent_decoding() {
        let (dir, checker) = setup(title_list());
        let list = json!({ "@graph": [{ "@id": "dcite:CrossrefFunderID" }, { "@id": "dcite:ROR" }] });
        fs::write(
            dir.path().join("enum_lists/funderIdentifierType.jsonld"),
            list.to_string(),
        )
        .unwrap();
        let def = json!({
            "enum": ["Crossref Funder ID", "ROR"],
            "iriMap": {
                "Crossref Funder ID": format!("{}funderIdentifierType.jsonld#Crossref%20Funder%20ID", BASE),
                "ROR": format!("{}funderIdentifierType.jsonld#ROR", BASE)
            }
        });
        assert!(checker.check_def("funderIdentifierType", &def).unwrap().is_empty());
    }

    #[test]
    fn test_missing_enum_file_and_empty_map() {
        let (_dir, checker) = setup(title_list());
        let def = json!({ "enum": ["A"], "iriMap": { "A": format!("{}nope.jsonld#A", BASE) } });
        let issues = checker.check_def("nope", &def).unwrap();
        assert!(matches!(issues[0], SyncIssue::EnumFileNotFound { .. }));

        let empty = json!({ "enum": [], "iriMap": {} });
        let issues = checker.check_def("empty", &empty).unwrap();
        assert_eq!(issues, vec![SyncIssue::EmptyIriMap { def: "empty".into() }]);
    }

    #[test]
    fn test_bad_iri() {
        let (_dir, checker) = setup(title_list());
        let def = json!({ "enum": ["A"], "iriMap": { "A": "enum_lists/titleType.json#A" } });
        let issues = checker.check_def("bad", &def).unwrap();
        assert!(matches!(
            &issues[0],
            SyncIssue::BadIri { reason, .. } if reason.starts_with("Cannot parse IRI")
        ));
    }

    #[test]
    fn test_defs_without_iri_map_are_ignored() {
        let (_dir, checker) = setup(title_list());
        assert!(checker.check_def("plain", &json!({ "enum": ["x"] })).unwrap().is_empty());
    }

    #[test]
    fn test_missing_profile() {
        let (_dir, checker) = setup(title_list());
        assert!(matches!(checker.run(), Err(DataciteError::NotFound { .. })));
    }

    #[test]
    fn test_issue_display() {
        let issue = SyncIssue::MissingInEnumList {
            def: "dateType".into(),
            terms: ["Coverage".to_string(), "Accepted".to_string()].into(),
        };
        assert_eq!(
            issue.to_string(),
            "[dateType] enum_lists missing terms: ['Accepted', 'Coverage']"
        );
    }
}
