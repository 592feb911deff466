//! Configuration for the DataCite tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (datacite.toml)
//! - Environment variables (DATACITE__*)
//!
//! ## Example config file (datacite.toml):
//! ```toml
//! [paths]
//! profile = "docs/datacite4.6-profile.json"
//! enum_dir = "docs/enum_lists"
//! mappings = "jskos-mappings.ndjson"
//!
//! [iri]
//! enum_base = "https://selgebali.github.io/datacite4.6-jsonld/enum_lists/"
//!
//! [jskos]
//! creator = "https://github.com/selgebali"
//! created = "2025-07-24T00:00:00Z"
//!
//! [namespaces]
//! ror = "https://ror.org/"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::namespace::Namespaces;

const SITE_BASE: &str = "https://selgebali.github.io/datacite4.6-jsonld/";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataciteConfig {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Published IRI bases
    #[serde(default)]
    pub iri: IriConfig,

    /// Provenance stamped on generated JSKOS mappings
    #[serde(default)]
    pub jskos: JskosConfig,

    /// Enumeration sync check settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Extra or overriding CURIE prefixes
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Profile JSON Schema carrying `$defs` enums and `iriMap` tables
    #[serde(default = "default_profile")]
    pub profile: PathBuf,

    /// Directory of controlled vocabulary JSON-LD files
    #[serde(default = "default_enum_dir")]
    pub enum_dir: PathBuf,

    /// NDJSON file of JSKOS records
    #[serde(default = "default_mappings")]
    pub mappings: PathBuf,

    /// SKOS crosswalk JSON-LD document
    #[serde(default = "default_crosswalk")]
    pub crosswalk: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IriConfig {
    /// Base every `iriMap` value must start with
    #[serde(default = "default_enum_base")]
    pub enum_base: String,

    /// Document whose fragments identify crosswalk concepts
    #[serde(default = "default_concept_base")]
    pub concept_base: String,

    /// Document whose fragments identify generated mappings
    #[serde(default = "default_mapping_base")]
    pub mapping_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JskosConfig {
    #[serde(default = "default_creator")]
    pub creator: String,

    /// RFC 3339 timestamp
    #[serde(default = "default_created")]
    pub created: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Term spellings treated as equal (fragment form -> enum form)
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,

    /// Enum list nodes with these suffixes are scheme containers, not terms
    #[serde(default = "default_ignore_suffixes")]
    pub ignore_suffixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

// Default value functions
fn default_profile() -> PathBuf {
    PathBuf::from("docs/datacite4.6-profile.json")
}

fn default_enum_dir() -> PathBuf {
    PathBuf::from("docs/enum_lists")
}

fn default_mappings() -> PathBuf {
    PathBuf::from("jskos-mappings.ndjson")
}

fn default_crosswalk() -> PathBuf {
    PathBuf::from("SKOScrosswalk.jsonld")
}

fn default_enum_base() -> String {
    format!("{}enum_lists/", SITE_BASE)
}

fn default_concept_base() -> String {
    format!("{}main_context.jsonld", SITE_BASE)
}

fn default_mapping_base() -> String {
    format!("{}jskos-mappings.json", SITE_BASE)
}

fn default_creator() -> String {
    "https://github.com/selgebali".to_string()
}

fn default_created() -> String {
    "2025-07-24T00:00:00Z".to_string()
}

fn default_aliases() -> BTreeMap<String, String> {
    [("CrossrefFunderID".to_string(), "Crossref Funder ID".to_string())].into()
}

fn default_ignore_suffixes() -> Vec<String> {
    vec!["Scheme".to_string()]
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            enum_dir: default_enum_dir(),
            mappings: default_mappings(),
            crosswalk: default_crosswalk(),
        }
    }
}

impl Default for IriConfig {
    fn default() -> Self {
        Self {
            enum_base: default_enum_base(),
            concept_base: default_concept_base(),
            mapping_base: default_mapping_base(),
        }
    }
}

impl Default for JskosConfig {
    fn default() -> Self {
        Self {
            creator: default_creator(),
            created: default_created(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            ignore_suffixes: default_ignore_suffixes(),
        }
    }
}

/// Tables whose keys must keep their case
#[derive(Debug, Default, Deserialize)]
struct CaseSensitiveTables {
    sync: Option<AliasTable>,
    namespaces: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct AliasTable {
    aliases: Option<BTreeMap<String, String>>,
}

impl DataciteConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        let mut files: Vec<PathBuf> = Vec::new();

        let config_locations = ["datacite.toml", ".datacite.toml", "config/datacite.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
            files.push(PathBuf::from(location));
        }

        let project_dirs = directories::ProjectDirs::from("org", "datacite", "datacite-jsonld");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("datacite.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config.clone()).required(false));
                files.push(xdg_config);
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
            let explicit = PathBuf::from(path);
            if explicit.is_file() {
                files.push(explicit);
            } else {
                files.push(explicit.with_extension("toml"));
            }
        }

        // DATACITE__PATHS__PROFILE=... and friends
        builder = builder.add_source(
            Environment::with_prefix("DATACITE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.restore_key_case(&files)?;
        Ok(config)
    }

    /// `config` lowercases map keys; alias terms and CURIE prefixes are
    /// case-sensitive, so these two tables are re-read from the files.
    fn restore_key_case(&mut self, files: &[PathBuf]) -> Result<(), ConfigError> {
        let mut aliases: Option<BTreeMap<String, String>> = None;
        let mut namespaces: Option<BTreeMap<String, String>> = None;

        for path in files.iter().filter(|p| p.is_file()) {
            let text =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Foreign(Box::new(e)))?;
            let tables: CaseSensitiveTables =
                toml::from_str(&text).map_err(|e| ConfigError::Foreign(Box::new(e)))?;

            if let Some(file_aliases) = tables.sync.and_then(|s| s.aliases) {
                aliases.get_or_insert_with(BTreeMap::new).extend(file_aliases);
            }
            if let Some(file_namespaces) = tables.namespaces {
                namespaces.get_or_insert_with(BTreeMap::new).extend(file_namespaces);
            }
        }

        if let Some(aliases) = aliases {
            self.sync.aliases = aliases;
        }
        if let Some(namespaces) = namespaces {
            self.namespaces = namespaces;
        }
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Built-in prefixes merged with the configured ones
    pub fn namespaces(&self) -> Namespaces {
        Namespaces::with_overrides(&self.namespaces)
    }
}
