//! DataCite 4.6 JSON-LD Tooling
//!
//! Tools that produce and check the linked-data artifacts of the DataCite 4.6
//! metadata schema: JSON-LD contexts, JSON Schema profiles, controlled
//! vocabulary lists and SKOS/JSKOS crosswalks.
//!
//! ## Features
//!
//! - **JSKOS Validation**: Classify NDJSON records as mappings, concepts or
//!   schemes and validate each against the JSKOS schemas
//! - **Crosswalk Conversion**: Turn the SKOS crosswalk into JSKOS mappings
//! - **Enumeration Sync**: Keep profile `$defs` enums, `iriMap` tables and
//!   `enum_lists/` JSON-LD files consistent
//! - **XML Conversion**: DataCite kernel-4 XML to the REST API's JSON:API form
//! - **Profile Validation**: Validate documents against bundled JSON Schemas
//!
//! ## Layout
//!
//! ```text
//! schemas/
//! ├── jskos/
//! │   ├── mapping.schema.json
//! │   ├── concept.schema.json
//! │   └── scheme.schema.json
//! └── datacite/
//!     ├── doi-submission.schema.json
//!     └── doi-response.schema.json
//! ```

pub mod config;
pub mod convert;
pub mod crosswalk;
pub mod error;
pub mod jskos;
pub mod namespace;
pub mod profile;
pub mod schema;
pub mod sync;

pub use config::DataciteConfig;
pub use convert::build_json_from_xml;
pub use crosswalk::{CrosswalkConverter, JskosMapping};
pub use error::{DataciteError, Result};
pub use jskos::{JskosValidator, RecordKind, RecordOutcome, ValidationSummary};
pub use namespace::Namespaces;
pub use profile::ProfileValidator;
pub use schema::{CompiledSchema, Violation};
pub use sync::{SyncChecker, SyncIssue};
