//! Citation-format equivalents of `resourceTypeGeneral`

use serde::Serialize;
use serde_json::{Map, Value};

/// RIS, BibTeX, CiteProc and Schema.org type names for a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCrosswalk {
    pub ris: &'static str,
    pub bibtex: &'static str,
    pub citeproc: &'static str,
    pub schema_org: &'static str,
}

const FALLBACK: TypeCrosswalk = TypeCrosswalk {
    ris: "GEN",
    bibtex: "misc",
    citeproc: "other",
    schema_org: "CreativeWork",
};

impl TypeCrosswalk {
    /// Look up a `resourceTypeGeneral` value, case-insensitively.
    ///
    /// Types without a dedicated entry map to generic values.
    pub fn for_general(resource_type_general: &str) -> Self {
        let general = resource_type_general.to_lowercase();
        let (ris, bibtex, citeproc, schema_org) = match general.as_str() {
            "dataset" => ("DATA", "misc", "dataset", "Dataset"),
            "collection" => ("GEN", "misc", "dataset", "Collection"),
            "text" => ("GEN", "article", "article", "ScholarlyArticle"),
            "audiovisual" => ("AV", "misc", "motion_picture", "VideoObject"),
            "image" => ("IMAGE", "misc", "graphic", "ImageObject"),
            "software" => ("COMP", "software", "software", "SoftwareSourceCode"),
            "other" => ("GEN", "misc", "other", "CreativeWork"),
            _ => return FALLBACK,
        };
        Self {
            ris,
            bibtex,
            citeproc,
            schema_org,
        }
    }

    /// Add the four entries to a `types` object
    pub fn extend(&self, types: &mut Map<String, Value>) {
        types.insert("ris".to_string(), Value::from(self.ris));
        types.insert("bibtex".to_string(), Value::from(self.bibtex));
        types.insert("citeproc".to_string(), Value::from(self.citeproc));
        types.insert("schemaOrg".to_string(), Value::from(self.schema_org));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        let dataset = TypeCrosswalk::for_general("Dataset");
        assert_eq!(dataset.ris, "DATA");
        assert_eq!(dataset.schema_org, "Dataset");
        assert_eq!(TypeCrosswalk::for_general("SOFTWARE").citeproc, "software");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(TypeCrosswalk::for_general("JournalArticle"), FALLBACK);
        assert_eq!(TypeCrosswalk::for_general(""), FALLBACK);
    }

    #[test]
    fn test_serialized_keys() {
        let value = serde_json::to_value(TypeCrosswalk::for_general("Image")).unwrap();
        assert_eq!(value["schemaOrg"], "ImageObject");
    }
}
