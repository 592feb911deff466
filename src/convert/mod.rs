//! DataCite kernel-4 XML to the JSON:API form of the DataCite REST API
//!
//! The output mirrors `GET /dois/{doi}`: a `data` resource of type `dois`
//! whose `attributes` carry the metadata, plus the original XML encoded as
//! base64 under `attributes.xml`. XML attributes spelled `…URI` become
//! `…Uri` keys.

mod types;
mod xml;

pub use types::TypeCrosswalk;
pub use xml::Element;

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;

type Object = Map<String, Value>;

const XML_LANG: &str = "xml:lang";

fn doi_pattern() -> &'static Regex {
    static DOI: OnceLock<Regex> = OnceLock::new();
    DOI.get_or_init(|| Regex::new(r"^10\.\d{4,9}/\S+$").unwrap())
}

/// Convert a DataCite XML document into its JSON:API representation
pub fn build_json_from_xml(xml: &str) -> Result<Value> {
    let root = Element::parse(xml)?;
    if root.name != "resource" {
        warn!("root element is <{}>, expected <resource>", root.name);
    }

    let doi = root.child_text("identifier");
    match doi {
        Some(doi) if !doi_pattern().is_match(doi) => {
            warn!("identifier {} does not look like a DOI", doi)
        }
        None => warn!("record has no identifier"),
        _ => {}
    }

    let mut attributes = Object::new();
    attributes.insert("doi".into(), nullable(doi));
    if let Some((prefix, suffix)) = doi.and_then(|d| d.split_once('/')) {
        if !prefix.is_empty() {
            attributes.insert("prefix".into(), prefix.into());
        }
        if !suffix.is_empty() {
            attributes.insert("suffix".into(), suffix.into());
        }
    }

    // Alternate identifiers are mirrored into `identifiers`
    let mut identifiers = Vec::new();
    let mut alternate_identifiers = Vec::new();
    for alt in root.find_path(&["alternateIdentifiers", "alternateIdentifier"]) {
        let id = nullable(alt.text());
        let id_type = nullable(alt.attr("alternateIdentifierType"));
        let mut alt_obj = Object::new();
        alt_obj.insert("alternateIdentifier".into(), id.clone());
        alt_obj.insert("alternateIdentifierType".into(), id_type.clone());
        alternate_identifiers.push(Value::Object(alt_obj));

        let mut id_obj = Object::new();
        id_obj.insert("identifier".into(), id);
        id_obj.insert("identifierType".into(), id_type);
        identifiers.push(Value::Object(id_obj));
    }
    put_list(&mut attributes, "identifiers", identifiers);
    put_list(&mut attributes, "alternateIdentifiers", alternate_identifiers);

    let creators = root
        .find_path(&["creators", "creator"])
        .into_iter()
        .map(convert_creator)
        .collect();
    put_list(&mut attributes, "creators", creators);

    let titles = root.find_path(&["titles", "title"]).into_iter().map(convert_title).collect();
    put_list(&mut attributes, "titles", titles);

    if let Some(publisher) = root.find("publisher") {
        let mut obj = Object::new();
        obj.insert("name".into(), nullable(publisher.text()));
        put_nonempty_attrs(
            &mut obj,
            publisher,
            &[
                (XML_LANG, "lang"),
                ("publisherIdentifier", "publisherIdentifier"),
                ("publisherIdentifierScheme", "publisherIdentifierScheme"),
                ("schemeURI", "schemeUri"),
            ],
        );
        attributes.insert("publisher".into(), Value::Object(obj));
    }

    let resource_type = root.find("resourceType");
    let resource_type_general = resource_type.and_then(|rt| rt.attr("resourceTypeGeneral"));

    let container = convert_container(&root, resource_type_general);
    if !container.is_empty() {
        attributes.insert("container".into(), Value::Object(container));
    }

    if let Some(year) = root.child_text("publicationYear") {
        let value = match year.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::from(year),
        };
        attributes.insert("publicationYear".into(), value);
    }

    let subjects = root
        .find_path(&["subjects", "subject"])
        .into_iter()
        .map(convert_subject)
        .collect();
    put_list(&mut attributes, "subjects", subjects);

    let contributors = root
        .find_path(&["contributors", "contributor"])
        .into_iter()
        .map(convert_contributor)
        .collect();
    put_list(&mut attributes, "contributors", contributors);

    let dates = root.find_path(&["dates", "date"]).into_iter().map(convert_date).collect();
    put_list(&mut attributes, "dates", dates);

    if let Some(language) = root.child_text("language") {
        attributes.insert("language".into(), language.into());
    }

    if let Some(rt) = resource_type {
        let mut types = Object::new();
        put_text(&mut types, "resourceType", rt.text());
        if let Some(general) = resource_type_general {
            types.insert("resourceTypeGeneral".into(), general.into());
            TypeCrosswalk::for_general(general).extend(&mut types);
        }
        if !types.is_empty() {
            attributes.insert("types".into(), Value::Object(types));
        }
    }

    let related_identifiers = root
        .find_path(&["relatedIdentifiers", "relatedIdentifier"])
        .into_iter()
        .map(convert_related_identifier)
        .collect();
    put_list(&mut attributes, "relatedIdentifiers", related_identifiers);

    let related_items = root
        .find_path(&["relatedItems", "relatedItem"])
        .into_iter()
        .map(convert_related_item)
        .collect();
    put_list(&mut attributes, "relatedItems", related_items);

    put_list(&mut attributes, "sizes", texts(&root, &["sizes", "size"]));
    put_list(&mut attributes, "formats", texts(&root, &["formats", "format"]));

    if let Some(version) = root.child_text("version") {
        attributes.insert("version".into(), version.into());
    }

    let rights = root
        .find_path(&["rightsList", "rights"])
        .into_iter()
        .map(convert_rights)
        .collect();
    put_list(&mut attributes, "rightsList", rights);

    let descriptions = root
        .find_path(&["descriptions", "description"])
        .into_iter()
        .map(convert_description)
        .collect();
    put_list(&mut attributes, "descriptions", descriptions);

    let geo_locations = root
        .find_path(&["geoLocations", "geoLocation"])
        .into_iter()
        .map(convert_geolocation)
        .collect();
    put_list(&mut attributes, "geoLocations", geo_locations);

    let funding = root
        .find_path(&["fundingReferences", "fundingReference"])
        .into_iter()
        .filter_map(convert_funding_reference)
        .collect();
    put_list(&mut attributes, "fundingReferences", funding);

    attributes.insert("xml".into(), STANDARD.encode(xml.as_bytes()).into());
    debug!("converted record with {} attributes", attributes.len());

    let mut data = Object::new();
    data.insert("id".into(), nullable(doi.map(str::to_lowercase).as_deref()));
    data.insert("type".into(), "dois".into());
    data.insert("attributes".into(), Value::Object(attributes));

    let mut record = Object::new();
    record.insert("data".into(), Value::Object(data));
    Ok(Value::Object(record))
}

fn nullable(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn put_text(obj: &mut Object, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        obj.insert(key.to_string(), value.into());
    }
}

fn put_list(obj: &mut Object, key: &str, items: Vec<Value>) {
    if !items.is_empty() {
        obj.insert(key.to_string(), Value::Array(items));
    }
}

/// Copy attributes that are present, even when empty
fn put_attrs(obj: &mut Object, elem: &Element, pairs: &[(&str, &str)]) {
    for (xml_attr, json_key) in pairs {
        put_text(obj, json_key, elem.attr(xml_attr));
    }
}

/// Copy attributes that are present and non-empty
fn put_nonempty_attrs(obj: &mut Object, elem: &Element, pairs: &[(&str, &str)]) {
    for (xml_attr, json_key) in pairs {
        put_text(obj, json_key, elem.attr(xml_attr).filter(|v| !v.is_empty()));
    }
}

fn texts(root: &Element, path: &[&str]) -> Vec<Value> {
    root.find_path(path)
        .into_iter()
        .filter_map(Element::text)
        .map(Value::from)
        .collect()
}

fn convert_name_identifier(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("nameIdentifier".into(), nullable(elem.text()));
    obj.insert("nameIdentifierScheme".into(), nullable(elem.attr("nameIdentifierScheme")));
    obj.insert("schemeUri".into(), nullable(elem.attr("schemeURI")));
    Value::Object(obj)
}

/// Affiliations without identifier data collapse to their name
fn convert_affiliation(elem: &Element) -> Value {
    let name = elem.text();
    let identifier = elem.attr("affiliationIdentifier");
    let scheme = elem.attr("affiliationIdentifierScheme");
    let scheme_uri = elem.attr("schemeURI");

    let has_identifier_data = [identifier, scheme, scheme_uri]
        .iter()
        .any(|v| v.is_some_and(|s| !s.is_empty()));
    if let (Some(name), false) = (name, has_identifier_data) {
        return Value::from(name);
    }

    let mut obj = Object::new();
    obj.insert("name".into(), nullable(name));
    obj.insert("affiliationIdentifier".into(), nullable(identifier));
    obj.insert("affiliationIdentifierScheme".into(), nullable(scheme));
    obj.insert("schemeUri".into(), nullable(scheme_uri));
    Value::Object(obj)
}

/// Shared by creators and contributors; the name element is
/// `creatorName` or `contributorName`.
fn convert_creator(elem: &Element) -> Value {
    Value::Object(person(elem))
}

fn person(elem: &Element) -> Object {
    let name_elem = elem.find("creatorName").or_else(|| elem.find("contributorName"));

    let mut obj = Object::new();
    obj.insert("name".into(), nullable(name_elem.and_then(Element::text)));
    obj.insert("nameType".into(), nullable(name_elem.and_then(|n| n.attr("nameType"))));
    obj.insert("givenName".into(), nullable(elem.child_text("givenName")));
    obj.insert("familyName".into(), nullable(elem.child_text("familyName")));

    let name_ids = elem.find_all("nameIdentifier").map(convert_name_identifier).collect();
    put_list(&mut obj, "nameIdentifiers", name_ids);
    let affiliations = elem.find_all("affiliation").map(convert_affiliation).collect();
    put_list(&mut obj, "affiliation", affiliations);
    obj
}

fn convert_contributor(elem: &Element) -> Value {
    let mut obj = person(elem);
    put_nonempty_attrs(&mut obj, elem, &[("contributorType", "contributorType")]);
    Value::Object(obj)
}

fn convert_title(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("title".into(), nullable(elem.text()));
    put_nonempty_attrs(&mut obj, elem, &[(XML_LANG, "lang"), ("titleType", "titleType")]);
    Value::Object(obj)
}

fn convert_subject(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("subject".into(), nullable(elem.text()));
    put_nonempty_attrs(&mut obj, elem, &[(XML_LANG, "lang")]);
    put_attrs(
        &mut obj,
        elem,
        &[
            ("subjectScheme", "subjectScheme"),
            ("schemeURI", "schemeUri"),
            ("valueURI", "valueUri"),
            ("classificationCode", "classificationCode"),
        ],
    );
    Value::Object(obj)
}

fn convert_date(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("date".into(), nullable(elem.text()));
    put_nonempty_attrs(
        &mut obj,
        elem,
        &[("dateType", "dateType"), ("dateInformation", "dateInformation")],
    );
    Value::Object(obj)
}

fn convert_related_identifier(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("relatedIdentifier".into(), nullable(elem.text()));
    put_attrs(
        &mut obj,
        elem,
        &[
            ("relatedIdentifierType", "relatedIdentifierType"),
            ("relationType", "relationType"),
            ("relatedMetadataScheme", "relatedMetadataScheme"),
            ("schemeURI", "schemeUri"),
            ("schemeType", "schemeType"),
            ("resourceTypeGeneral", "resourceTypeGeneral"),
        ],
    );
    Value::Object(obj)
}

fn convert_related_item(elem: &Element) -> Value {
    let mut obj = Object::new();
    put_attrs(
        &mut obj,
        elem,
        &[("relatedItemType", "relatedItemType"), ("relationType", "relationType")],
    );

    if let Some(rid) = elem.find("relatedItemIdentifier") {
        let mut rid_obj = Object::new();
        rid_obj.insert("relatedItemIdentifier".into(), nullable(rid.text()));
        put_attrs(
            &mut rid_obj,
            rid,
            &[
                ("relatedItemIdentifierType", "relatedItemIdentifierType"),
                ("relatedMetadataScheme", "relatedMetadataScheme"),
                ("schemeURI", "schemeUri"),
                ("schemeType", "schemeType"),
            ],
        );
        obj.insert("relatedItemIdentifier".into(), Value::Object(rid_obj));
    }

    let creators = elem
        .find_path(&["creators", "creator"])
        .into_iter()
        .map(convert_creator)
        .collect();
    put_list(&mut obj, "creators", creators);
    let titles = elem.find_path(&["titles", "title"]).into_iter().map(convert_title).collect();
    put_list(&mut obj, "titles", titles);

    put_text(&mut obj, "publicationYear", elem.child_text("publicationYear"));
    for tag in ["volume", "issue", "number", "firstPage", "lastPage", "publisher", "edition"] {
        put_text(&mut obj, tag, elem.child_text(tag));
        if tag == "number" {
            if let Some(number) = elem.find("number") {
                put_nonempty_attrs(&mut obj, number, &[("numberType", "numberType")]);
            }
        }
    }

    let contributors = elem
        .find_path(&["contributors", "contributor"])
        .into_iter()
        .map(convert_contributor)
        .collect();
    put_list(&mut obj, "contributors", contributors);
    Value::Object(obj)
}

fn convert_rights(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("rights".into(), nullable(elem.text()));
    put_nonempty_attrs(
        &mut obj,
        elem,
        &[
            (XML_LANG, "lang"),
            ("rightsURI", "rightsUri"),
            ("schemeURI", "schemeUri"),
            ("rightsIdentifier", "rightsIdentifier"),
            ("rightsIdentifierScheme", "rightsIdentifierScheme"),
        ],
    );
    Value::Object(obj)
}

fn convert_description(elem: &Element) -> Value {
    let mut obj = Object::new();
    obj.insert("description".into(), nullable(elem.text()));
    put_nonempty_attrs(
        &mut obj,
        elem,
        &[(XML_LANG, "lang"), ("descriptionType", "descriptionType")],
    );
    Value::Object(obj)
}

fn convert_point(elem: &Element) -> Object {
    let mut point = Object::new();
    put_text(&mut point, "pointLatitude", elem.child_text("pointLatitude"));
    put_text(&mut point, "pointLongitude", elem.child_text("pointLongitude"));
    point
}

fn convert_geolocation(elem: &Element) -> Value {
    let mut obj = Object::new();
    put_text(&mut obj, "geoLocationPlace", elem.child_text("geoLocationPlace"));

    if let Some(point_elem) = elem.find("geoLocationPoint") {
        let point = convert_point(point_elem);
        if !point.is_empty() {
            obj.insert("geoLocationPoint".into(), Value::Object(point));
        }
    }

    if let Some(box_elem) = elem.find("geoLocationBox") {
        let mut bounds = Object::new();
        for tag in [
            "westBoundLongitude",
            "eastBoundLongitude",
            "southBoundLatitude",
            "northBoundLatitude",
        ] {
            put_text(&mut bounds, tag, box_elem.child_text(tag));
        }
        if !bounds.is_empty() {
            obj.insert("geoLocationBox".into(), Value::Object(bounds));
        }
    }

    if let Some(polygon_elem) = elem.find("geoLocationPolygon") {
        let points: Vec<Value> = polygon_elem
            .find_all("polygonPoint")
            .map(convert_point)
            .filter(|p| !p.is_empty())
            .map(|p| {
                let mut wrapper = Object::new();
                wrapper.insert("polygonPoint".into(), Value::Object(p));
                Value::Object(wrapper)
            })
            .collect();
        put_list(&mut obj, "geoLocationPolygon", points);
    }

    Value::Object(obj)
}

fn convert_funding_reference(elem: &Element) -> Option<Value> {
    let mut obj = Object::new();
    put_text(&mut obj, "funderName", elem.child_text("funderName"));

    if let Some(funder_id) = elem.find("funderIdentifier") {
        obj.insert("funderIdentifier".into(), nullable(funder_id.text()));
        put_nonempty_attrs(
            &mut obj,
            funder_id,
            &[("funderIdentifierType", "funderIdentifierType"), ("schemeURI", "schemeUri")],
        );
    }

    if let Some(award_number) = elem.find("awardNumber") {
        obj.insert("awardNumber".into(), nullable(award_number.text()));
        put_nonempty_attrs(&mut obj, award_number, &[("awardURI", "awardUri")]);
    }

    put_text(&mut obj, "awardTitle", elem.child_text("awardTitle"));

    if obj.is_empty() {
        None
    } else {
        Some(Value::Object(obj))
    }
}

/// `container` is derived: a repository type for datasets, the first PURL
/// related identifier and the first `SeriesInformation` description
fn convert_container(root: &Element, resource_type_general: Option<&str>) -> Object {
    let mut container = Object::new();
    if resource_type_general.is_some_and(|g| g.eq_ignore_ascii_case("dataset")) {
        container.insert("type".into(), "DataRepository".into());
    }

    let purl = root
        .find_path(&["relatedIdentifiers", "relatedIdentifier"])
        .into_iter()
        .find(|ri| ri.attr("relatedIdentifierType") == Some("PURL"));
    if let Some(purl) = purl {
        container.insert("identifier".into(), nullable(purl.text()));
        container.insert("identifierType".into(), nullable(purl.attr("relatedIdentifierType")));
    }

    let series = root
        .find_path(&["descriptions", "description"])
        .into_iter()
        .find(|d| d.attr("descriptionType") == Some("SeriesInformation"));
    if let Some(series) = series {
        container.insert("title".into(), nullable(series.text()));
    }
    container
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<resource xmlns="http://datacite.org/schema/kernel-4">
  <identifier identifierType="DOI">10.82433/B09Z-4K37</identifier>
  <creators>
    <creator>
      <creatorName nameType="Personal">Garcia, Sofia</creatorName>
      <givenName>Sofia</givenName>
      <familyName>Garcia</familyName>
      <affiliation>Example University</affiliation>
      <affiliation affiliationIdentifier="https://ror.org/04wxnsj81" affiliationIdentifierScheme="ROR" schemeURI="https://ror.org">ExampleOrg</affiliation>
    </creator>
  </creators>
  <titles><title xml:lang="en">Example Title</title></titles>
  <publisher>Example Publisher</publisher>
  <publicationYear>2022</publicationYear>
  <resourceType resourceTypeGeneral="Dataset">Census Data</resourceType>
</resource>"#;

    #[test]
    fn test_identifier_and_envelope() {
        let json = build_json_from_xml(MINIMAL).unwrap();
        assert_eq!(json["data"]["id"], "10.82433/b09z-4k37");
        assert_eq!(json["data"]["type"], "dois");
        let attrs = &json["data"]["attributes"];
        assert_eq!(attrs["doi"], "10.82433/B09Z-4K37");
        assert_eq!(attrs["prefix"], "10.82433");
        assert_eq!(attrs["suffix"], "B09Z-4K37");
        assert_eq!(attrs["publicationYear"], 2022);
    }

    #[test]
    fn test_creator_affiliations() {
        let json = build_json_from_xml(MINIMAL).unwrap();
        let creator = &json["data"]["attributes"]["creators"][0];
        assert_eq!(creator["name"], "Garcia, Sofia");
        assert_eq!(creator["nameType"], "Personal");
        assert_eq!(creator["affiliation"][0], "Example University");
        assert_eq!(creator["affiliation"][1]["affiliationIdentifierScheme"], "ROR");
        assert_eq!(creator["affiliation"][1]["schemeUri"], "https://ror.org");
        assert!(creator.get("nameIdentifiers").is_none());
    }

    #[test]
    fn test_types_and_container() {
        let json = build_json_from_xml(MINIMAL).unwrap();
        let attrs = &json["data"]["attributes"];
        assert_eq!(attrs["types"]["resourceType"], "Census Data");
        assert_eq!(attrs["types"]["ris"], "DATA");
        assert_eq!(attrs["types"]["schemaOrg"], "Dataset");
        assert_eq!(attrs["container"]["type"], "DataRepository");
        assert_eq!(attrs["titles"][0]["lang"], "en");
        assert_eq!(attrs["publisher"]["name"], "Example Publisher");
    }

    #[test]
    fn test_xml_is_embedded() {
        let json = build_json_from_xml(MINIMAL).unwrap();
        let encoded = json["data"]["attributes"]["xml"].as_str().unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), MINIMAL);
    }

    #[test]
    fn test_missing_identifier() {
        let xml = "<resource><publicationYear>c. 1900</publicationYear></resource>";
        let json = build_json_from_xml(xml).unwrap();
        assert!(json["data"]["id"].is_null());
        assert!(json["data"]["attributes"]["doi"].is_null());
        assert_eq!(json["data"]["attributes"]["publicationYear"], "c. 1900");
        assert!(json["data"]["attributes"].get("prefix").is_none());
    }

    #[test]
    fn test_attribute_order() {
        let json = build_json_from_xml(MINIMAL).unwrap();
        let keys: Vec<&str> = json["data"]["attributes"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "doi",
                "prefix",
                "suffix",
                "creators",
                "titles",
                "publisher",
                "container",
                "publicationYear",
                "types",
                "xml",
            ]
        );
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(build_json_from_xml("<resource><identifier></resource>").is_err());
    }
}
