//! MARCXML loading into, and dumping from, [`OrderedRecord`]s.
//!
//! Standard MARCXML, as defined by the Library of Congress
//! (<https://www.loc.gov/standards/marcxml/>), is turned into the keyed form
//! rules are written against:
//!
//! - `<leader>` becomes the key `leader`;
//! - `<controlfield tag="001">` becomes the key `001` with the text as value;
//! - `<datafield tag="650" ind1=" " ind2="0">` becomes the key `650 0`
//!   (tag followed by both indicator characters) with a nested record mapping
//!   each subfield code to its value.
//!
//! Because indicators are kept verbatim, a pattern such as `^650..` matches a
//! 650 field with any indicators, while `^650.0` only matches LCSH headings.
//!
//! For loading, default-namespace (`<record xmlns="...">`), prefix-namespace
//! (`<marc:record xmlns:marc="...">`) and namespace-free forms are accepted.
//!
//! # Examples
//!
//! ```
//! use marcdo::marcxml;
//!
//! # fn main() -> marcdo::Result<()> {
//! let xml = r#"<record>
//!     <leader>01142cam  2200301 a 4500</leader>
//!     <datafield tag="100" ind1="1" ind2=" ">
//!         <subfield code="a">Donges, Jonathan F</subfield>
//!     </datafield>
//! </record>"#;
//!
//! let record = marcxml::load_record(xml)?;
//! let field = record.get("1001 ").and_then(|v| v.as_record()).unwrap();
//! assert_eq!(field.get_str("a"), Some("Donges, Jonathan F"));
//! # Ok(())
//! # }
//! ```

use crate::error::{MarcError, Result};
use crate::ordered_record::OrderedRecord;
use crate::value::Value;
use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use quick_xml::se::to_string as xml_to_string;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The MARCXML namespace URI.
const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Key under which the leader is stored.
pub const LEADER_KEY: &str = "leader";

/// Subfield entries carrying indicators when a field is keyed by tag alone.
pub const IND1_KEY: &str = "$ind1";
/// See [`IND1_KEY`].
pub const IND2_KEY: &str = "$ind2";

lazy_static! {
    static ref XMLNS_DECL: Regex = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#).unwrap();
    static ref NS_PREFIX: Regex = Regex::new(r"<(/?)(\w+):").unwrap();
}

/// MARCXML record representation for serialization.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "record")]
pub struct MarcxmlRecord {
    /// MARC leader string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    /// Control fields (tags 001-009)
    #[serde(default)]
    pub controlfield: Vec<MarcxmlControlField>,
    /// Data fields (tags 010+)
    #[serde(default)]
    pub datafield: Vec<MarcxmlDataField>,
}

/// MARCXML control field representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlControlField {
    /// Field tag as an XML attribute (e.g., "001", "008")
    #[serde(rename = "@tag")]
    pub tag: String,
    /// Control field value (text content)
    #[serde(rename = "$value", default)]
    pub value: String,
}

/// MARCXML data field representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlDataField {
    /// Field tag as an XML attribute (e.g., "245", "650")
    #[serde(rename = "@tag")]
    pub tag: String,
    /// First indicator as an XML attribute
    #[serde(rename = "@ind1", default)]
    pub ind1: String,
    /// Second indicator as an XML attribute
    #[serde(rename = "@ind2", default)]
    pub ind2: String,
    /// Subfields
    #[serde(default)]
    pub subfield: Vec<MarcxmlSubfield>,
}

/// MARCXML subfield representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlSubfield {
    /// Subfield code as an XML attribute (e.g., "a", "b", "c")
    #[serde(rename = "@code")]
    pub code: String,
    /// Subfield value (text content)
    #[serde(rename = "$value", default)]
    pub value: String,
}

/// MARCXML collection wrapper for multiple records.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "collection")]
pub struct MarcxmlCollection {
    /// Records in the collection
    #[serde(default, rename = "record")]
    pub records: Vec<MarcxmlRecord>,
}

/// Strip XML namespace prefixes and declarations from MARCXML input.
///
/// Handles both `marc:record` → `record` (prefixed namespace) and
/// `xmlns="..."` / `xmlns:marc="..."` (namespace declarations).
fn strip_marcxml_ns(xml: &str) -> String {
    let stripped = XMLNS_DECL.replace_all(xml, "");
    NS_PREFIX.replace_all(&stripped, "<$1").to_string()
}

/// Dispatch key for a data field: the tag followed by both indicators.
///
/// Missing indicators are taken as blanks.
#[must_use]
pub fn field_key(tag: &str, ind1: char, ind2: char) -> String {
    format!("{tag}{ind1}{ind2}")
}

fn indicator(raw: &str) -> char {
    raw.chars().next().unwrap_or(' ')
}

// ---------------------------------------------------------------------------
// Loading: MARCXML → OrderedRecord
// ---------------------------------------------------------------------------

/// Parse a single MARCXML `<record>` into a keyed record.
///
/// # Errors
///
/// Returns an error if the XML is invalid or a subfield lacks its code.
pub fn load_record(xml: &str) -> Result<OrderedRecord> {
    let cleaned = strip_marcxml_ns(xml);
    let xml_record: MarcxmlRecord = xml_from_str(&cleaned)
        .map_err(|e| MarcError::ParseError(format!("Failed to parse MARCXML: {e}")))?;
    build_record(xml_record)
}

/// Parse a MARCXML `<collection>` into keyed records.
///
/// # Errors
///
/// Returns an error if the XML is invalid or a subfield lacks its code.
pub fn load_collection(xml: &str) -> Result<Vec<OrderedRecord>> {
    let cleaned = strip_marcxml_ns(xml);
    let collection: MarcxmlCollection = xml_from_str(&cleaned)
        .map_err(|e| MarcError::ParseError(format!("Failed to parse MARCXML collection: {e}")))?;

    collection.records.into_iter().map(build_record).collect()
}

/// Read a whole MARCXML `<collection>` document from `reader`.
///
/// # Errors
///
/// Returns an error if reading fails or the XML is invalid.
pub fn read_collection<R: Read>(mut reader: R) -> Result<Vec<OrderedRecord>> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;
    load_collection(&xml)
}

/// Assemble a keyed record from a deserialized `MarcxmlRecord`.
fn build_record(xml_record: MarcxmlRecord) -> Result<OrderedRecord> {
    let mut record = OrderedRecord::new();

    if let Some(leader) = xml_record.leader {
        record.push(LEADER_KEY, leader);
    }

    for cf in xml_record.controlfield {
        record.push(cf.tag, cf.value);
    }

    for df in xml_record.datafield {
        let mut subfields = OrderedRecord::new();
        for sf in df.subfield {
            if sf.code.is_empty() {
                return Err(MarcError::InvalidField(format!(
                    "Missing subfield code in field {}",
                    df.tag
                )));
            }
            subfields.push(sf.code, sf.value);
        }

        let key = field_key(&df.tag, indicator(&df.ind1), indicator(&df.ind2));
        record.push(key, subfields);
    }

    Ok(record)
}

// ---------------------------------------------------------------------------
// Dumping: OrderedRecord → MARCXML
// ---------------------------------------------------------------------------

/// Convert a keyed record to a MARCXML `<record>` string.
///
/// Accepted keys, visited in occurrence order:
///
/// - `leader`;
/// - a three character tag with a text value (control field);
/// - a three character tag with a subfield record, whose indicators come from
///   its `$ind1`/`$ind2` entries, or a list of such records;
/// - a five character `tag + ind1 + ind2` key with a subfield record.
///
/// Subfield values that are lists emit one subfield per item. Keys starting
/// with `__` are metadata and skipped.
///
/// # Errors
///
/// Returns an error if a key or value cannot be expressed as MARCXML.
pub fn dump_record(record: &OrderedRecord) -> Result<String> {
    let body = xml_to_string(&to_marcxml_record(record)?)
        .map_err(|e| MarcError::ParseError(format!("Failed to serialize to MARCXML: {e}")))?;

    let body = body.replacen("<record>", &format!("<record xmlns=\"{MARCXML_NS}\">"), 1);

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}"))
}

/// Convert keyed records to a MARCXML `<collection>` string.
///
/// # Errors
///
/// Returns an error if any record cannot be expressed as MARCXML.
pub fn dump_collection(records: &[OrderedRecord]) -> Result<String> {
    let collection = MarcxmlCollection {
        records: records
            .iter()
            .map(to_marcxml_record)
            .collect::<Result<Vec<_>>>()?,
    };
    let body = xml_to_string(&collection).map_err(|e| {
        MarcError::ParseError(format!("Failed to serialize MARCXML collection: {e}"))
    })?;
    let body = body.replacen(
        "<collection>",
        &format!("<collection xmlns=\"{MARCXML_NS}\">"),
        1,
    );
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}"))
}

fn to_marcxml_record(record: &OrderedRecord) -> Result<MarcxmlRecord> {
    let mut xml_record = MarcxmlRecord::default();

    for (key, value) in record.iter_repeated() {
        if key.starts_with("__") {
            continue;
        }
        if key == LEADER_KEY {
            xml_record.leader = value.to_text();
            continue;
        }

        let tag: String = key.chars().take(3).collect();
        let inds: Vec<char> = key.chars().skip(3).collect();
        if tag.chars().count() != 3 || !(inds.is_empty() || inds.len() == 2) {
            return Err(MarcError::InvalidField(format!(
                "Cannot map key '{key}' to a MARC tag"
            )));
        }

        match value {
            Value::Record(subfields) => {
                xml_record
                    .datafield
                    .push(to_datafield(&tag, inds.first().zip(inds.get(1)), subfields)?);
            },
            Value::List(items) if inds.is_empty() => {
                for item in items {
                    let subfields = item.as_record().ok_or_else(|| {
                        MarcError::InvalidField(format!(
                            "Field {tag} items must be subfield records"
                        ))
                    })?;
                    xml_record.datafield.push(to_datafield(&tag, None, subfields)?);
                }
            },
            other => {
                let text = other.to_text().ok_or_else(|| {
                    MarcError::InvalidField(format!("Control field {key} must hold text"))
                })?;
                xml_record.controlfield.push(MarcxmlControlField { tag, value: text });
            },
        }
    }

    Ok(xml_record)
}

fn to_datafield(
    tag: &str,
    indicators: Option<(&char, &char)>,
    subfields: &OrderedRecord,
) -> Result<MarcxmlDataField> {
    let (ind1, ind2) = match indicators {
        Some((i1, i2)) => (i1.to_string(), i2.to_string()),
        None => (
            subfields
                .get(IND1_KEY)
                .and_then(Value::to_text)
                .unwrap_or_else(|| " ".to_string()),
            subfields
                .get(IND2_KEY)
                .and_then(Value::to_text)
                .unwrap_or_else(|| " ".to_string()),
        ),
    };

    let mut subfield = Vec::new();
    for (code, value) in subfields.iter_repeated() {
        if code.starts_with('$') || code.starts_with("__") {
            continue;
        }
        let items: Vec<&Value> = match value {
            Value::List(items) => items.iter().collect(),
            single => vec![single],
        };
        for item in items {
            if item.is_null() {
                continue;
            }
            let text = item.to_text().ok_or_else(|| {
                MarcError::InvalidField(format!("Subfield {tag}${code} must hold text"))
            })?;
            subfield.push(MarcxmlSubfield {
                code: code.to_string(),
                value: text,
            });
        }
    }

    Ok(MarcxmlDataField {
        tag: tag.to_string(),
        ind1,
        ind2,
        subfield,
    })
}
