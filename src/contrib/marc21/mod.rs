//! MARC21 bibliographic rule packs.
//!
//! [`Marc21`] maps a record loaded by [`marcxml`](crate::marcxml) to a
//! JSON-like record with descriptive field names; [`ToMarc21`] maps such a
//! record back to MARC21 fields. Subfields keep their order and repetitions:
//! each occurrence becomes one entry under its descriptive name. Together the
//! packs round-trip the fields and subfield codes they cover:
//!
//! | Tag | Output name |
//! |-----|-------------|
//! | leader | `leader` |
//! | 001 | `control_number` |
//! | 005 | `date_and_time_of_latest_transaction` |
//! | 020 | `international_standard_book_number` |
//! | 100 | `main_entry_personal_name` |
//! | 245 | `title_statement` |
//! | 650 | `subject_added_entry_topical_term` |
//! | 700 | `added_entry_personal_name` |
//!
//! # Examples
//!
//! ```
//! use marcdo::contrib::marc21;
//! use marcdo::marcxml;
//!
//! # fn main() -> marcdo::Result<()> {
//! let xml = r#"<record>
//!     <datafield tag="100" ind1="1" ind2=" ">
//!         <subfield code="a">Donges, Jonathan F</subfield>
//!     </datafield>
//! </record>"#;
//!
//! let record = marcxml::load_record(xml)?;
//! let json = marc21::marc21().apply(&record)?;
//! assert_eq!(json.order(), ["main_entry_personal_name"]);
//!
//! let back = marc21::to_marc21().apply(&json)?;
//! let xml = marcxml::dump_record(&back)?;
//! assert_eq!(marcxml::load_record(&xml)?, record);
//! # Ok(())
//! # }
//! ```

mod fields;
mod to_marc21;
pub mod utils;

pub use fields::Marc21;
pub use to_marc21::ToMarc21;

use crate::overdo::Overdo;

/// First indicator of 100/700: type of personal name entry element.
pub const TYPE_OF_PERSONAL_NAME: &[(char, &str)] =
    &[('0', "Forename"), ('1', "Surname"), ('3', "Family name")];

/// First indicator of 245: title added entry.
pub const TITLE_ADDED_ENTRY: &[(char, &str)] = &[('0', "No added entry"), ('1', "Added entry")];

/// Second indicator of 245: nonfiling characters, kept as the digit itself.
pub const NONFILING_CHARACTERS: &[(char, &str)] = &[];

/// First indicator of 650: level of subject.
pub const LEVEL_OF_SUBJECT: &[(char, &str)] = &[
    (' ', "No information provided"),
    ('0', "No level specified"),
    ('1', "Primary"),
    ('2', "Secondary"),
];

/// Second indicator of 650: thesaurus.
pub const THESAURUS: &[(char, &str)] = &[
    ('0', "Library of Congress Subject Headings"),
    ('1', "LC subject headings for children's literature"),
    ('2', "Medical Subject Headings"),
    ('3', "National Agricultural Library subject authority file"),
    ('4', "Source not specified"),
    ('5', "Canadian Subject Headings"),
    ('6', "Répertoire de vedettes-matière"),
    ('7', "Source specified in subfield $2"),
];

/// 020 subfield codes and their output names.
pub const ISBN_SUBFIELDS: &[(&str, &str)] = &[
    ("a", "international_standard_book_number"),
    ("c", "terms_of_availability"),
    ("q", "qualifying_information"),
];

/// 100/700 subfield codes and their output names.
pub const PERSONAL_NAME_SUBFIELDS: &[(&str, &str)] = &[
    ("a", "personal_name"),
    ("b", "numeration"),
    ("c", "titles_and_words_associated_with_a_name"),
    ("d", "dates_associated_with_a_name"),
    ("e", "relator_term"),
    ("q", "fuller_form_of_name"),
];

/// 245 subfield codes and their output names.
pub const TITLE_STATEMENT_SUBFIELDS: &[(&str, &str)] = &[
    ("a", "title"),
    ("b", "remainder_of_title"),
    ("c", "statement_of_responsibility"),
    ("f", "inclusive_dates"),
    ("h", "medium"),
    ("n", "number_of_part_section_of_a_work"),
    ("p", "name_of_part_section_of_a_work"),
];

/// 650 subfield codes and their output names.
pub const TOPICAL_TERM_SUBFIELDS: &[(&str, &str)] = &[
    ("a", "topical_term_or_geographic_name_entry_element"),
    ("v", "form_subdivision"),
    ("x", "general_subdivision"),
    ("y", "chronological_subdivision"),
    ("z", "geographic_subdivision"),
    ("0", "authority_record_control_number"),
    ("2", "source_of_heading_or_term"),
];

/// Dispatcher for MARC21 → JSON.
#[must_use]
pub fn marc21() -> Overdo {
    Overdo::new().with_provider(Marc21)
}

/// Dispatcher for JSON → MARC21.
#[must_use]
pub fn to_marc21() -> Overdo {
    Overdo::new().with_provider(ToMarc21)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marcxml;
    use crate::value::Value;

    const RECORD: &str = r#"<record>
        <leader>01142cam  2200301 a 4500</leader>
        <controlfield tag="001">92005291</controlfield>
        <datafield tag="020" ind1=" " ind2=" ">
            <subfield code="a">0262031418</subfield>
            <subfield code="a">0070131430</subfield>
        </datafield>
        <datafield tag="100" ind1="1" ind2=" ">
            <subfield code="a">Cormen, Thomas H.</subfield>
            <subfield code="e">author.</subfield>
            <subfield code="e">editor.</subfield>
        </datafield>
        <datafield tag="245" ind1="1" ind2="0">
            <subfield code="a">Introduction to algorithms /</subfield>
            <subfield code="c">Thomas H. Cormen ... [et al.].</subfield>
        </datafield>
        <datafield tag="650" ind1=" " ind2="0">
            <subfield code="a">Computer programming.</subfield>
        </datafield>
        <datafield tag="650" ind1=" " ind2="0">
            <subfield code="a">Computer algorithms.</subfield>
            <subfield code="x">History</subfield>
            <subfield code="v">Juvenile literature.</subfield>
            <subfield code="x">Study and teaching.</subfield>
        </datafield>
    </record>"#;

    #[test]
    fn test_forward_output_shape() {
        let record = marcxml::load_record(RECORD).unwrap();
        let output = marc21().apply(&record).unwrap();
        assert_eq!(
            output.order(),
            [
                "leader",
                "control_number",
                "international_standard_book_number",
                "main_entry_personal_name",
                "title_statement",
                "subject_added_entry_topical_term",
                "subject_added_entry_topical_term",
            ]
        );
        assert_eq!(output.get_str("control_number"), Some("92005291"));
        assert_eq!(
            output
                .get("subject_added_entry_topical_term")
                .and_then(Value::as_list)
                .map(<[_]>::len),
            Some(2)
        );
        assert!(marc21().find_missing_rules(&record).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_through_json() {
        let record = marcxml::load_record(RECORD).unwrap();
        let output = marc21().apply(&record).unwrap();

        let reloaded = crate::json::load(&crate::json::dump(&output)).unwrap();
        let back = to_marc21().apply(&reloaded[0]).unwrap();
        let restored = marcxml::load_record(&marcxml::dump_record(&back).unwrap()).unwrap();

        assert_eq!(restored, record);

        let subject = restored.get_all("650 0")[1].as_record().unwrap();
        let codes: Vec<&str> = subject.iter_repeated().map(|(k, _)| k).collect();
        assert_eq!(codes, ["a", "x", "v", "x"]);
        let isbn = restored.get("020  ").and_then(Value::as_record).unwrap();
        assert_eq!(isbn.get_all("a").len(), 2);
    }

    #[test]
    fn test_unknown_tags_are_reported() {
        let xml = r#"<record>
            <datafield tag="856" ind1="4" ind2="0">
                <subfield code="u">http://example.org</subfield>
            </datafield>
        </record>"#;
        let record = marcxml::load_record(xml).unwrap();
        assert_eq!(marc21().find_missing_rules(&record).unwrap(), ["85640"]);
        assert!(marc21().apply(&record).unwrap().is_empty());
    }
}
