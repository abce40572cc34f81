//! MARCXML → JSON → MARCXML round trips through files using the MARC21 packs.

use marcdo::contrib::marc21::{marc21, to_marc21, THESAURUS};
use marcdo::{json, marcxml, MarcError, OrderedRecord, Overdo, OverdoConfig, Value};
use std::fs::File;
use std::io::Write;
use tempfile::NamedTempFile;

const COLLECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<marc:collection xmlns:marc="http://www.loc.gov/MARC21/slim">
  <marc:record>
    <marc:leader>01142cam  2200301 a 4500</marc:leader>
    <marc:controlfield tag="001">92005291</marc:controlfield>
    <marc:controlfield tag="005">19930521155141.9</marc:controlfield>
    <marc:datafield tag="020" ind1=" " ind2=" ">
      <marc:subfield code="a">0262031418</marc:subfield>
      <marc:subfield code="q">alk. paper</marc:subfield>
      <marc:subfield code="a">0070131430</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="100" ind1="1" ind2=" ">
      <marc:subfield code="a">Cormen, Thomas H.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="245" ind1="1" ind2="0">
      <marc:subfield code="a">Introduction to algorithms /</marc:subfield>
      <marc:subfield code="c">Thomas H. Cormen ... [et al.].</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="650" ind1=" " ind2="0">
      <marc:subfield code="a">Computer programming.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="650" ind1=" " ind2="0">
      <marc:subfield code="a">Computer algorithms.</marc:subfield>
      <marc:subfield code="x">History.</marc:subfield>
      <marc:subfield code="v">Bibliography.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="700" ind1="1" ind2=" ">
      <marc:subfield code="a">Leiserson, Charles E.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="700" ind1="1" ind2=" ">
      <marc:subfield code="a">Rivest, Ronald L.</marc:subfield>
    </marc:datafield>
  </marc:record>
  <marc:record>
    <marc:controlfield tag="001">2001012345</marc:controlfield>
    <marc:datafield tag="245" ind1="0" ind2="4">
      <marc:subfield code="a">The art of computer programming.</marc:subfield>
    </marc:datafield>
  </marc:record>
</marc:collection>"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

#[test]
fn test_collection_round_trip_through_files() {
    let xml_file = write_temp(COLLECTION);
    let records = marcxml::read_collection(File::open(xml_file.path()).unwrap()).unwrap();
    assert_eq!(records.len(), 2);

    let forward = marc21();
    let converted: Vec<OrderedRecord> = records
        .iter()
        .map(|record| forward.apply(record))
        .collect::<marcdo::Result<_>>()
        .unwrap();

    let json_file = NamedTempFile::new().unwrap();
    json::write_all(&converted, File::create(json_file.path()).unwrap()).unwrap();
    let reloaded = json::read_all(File::open(json_file.path()).unwrap()).unwrap();
    assert_eq!(reloaded, converted);

    let backward = to_marc21();
    let restored: Vec<OrderedRecord> = reloaded
        .iter()
        .map(|record| backward.apply(record))
        .collect::<marcdo::Result<_>>()
        .unwrap();

    let dumped = marcxml::dump_collection(&restored).unwrap();
    assert_eq!(marcxml::load_collection(&dumped).unwrap(), records);
}

#[test]
fn test_forward_output_keeps_interleaved_order() {
    let records = marcxml::load_collection(COLLECTION).unwrap();
    let output = marc21().apply(&records[0]).unwrap();
    let text = serde_json::to_value(&output).unwrap();

    assert_eq!(
        text["__order__"],
        serde_json::json!([
            "leader",
            "control_number",
            "date_and_time_of_latest_transaction",
            "international_standard_book_number",
            "main_entry_personal_name",
            "title_statement",
            "subject_added_entry_topical_term",
            "subject_added_entry_topical_term",
            "added_entry_personal_name",
            "added_entry_personal_name",
        ])
    );
    // Only nested records with a repeated subfield carry an order member.
    assert!(text["title_statement"].get("__order__").is_none());
    assert_eq!(
        text["international_standard_book_number"][0]["__order__"],
        serde_json::json!([
            "international_standard_book_number",
            "terms_of_availability",
            "international_standard_book_number",
        ])
    );
}

#[test]
fn test_thesaurus_label_lookup() {
    let records = marcxml::load_collection(COLLECTION).unwrap();
    let output = marc21().apply(&records[0]).unwrap();

    let subjects = output
        .get("subject_added_entry_topical_term")
        .and_then(Value::as_list)
        .unwrap();
    let lcsh = THESAURUS
        .iter()
        .find(|(code, _)| *code == '0')
        .map(|(_, label)| *label)
        .unwrap();
    for subject in subjects {
        let text = serde_json::to_string(&subject.to_json()).unwrap();
        assert!(text.contains(lcsh), "missing thesaurus label in {text}");
    }
}

#[test]
fn test_extending_marc21_with_local_fields() {
    let xml = r#"<record>
        <controlfield tag="001">local-1</controlfield>
        <datafield tag="590" ind1=" " ind2=" ">
            <subfield code="a">Gift of the author.</subfield>
        </datafield>
    </record>"#;
    let record = marcxml::load_record(xml).unwrap();

    let strict = Overdo::with_bases(&[&marc21()], OverdoConfig::new().with_strict_mode(true));
    assert!(matches!(
        strict.apply(&record),
        Err(MarcError::MissingRule(key)) if key == "590  "
    ));

    let mut local = Overdo::with_bases(&[&marc21()], OverdoConfig::new().with_strict_mode(true));
    local.over("local_note", &["^590.."], |_, _, value| {
        let note = value.as_record().and_then(|sf| sf.get_str("a")).unwrap_or_default();
        Ok(marcdo::Outcome::emit(note))
    });
    let output = local.apply(&record).unwrap();
    assert_eq!(output.order(), ["control_number", "local_note"]);
    assert_eq!(output.get_str("local_note"), Some("Gift of the author."));
}
