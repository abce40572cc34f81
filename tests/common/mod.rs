//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use marcdo::{OrderedRecord, Outcome, TransformResult, Value};

/// Build a subfield record from `(code, value)` pairs.
pub fn subfields(pairs: &[(&str, &str)]) -> OrderedRecord {
    pairs.iter().copied().collect()
}

/// Add a data field keyed by tag and indicators.
pub fn add_field(
    record: &mut OrderedRecord,
    tag: &str,
    ind1: char,
    ind2: char,
    pairs: &[(&str, &str)],
) {
    record.push(format!("{tag}{ind1}{ind2}"), subfields(pairs));
}

/// Transform that stores the input value unchanged.
pub fn echo(_: &OrderedRecord, _: &str, value: &Value) -> TransformResult {
    Ok(Outcome::Emit(value.clone()))
}

/// Transform that stores the key it was called with.
pub fn key_of(_: &OrderedRecord, key: &str, _: &Value) -> TransformResult {
    Ok(Outcome::emit(key))
}

/// Creates a realistic keyed record for dispatch testing.
///
/// Includes a control field, a title, two LCSH subjects (650), a geographic
/// subject (651), and name entries (100, 700, 710).
pub fn create_realistic_record() -> OrderedRecord {
    let mut record = OrderedRecord::new();
    record.push("001", "12345");

    add_field(&mut record, "100", '1', ' ', &[("a", "Fitzgerald, F. Scott"), ("d", "1896-1940")]);
    add_field(
        &mut record,
        "245",
        '1',
        '4',
        &[("a", "The Great Gatsby"), ("c", "F. Scott Fitzgerald")],
    );

    // Add multiple 650 fields (LCSH subjects)
    add_field(&mut record, "650", ' ', '0', &[("a", "Novels"), ("x", "American")]);
    add_field(&mut record, "651", ' ', '0', &[("a", "United States"), ("x", "Fiction")]);
    add_field(&mut record, "650", ' ', '0', &[("a", "Coming of age"), ("x", "Fiction")]);

    add_field(&mut record, "700", '1', ' ', &[("a", "Gatsby, Jay")]);
    add_field(&mut record, "710", '2', ' ', &[("a", "Scribner")]);

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_realistic_record_has_expected_fields() {
        let record = create_realistic_record();
        // 001, 100, 245, 650 (2x), 651, 700, 710 = 8 occurrences
        assert_eq!(record.order().len(), 8);
        assert_eq!(record.get_all("650 0").len(), 2);
    }
}
