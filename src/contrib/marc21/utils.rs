//! Helpers shared by the MARC21 rule packs.

use crate::ordered_record::OrderedRecord;
use crate::value::Value;
use thiserror::Error;

/// A field value did not have the shape a rule expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field '{key}' {expected}")]
pub struct FieldShapeError {
    /// Key of the offending field
    pub key: String,
    /// What the rule expected
    pub expected: &'static str,
}

/// Borrow `value` as a subfield record.
///
/// # Errors
///
/// Returns [`FieldShapeError`] if `value` is not a record.
pub fn subfields<'a>(key: &str, value: &'a Value) -> Result<&'a OrderedRecord, FieldShapeError> {
    value.as_record().ok_or_else(|| FieldShapeError {
        key: key.to_string(),
        expected: "is not a subfield record",
    })
}

/// Text of `value`.
///
/// # Errors
///
/// Returns [`FieldShapeError`] if `value` is not a scalar.
pub fn text(key: &str, value: &Value) -> Result<String, FieldShapeError> {
    value.to_text().ok_or_else(|| FieldShapeError {
        key: key.to_string(),
        expected: "does not hold text",
    })
}

/// Copy subfields in occurrence order, renaming each code through `table`.
///
/// Repeated codes stay repeated under their name. Codes missing from `table`
/// are dropped.
#[must_use]
pub fn named_subfields(subfields: &OrderedRecord, table: &[(&str, &str)]) -> OrderedRecord {
    let mut out = OrderedRecord::new();
    for (code, value) in subfields.iter_repeated() {
        if let Some((_, name)) = table.iter().find(|(c, _)| *c == code) {
            out.push(*name, value.clone());
        }
    }
    out
}

/// Append the subfields of a record built by [`named_subfields`] to `out`,
/// in occurrence order, under their codes.
///
/// Names missing from `table`, such as indicator labels, are skipped.
pub fn coded_subfields(named: &OrderedRecord, table: &[(&str, &str)], out: &mut OrderedRecord) {
    for (name, value) in named.iter_repeated() {
        if let Some((code, _)) = table.iter().find(|(_, n)| *n == name) {
            out.push(*code, value.clone());
        }
    }
}

/// Indicator characters of a `tag + ind1 + ind2` key; missing ones are blank.
#[must_use]
pub fn indicators(key: &str) -> (char, char) {
    let mut chars = key.chars().skip(3);
    (chars.next().unwrap_or(' '), chars.next().unwrap_or(' '))
}

/// Label for an indicator code; unknown codes are kept as the raw character.
#[must_use]
pub fn label(table: &[(char, &str)], code: char) -> Value {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map_or_else(|| Value::from(code.to_string()), |(_, l)| Value::from(*l))
}

/// Indicator code for a label produced by [`label`].
#[must_use]
pub fn code(table: &[(char, &str)], label: Option<&Value>) -> char {
    let Some(text) = label.and_then(Value::as_str) else {
        return ' ';
    };
    if let Some((c, _)) = table.iter().find(|(_, l)| *l == text) {
        return *c;
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => ' ',
    }
}

/// Start a reverse-direction subfield record carrying indicators.
#[must_use]
pub fn with_indicators(ind1: char, ind2: char) -> OrderedRecord {
    let mut record = OrderedRecord::new();
    record.push(crate::marcxml::IND1_KEY, ind1.to_string());
    record.push(crate::marcxml::IND2_KEY, ind2.to_string());
    record
}
