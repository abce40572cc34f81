//! MARC21 bibliographic fields → JSON.

use super::utils::{indicators, label, named_subfields, subfields, text};
use super::{
    ISBN_SUBFIELDS, LEVEL_OF_SUBJECT, NONFILING_CHARACTERS, PERSONAL_NAME_SUBFIELDS, THESAURUS,
    TITLE_ADDED_ENTRY, TITLE_STATEMENT_SUBFIELDS, TOPICAL_TERM_SUBFIELDS, TYPE_OF_PERSONAL_NAME,
};
use crate::ordered_record::OrderedRecord;
use crate::rule::{Outcome, Rule, RuleProvider, TransformResult};
use crate::value::Value;

/// Rule pack turning MARC21 bibliographic records keyed by `tag + indicators`
/// into JSON-like records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Marc21;

impl RuleProvider for Marc21 {
    fn name(&self) -> &str {
        "marc21"
    }

    fn provide_rules(&self) -> Vec<Rule> {
        vec![
            Rule::new("^leader$", "leader", control_text),
            Rule::new("^001", "control_number", control_text),
            Rule::new("^005", "date_and_time_of_latest_transaction", control_text),
            Rule::new("^020..", "international_standard_book_number", isbn).accumulating(),
            Rule::new("^100..", "main_entry_personal_name", personal_name).accumulating(),
            Rule::new("^245..", "title_statement", title_statement),
            Rule::new("^650..", "subject_added_entry_topical_term", topical_term).accumulating(),
            Rule::new("^700..", "added_entry_personal_name", personal_name).accumulating(),
        ]
    }
}

fn control_text(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    Ok(Outcome::emit(text(key, value)?))
}

/// 020 - International Standard Book Number.
fn isbn(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let out = named_subfields(subfields(key, value)?, ISBN_SUBFIELDS);
    if out.is_empty() {
        return Ok(Outcome::Skip);
    }
    Ok(Outcome::emit(out))
}

/// 100/700 - Personal name.
fn personal_name(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let (ind1, _) = indicators(key);
    let mut out = named_subfields(subfields(key, value)?, PERSONAL_NAME_SUBFIELDS);
    out.push("type_of_personal_name_entry_element", label(TYPE_OF_PERSONAL_NAME, ind1));
    Ok(Outcome::emit(out))
}

/// 245 - Title statement.
fn title_statement(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let (ind1, ind2) = indicators(key);
    let mut out = named_subfields(subfields(key, value)?, TITLE_STATEMENT_SUBFIELDS);
    out.push("title_added_entry", label(TITLE_ADDED_ENTRY, ind1));
    out.push("nonfiling_characters", label(NONFILING_CHARACTERS, ind2));
    Ok(Outcome::emit(out))
}

/// 650 - Subject added entry, topical term.
fn topical_term(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let (ind1, ind2) = indicators(key);
    let mut out = named_subfields(subfields(key, value)?, TOPICAL_TERM_SUBFIELDS);
    out.push("level_of_subject", label(LEVEL_OF_SUBJECT, ind1));
    out.push("thesaurus", label(THESAURUS, ind2));
    Ok(Outcome::emit(out))
}
