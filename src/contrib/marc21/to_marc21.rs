//! JSON → MARC21 bibliographic fields.
//!
//! Output keys are bare tags; each field record carries its indicators as
//! `$ind1`/`$ind2` entries, which [`marcxml::dump_record`](crate::marcxml::dump_record)
//! understands.

use super::utils::{code, coded_subfields, subfields, text, with_indicators};
use super::{
    ISBN_SUBFIELDS, LEVEL_OF_SUBJECT, NONFILING_CHARACTERS, PERSONAL_NAME_SUBFIELDS, THESAURUS,
    TITLE_ADDED_ENTRY, TITLE_STATEMENT_SUBFIELDS, TOPICAL_TERM_SUBFIELDS, TYPE_OF_PERSONAL_NAME,
};
use crate::ordered_record::OrderedRecord;
use crate::rule::{Outcome, Rule, RuleProvider, TransformResult};
use crate::value::Value;

/// Rule pack turning records produced by [`Marc21`](super::Marc21) back into
/// MARC21 fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToMarc21;

impl RuleProvider for ToMarc21 {
    fn name(&self) -> &str {
        "to_marc21"
    }

    fn provide_rules(&self) -> Vec<Rule> {
        vec![
            Rule::new("^leader$", "leader", control_text),
            Rule::new("^control_number$", "001", control_text),
            Rule::new("^date_and_time_of_latest_transaction$", "005", control_text),
            Rule::new("^international_standard_book_number$", "020", isbn).accumulating(),
            Rule::new("^main_entry_personal_name$", "100", personal_name).accumulating(),
            Rule::new("^title_statement$", "245", title_statement),
            Rule::new("^subject_added_entry_topical_term$", "650", topical_term).accumulating(),
            Rule::new("^added_entry_personal_name$", "700", personal_name).accumulating(),
        ]
    }
}

fn control_text(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    Ok(Outcome::emit(text(key, value)?))
}

fn isbn(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let mut out = with_indicators(' ', ' ');
    coded_subfields(subfields(key, value)?, ISBN_SUBFIELDS, &mut out);
    Ok(Outcome::emit(out))
}

fn personal_name(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let v = subfields(key, value)?;
    let ind1 = code(TYPE_OF_PERSONAL_NAME, v.get("type_of_personal_name_entry_element"));
    let mut out = with_indicators(ind1, ' ');
    coded_subfields(v, PERSONAL_NAME_SUBFIELDS, &mut out);
    Ok(Outcome::emit(out))
}

fn title_statement(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let v = subfields(key, value)?;
    let ind1 = code(TITLE_ADDED_ENTRY, v.get("title_added_entry"));
    let ind2 = code(NONFILING_CHARACTERS, v.get("nonfiling_characters"));
    let mut out = with_indicators(ind1, ind2);
    coded_subfields(v, TITLE_STATEMENT_SUBFIELDS, &mut out);
    Ok(Outcome::emit(out))
}

fn topical_term(_: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
    let v = subfields(key, value)?;
    let ind1 = code(LEVEL_OF_SUBJECT, v.get("level_of_subject"));
    let ind2 = code(THESAURUS, v.get("thesaurus"));
    let mut out = with_indicators(ind1, ind2);
    coded_subfields(v, TOPICAL_TERM_SUBFIELDS, &mut out);
    Ok(Outcome::emit(out))
}
