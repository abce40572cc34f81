//! JSON loading and dumping of records.
//!
//! Records are written as JSON objects in key order. Repeated keys become
//! arrays, and the top-level object carries an `__order__` array listing every
//! occurrence so that the interleaved order survives a round trip.
//!
//! # Examples
//!
//! ```
//! use marcdo::{json, OrderedRecord};
//!
//! # fn main() -> marcdo::Result<()> {
//! let mut record = OrderedRecord::new();
//! record.push("title", "Introduction to algorithms");
//!
//! let value = json::dump(&record);
//! assert_eq!(value["__order__"][0], "title");
//!
//! let restored = json::load(&value)?;
//! assert_eq!(restored, vec![record]);
//! # Ok(())
//! # }
//! ```

use crate::error::{MarcError, Result};
use crate::ordered_record::OrderedRecord;
use serde_json::Value;
use std::io::{Read, Write};

/// Convert a record to JSON.
#[must_use]
pub fn dump(record: &OrderedRecord) -> Value {
    record.to_json()
}

/// Convert records to a JSON array.
#[must_use]
pub fn dump_all(records: &[OrderedRecord]) -> Value {
    Value::Array(records.iter().map(OrderedRecord::to_json).collect())
}

/// Pretty-print records as a JSON array to `writer`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_all<W: Write>(records: &[OrderedRecord], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &dump_all(records))
        .map_err(|e| MarcError::ParseError(format!("Failed to write JSON: {e}")))
}

/// Convert a JSON object, or an array of objects, into records.
///
/// # Errors
///
/// Returns an error if `json` is neither an object nor an array of objects.
pub fn load(json: &Value) -> Result<Vec<OrderedRecord>> {
    match json {
        Value::Object(_) => Ok(vec![OrderedRecord::from_json(json)?]),
        Value::Array(items) => items.iter().map(OrderedRecord::from_json).collect(),
        _ => Err(MarcError::InvalidRecord(
            "Expected JSON object or array of objects".to_string(),
        )),
    }
}

/// Parse JSON text into records.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or has the wrong shape.
pub fn load_str(text: &str) -> Result<Vec<OrderedRecord>> {
    let json: Value = serde_json::from_str(text)
        .map_err(|e| MarcError::ParseError(format!("Failed to parse JSON: {e}")))?;
    load(&json)
}

/// Read JSON records from `reader`.
///
/// # Errors
///
/// Returns an error if reading fails or the JSON is invalid.
pub fn read_all<R: Read>(reader: R) -> Result<Vec<OrderedRecord>> {
    let json: Value = serde_json::from_reader(reader)
        .map_err(|e| MarcError::ParseError(format!("Failed to parse JSON: {e}")))?;
    load(&json)
}
