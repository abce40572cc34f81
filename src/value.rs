//! Values stored in an [`OrderedRecord`].
//!
//! A [`Value`] is the JSON-like payload held under a record key: control field
//! text, nested subfield records, or whatever a rule's transform produced.

use crate::ordered_record::OrderedRecord;
use serde::{Serialize, Serializer};
use serde_json::Number;

/// A JSON-like value held in a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
    /// Sequence of values
    List(Vec<Value>),
    /// Nested ordered mapping (e.g. a field's subfields)
    Record(OrderedRecord),
}

impl Value {
    /// Return the text if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the nested record if this is a record value.
    #[must_use]
    pub fn as_record(&self) -> Option<&OrderedRecord> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Return the items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render a scalar as text. Lists and records yield `None`.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::List(_) | Value::Record(_) => None,
        }
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// A nested record writes its `__order__` member only when it repeats a
    /// key; records with distinct keys are plain objects. The top-level record always
    /// carries it (see [`OrderedRecord::to_json`]).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => {
                Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number)
            },
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            },
            Value::Record(r) => r.to_json_object(r.has_repeated()),
        }
    }

    /// Convert from a `serde_json::Value`.
    ///
    /// Objects become nested [`OrderedRecord`]s; an `__order__` member, when
    /// present, restores per-occurrence entries.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            },
            serde_json::Value::Object(map) => Value::Record(OrderedRecord::from_json_object(map)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<OrderedRecord> for Value {
    fn from(r: OrderedRecord) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
