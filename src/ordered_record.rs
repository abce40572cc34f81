//! Ordered, repeat-aware records.
//!
//! An [`OrderedRecord`] maps string keys to [`Value`]s while remembering the
//! order in which every occurrence was added. MARC records repeat tags (several
//! `650` fields, several `$x` subfields), so a key may hold more than one value.
//! Distinct keys keep their first-insertion position, and the `__order__` list
//! records the interleaved occurrence order across all keys.
//!
//! # Examples
//!
//! ```
//! use marcdo::{OrderedRecord, Value};
//!
//! let mut record = OrderedRecord::new();
//! record.push("650 0", "Computer programming.");
//! record.push("245 10", "Introduction to algorithms");
//! record.push("650 0", "Computer algorithms.");
//!
//! let keys: Vec<&str> = record.iter_repeated().map(|(k, _)| k).collect();
//! assert_eq!(keys, ["650 0", "245 10", "650 0"]);
//! assert_eq!(record.get_all("650 0").len(), 2);
//! ```

use crate::error::{MarcError, Result};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Reserved key holding the occurrence order of a record's fields.
pub const ORDER_KEY: &str = "__order__";

/// Values stored under one key.
///
/// A repeated slot always holds a [`Value::List`] with one item per occurrence
/// listed in the record's order.
#[derive(Debug, Clone, PartialEq)]
struct Slot {
    value: Value,
    repeated: bool,
}

impl Slot {
    fn occurrences(&self) -> usize {
        match (&self.value, self.repeated) {
            (Value::List(items), true) => items.len(),
            _ => 1,
        }
    }

    /// Turn a single-valued slot into a repeated one holding that value.
    fn make_repeated(&mut self) {
        if !self.repeated {
            let first = std::mem::take(&mut self.value);
            self.value = Value::List(vec![first]);
            self.repeated = true;
        }
    }

    fn push(&mut self, value: Value) {
        self.make_repeated();
        if let Value::List(items) = &mut self.value {
            items.push(value);
        }
    }
}

/// An ordered mapping that keeps repeated keys and their interleaved order.
///
/// Invariant: every entry of the order list names a stored key, and each key
/// appears in it exactly as many times as it has occurrences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedRecord {
    fields: IndexMap<String, Slot>,
    order: Vec<String>,
}

impl OrderedRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one occurrence of `key`.
    ///
    /// A key pushed more than once becomes repeated: [`get`](Self::get)
    /// returns a list of all its values, and [`iter_repeated`](Self::iter_repeated)
    /// yields each of them at its own position.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.fields.get_mut(&key) {
            slot.push(value);
        } else {
            self.fields.insert(
                key.clone(),
                Slot {
                    value,
                    repeated: false,
                },
            );
        }
        self.order.push(key);
    }

    /// Set `key` to a single value, replacing any previous occurrences.
    ///
    /// An existing key keeps the order position of its first occurrence.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.fields.get_mut(&key) {
            *slot = Slot {
                value,
                repeated: false,
            };
            let mut seen = false;
            self.order.retain(|k| {
                if *k != key {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        } else {
            self.push(key, value);
        }
    }

    /// Append `items` to the list stored under `key`, one occurrence each.
    ///
    /// The key is list-valued afterwards even when it holds a single item.
    /// An empty `items` stores nothing.
    pub fn extend_field(&mut self, key: impl Into<String>, items: Vec<Value>) {
        if items.is_empty() {
            return;
        }
        let key = key.into();
        let slot = self.fields.entry(key.clone()).or_insert_with(|| Slot {
            value: Value::List(Vec::new()),
            repeated: true,
        });
        for item in items {
            slot.push(item);
            self.order.push(key.clone());
        }
    }

    /// Remove every occurrence of `key` along with its order entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let slot = self.fields.shift_remove(key)?;
        self.order.retain(|k| k != key);
        Some(slot.value)
    }

    /// Remove the most recent order entry for `key`, if present.
    ///
    /// The occurrence that entry names is dropped with it, so the record stays
    /// consistent. Returns whether anything was removed.
    pub fn remove_from_order(&mut self, key: &str) -> bool {
        let Some(pos) = self.order.iter().rposition(|k| k == key) else {
            return false;
        };
        self.order.remove(pos);

        let emptied = match self.fields.get_mut(key) {
            Some(Slot {
                value: Value::List(items),
                repeated: true,
            }) => {
                items.pop();
                items.is_empty()
            },
            Some(_) => true,
            None => false,
        };
        if emptied {
            self.fields.shift_remove(key);
        }
        true
    }

    /// Drop order entries for `key` beyond its stored occurrences.
    ///
    /// Stored values are never touched. Returns how many entries were dropped.
    pub fn prune_order(&mut self, key: &str) -> usize {
        let stored = self.fields.get(key).map_or(0, Slot::occurrences);
        let listed = self.order.iter().filter(|k| *k == key).count();
        let excess = listed.saturating_sub(stored);
        for _ in 0..excess {
            if let Some(pos) = self.order.iter().rposition(|k| k == key) {
                self.order.remove(pos);
            }
        }
        excess
    }

    /// Get the value stored under `key`.
    ///
    /// Repeated keys yield a [`Value::List`] of all occurrences.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).map(|slot| &slot.value)
    }

    /// Get the value under `key` as text.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get each occurrence stored under `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&Value> {
        match self.fields.get(key) {
            Some(Slot {
                value: Value::List(items),
                repeated: true,
            }) => items.iter().collect(),
            Some(slot) => vec![&slot.value],
            None => Vec::new(),
        }
    }

    /// Whether `key` is stored in this record.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Distinct keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Occurrence order of all keys (the `__order__` metadata).
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Distinct keys with their grouped values.
    ///
    /// When `with_order` is true, a trailing `("__order__", [...])` pair is
    /// included.
    #[must_use]
    pub fn items(&self, with_order: bool) -> Vec<(String, Value)> {
        let mut items: Vec<(String, Value)> = self
            .fields
            .iter()
            .map(|(k, slot)| (k.clone(), slot.value.clone()))
            .collect();
        if with_order {
            items.push((
                ORDER_KEY.to_string(),
                Value::List(self.order.iter().map(|k| Value::from(k.as_str())).collect()),
            ));
        }
        items
    }

    /// Iterate one `(key, value)` pair per occurrence in interleaved order.
    pub fn iter_repeated(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        let mut cursors: HashMap<&str, usize> = HashMap::new();
        self.order.iter().filter_map(move |key| {
            let slot = self.fields.get(key.as_str())?;
            let value = if slot.repeated {
                let cursor = cursors.entry(key.as_str()).or_insert(0);
                let item = slot.value.as_list()?.get(*cursor)?;
                *cursor += 1;
                item
            } else {
                &slot.value
            };
            Some((key.as_str(), value))
        })
    }

    /// Whether any key holds more than one occurrence.
    pub(crate) fn has_repeated(&self) -> bool {
        self.fields.values().any(|slot| slot.repeated)
    }

    /// Convert to a JSON object including the `__order__` member.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_object(true)
    }

    pub(crate) fn to_json_object(&self, with_order: bool) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, slot) in &self.fields {
            map.insert(key.clone(), slot.value.to_json());
        }
        if with_order {
            map.insert(
                ORDER_KEY.to_string(),
                serde_json::Value::Array(
                    self.order
                        .iter()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect(),
                ),
            );
        }
        serde_json::Value::Object(map)
    }

    /// Build a record from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        json.as_object()
            .map(Self::from_json_object)
            .ok_or_else(|| MarcError::InvalidRecord("Expected JSON object".to_string()))
    }

    /// Build a record from a JSON object map.
    ///
    /// Without `__order__`, each member becomes one occurrence in object order.
    /// With it, an array member whose key occurs in `__order__` exactly as many
    /// times as the array has items is restored as a repeated key, and the
    /// occurrence order follows `__order__`.
    pub(crate) fn from_json_object(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let Some(order) = map.get(ORDER_KEY).and_then(serde_json::Value::as_array) else {
            let mut record = Self::new();
            for (key, value) in map {
                record.push(key.clone(), Value::from_json(value));
            }
            return record;
        };
        let order: Vec<&str> = order.iter().filter_map(serde_json::Value::as_str).collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for key in &order {
            *counts.entry(*key).or_insert(0) += 1;
        }

        let mut fields = IndexMap::new();
        for (key, value) in map {
            if key == ORDER_KEY {
                continue;
            }
            let listed = counts.get(key.as_str()).copied().unwrap_or(0);
            let slot = match value {
                serde_json::Value::Array(items) if listed > 0 && listed == items.len() => Slot {
                    value: Value::List(items.iter().map(Value::from_json).collect()),
                    repeated: true,
                },
                other => Slot {
                    value: Value::from_json(other),
                    repeated: false,
                },
            };
            fields.insert(key.clone(), slot);
        }

        // Keep listed entries that name a stored occurrence, then append
        // whatever `__order__` failed to mention.
        let mut used: HashMap<&str, usize> = HashMap::new();
        let mut restored = Vec::with_capacity(order.len());
        for key in order {
            let Some(slot) = fields.get(key) else {
                continue;
            };
            let n = used.entry(key).or_insert(0);
            if *n < slot.occurrences() {
                *n += 1;
                restored.push(key.to_string());
            }
        }
        for (key, slot) in &fields {
            let n = used.get(key.as_str()).copied().unwrap_or(0);
            for _ in n..slot.occurrences() {
                restored.push(key.clone());
            }
        }

        OrderedRecord {
            fields,
            order: restored,
        }
    }
}

impl Serialize for OrderedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OrderedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.push(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subjects() -> OrderedRecord {
        let mut record = OrderedRecord::new();
        record.push("001", "92005291");
        record.push("650 0", "Computer programming.");
        record.push("245 10", "Introduction to algorithms");
        record.push("650 0", "Computer algorithms.");
        record
    }

    #[test]
    fn test_repeated_keys_preserve_interleaving() {
        let record = subjects();
        let pairs: Vec<(&str, Option<&str>)> = record
            .iter_repeated()
            .map(|(k, v)| (k, v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("001", Some("92005291")),
                ("650 0", Some("Computer programming.")),
                ("245 10", Some("Introduction to algorithms")),
                ("650 0", Some("Computer algorithms.")),
            ]
        );
        assert_eq!(record.len(), 3);
        assert_eq!(record.keys().collect::<Vec<_>>(), ["001", "650 0", "245 10"]);
    }

    #[test]
    fn test_get_groups_repeated_values() {
        let record = subjects();
        assert_eq!(
            record.get("650 0"),
            Some(&Value::List(vec![
                Value::from("Computer programming."),
                Value::from("Computer algorithms."),
            ]))
        );
        assert_eq!(record.get_str("001"), Some("92005291"));
        assert!(record.get("999").is_none());
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut record = subjects();
        record.insert("650 0", "Replaced");
        assert_eq!(record.order(), ["001", "650 0", "245 10"]);
        assert_eq!(record.get_str("650 0"), Some("Replaced"));
    }

    #[test]
    fn test_remove_keeps_order_in_sync() {
        let mut record = subjects();
        assert!(record.remove("650 0").is_some());
        assert_eq!(record.order(), ["001", "245 10"]);
        assert!(record.remove("650 0").is_none());
    }

    #[test]
    fn test_remove_from_order_drops_last_occurrence() {
        let mut record = subjects();
        assert!(record.remove_from_order("650 0"));
        assert_eq!(record.order(), ["001", "650 0", "245 10"]);
        assert_eq!(record.get_all("650 0").len(), 1);
        assert!(record.remove_from_order("650 0"));
        assert!(!record.contains_key("650 0"));
        assert!(!record.remove_from_order("650 0"));
    }

    #[test]
    fn test_extend_field_is_list_valued() {
        let mut record = OrderedRecord::new();
        record.extend_field("isbn", vec![Value::from("0262031418")]);
        assert_eq!(record.to_json(), json!({"isbn": ["0262031418"], "__order__": ["isbn"]}));
        record.extend_field("isbn", vec![Value::from("0070131430")]);
        assert_eq!(record.order(), ["isbn", "isbn"]);
    }

    #[test]
    fn test_extend_field_with_no_items_on_new_key() {
        let mut record = OrderedRecord::new();
        record.extend_field("names", Vec::new());
        assert!(record.is_empty());
        assert_eq!(record.to_json(), json!({"__order__": []}));
        assert_eq!(OrderedRecord::from_json(&record.to_json()).unwrap(), record);
    }

    #[test]
    fn test_extend_field_with_no_items_on_existing_key() {
        let mut record = OrderedRecord::new();
        record.extend_field("names", vec![Value::from("Cormen, Thomas H.")]);
        let before = record.clone();
        record.extend_field("names", Vec::new());
        assert_eq!(record, before);
        assert_eq!(record.iter_repeated().count(), 1);
        assert_eq!(OrderedRecord::from_json(&record.to_json()).unwrap(), record);
    }

    #[test]
    fn test_prune_order_keeps_stored_values() {
        let mut record = subjects();
        assert_eq!(record.prune_order("650 0"), 0);
        assert_eq!(record.prune_order("999  "), 0);
        assert_eq!(record.order(), ["001", "650 0", "245 10", "650 0"]);
        assert_eq!(record.get_all("650 0").len(), 2);
    }

    #[test]
    fn test_items_with_and_without_order() {
        let record = subjects();
        assert_eq!(record.items(false).len(), 3);
        let with = record.items(true);
        assert_eq!(with.last().map(|(k, _)| k.as_str()), Some(ORDER_KEY));
    }

    #[test]
    fn test_empty_record_round_trips() {
        let record = OrderedRecord::new();
        let json = record.to_json();
        assert_eq!(json, json!({"__order__": []}));
        let restored = OrderedRecord::from_json(&json).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored, record);
    }

    #[test]
    fn test_json_round_trip_restores_occurrences() {
        let record = subjects();
        let restored = OrderedRecord::from_json(&record.to_json()).unwrap();
        assert_eq!(restored, record);
        let keys: Vec<&str> = restored.iter_repeated().map(|(k, _)| k).collect();
        assert_eq!(keys, ["001", "650 0", "245 10", "650 0"]);
    }

    #[test]
    fn test_from_json_without_order_uses_object_order() {
        let record = OrderedRecord::from_json(&json!({"b": 1, "a": [1, 2]})).unwrap();
        assert_eq!(record.order(), ["b", "a"]);
        assert_eq!(record.get_all("a").len(), 1);
    }

    #[test]
    fn test_from_json_ignores_unknown_order_entries() {
        let record =
            OrderedRecord::from_json(&json!({"a": "x", "__order__": ["ghost", "a", "a"]})).unwrap();
        assert_eq!(record.order(), ["a"]);
    }

    #[test]
    fn test_nested_records() {
        let mut sub = OrderedRecord::new();
        sub.push("a", "Subject");
        sub.push("x", "History");
        sub.push("x", "20th century");
        let mut record = OrderedRecord::new();
        record.push("650 0", sub);

        let field = record.get("650 0").and_then(Value::as_record).unwrap();
        let codes: Vec<&str> = field.iter_repeated().map(|(k, _)| k).collect();
        assert_eq!(codes, ["a", "x", "x"]);
    }

    #[test]
    fn test_nested_order_written_only_for_repeated_keys() {
        let mut plain = OrderedRecord::new();
        plain.push("a", "Subject");
        let mut interleaved = OrderedRecord::new();
        interleaved.push("a", "Subject");
        interleaved.push("x", "History");
        interleaved.push("v", "Juvenile literature");
        interleaved.push("x", "Study and teaching");

        let mut record = OrderedRecord::new();
        record.push("600 0", plain);
        record.push("650 0", interleaved);

        let json = record.to_json();
        assert!(json["600 0"].get(ORDER_KEY).is_none());
        assert_eq!(json["650 0"][ORDER_KEY], json!(["a", "x", "v", "x"]));

        let restored = OrderedRecord::from_json(&json).unwrap();
        assert_eq!(restored, record);
        let field = restored.get("650 0").and_then(Value::as_record).unwrap();
        let codes: Vec<&str> = field.iter_repeated().map(|(k, _)| k).collect();
        assert_eq!(codes, ["a", "x", "v", "x"]);
    }

    #[test]
    fn test_from_iterator() {
        let record: OrderedRecord = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(record.order(), ["a", "b", "a"]);
    }
}
