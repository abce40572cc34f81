#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marcdo: rule-driven MARC transformation
//!
//! Converts MARC records, modeled as ordered mappings from field keys to
//! values, into JSON-like records and back. Every input key is dispatched to
//! the first registered rule whose regular expression matches the start of
//! the key; the rule's transform function produces the value stored under the
//! rule's output name.
//!
//! ## Quick Start
//!
//! ```
//! use marcdo::{marcxml, Outcome, OrderedRecord, Overdo};
//!
//! # fn main() -> marcdo::Result<()> {
//! let mut overdo = Overdo::new();
//! overdo.over("title", &["^245.."], |_, _, value| {
//!     let title = value.as_record().and_then(|sf| sf.get_str("a")).unwrap_or_default();
//!     Ok(Outcome::emit(title))
//! });
//!
//! let record = marcxml::load_record(
//!     r#"<record><datafield tag="245" ind1="1" ind2="0">
//!          <subfield code="a">Introduction to algorithms</subfield>
//!        </datafield></record>"#,
//! )?;
//! let output = overdo.apply(&record)?;
//! assert_eq!(output.get_str("title"), Some("Introduction to algorithms"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ordered_record`] — Ordered, repeat-aware records (`OrderedRecord`)
//! - [`value`] — JSON-like values held in records
//! - [`rule`] — Rules, transform outcomes and rule packs
//! - [`rule_index`] — Branch-partitioned regex index over a rule list
//! - [`overdo`] — The dispatcher (`Overdo`)
//! - [`policy`] — Per-error-type handlers and the missing-rule condition
//! - [`config`] — Dispatcher configuration
//! - [`marcxml`] — MARCXML loading and dumping
//! - [`json`] — JSON loading and dumping
//! - [`contrib`] — Ready-made MARC21 rule packs
//! - [`error`] — Error types and result type

pub mod config;
pub mod contrib;
pub mod error;
pub mod json;
pub mod marcxml;
pub mod ordered_record;
pub mod overdo;
pub mod policy;
pub mod rule;
pub mod rule_index;
pub mod value;

pub use config::{OverdoConfig, PackOrder};
pub use error::{MarcError, Result};
pub use ordered_record::{OrderedRecord, ORDER_KEY};
pub use overdo::Overdo;
pub use policy::{ExceptionHandlers, MissingRule};
pub use rule::{Outcome, Rule, RuleProvider, TransformResult};
pub use rule_index::RuleIndex;
pub use value::Value;
