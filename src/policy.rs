//! Per-error-type handling during dispatch.
//!
//! [`ExceptionHandlers`] maps an error type to a handler called as
//! `(error, output_so_far, key, value)`. A handler fires only for its exact
//! type; errors with no handler abort the transform. The missing-rule condition
//! is reported as a [`MissingRule`] error, so it is handled the same way.
//!
//! # Examples
//!
//! ```
//! use marcdo::policy::{ExceptionHandlers, MissingRule};
//!
//! let handlers = ExceptionHandlers::new().on::<MissingRule, _>(|err, output, _key, value| {
//!     output.push(format!("unknown:{}", err.key), value.clone());
//! });
//! assert_eq!(handlers.len(), 1);
//! ```

use crate::ordered_record::OrderedRecord;
use crate::value::Value;
use std::any::{type_name, TypeId};
use std::fmt;
use thiserror::Error;

/// Raised when no rule matches a record key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no rule matched key '{key}'")]
pub struct MissingRule {
    /// The unmatched key
    pub key: String,
}

impl MissingRule {
    /// Create the error for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        MissingRule { key: key.into() }
    }
}

type ErasedHandler =
    Box<dyn Fn(&anyhow::Error, &mut OrderedRecord, &str, &Value) -> bool + Send + Sync>;

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    handler: ErasedHandler,
}

/// Handlers keyed by error type.
#[derive(Default)]
pub struct ExceptionHandlers {
    entries: Vec<Entry>,
}

impl ExceptionHandlers {
    /// Create an empty handler map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for errors of type `E`, replacing any earlier
    /// handler for that type.
    #[must_use]
    pub fn on<E, F>(mut self, handler: F) -> Self
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
        F: Fn(&E, &mut OrderedRecord, &str, &Value) + Send + Sync + 'static,
    {
        let erased: ErasedHandler = Box::new(move |err, output, key, value| {
            match err.downcast_ref::<E>() {
                Some(typed) => {
                    handler(typed, output, key, value);
                    true
                },
                None => false,
            }
        });
        let type_id = TypeId::of::<E>();
        self.entries.retain(|entry| entry.type_id != type_id);
        self.entries.push(Entry {
            type_id,
            type_name: type_name::<E>(),
            handler: erased,
        });
        self
    }

    /// Silently recover from errors of type `E`.
    #[must_use]
    pub fn ignore<E>(self) -> Self
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.on::<E, _>(|_, _, _, _| {})
    }

    /// Whether a handler is registered for `E`.
    #[must_use]
    pub fn handles<E: 'static>(&self) -> bool {
        let type_id = TypeId::of::<E>();
        self.entries.iter().any(|entry| entry.type_id == type_id)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the handler registered for the concrete type of `err`.
    ///
    /// Returns `false` when no handler claims the error.
    pub fn handle(
        &self,
        err: &anyhow::Error,
        output: &mut OrderedRecord,
        key: &str,
        value: &Value,
    ) -> bool {
        self.entries
            .iter()
            .any(|entry| (entry.handler)(err, output, key, value))
    }
}

impl fmt::Debug for ExceptionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.type_name))
            .finish()
    }
}

/// Default permissive handling of a missing rule: drop the key, and drop any
/// order entry for it that names no stored value.
///
/// Fields already stored under the same name are kept.
pub fn clean_missing(output: &mut OrderedRecord, key: &str) {
    let pruned = output.prune_order(key);
    if pruned > 0 {
        log::debug!("removed {pruned} dangling order entries for unmatched key '{key}'");
    }
}
