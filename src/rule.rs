//! Transformation rules and rule packs.
//!
//! A [`Rule`] routes every record key matching its pattern to a transform
//! function and names the output field the result is stored under. Rules are
//! usually registered through [`Overdo::over`](crate::Overdo::over); rule packs
//! implementing [`RuleProvider`] contribute whole sets of rules at once.

use crate::ordered_record::OrderedRecord;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// What a transform function produced for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Store this value under the rule's output name
    Emit(Value),
    /// The key intentionally produces no output field
    Skip,
}

impl Outcome {
    /// Shorthand for [`Outcome::Emit`].
    pub fn emit(value: impl Into<Value>) -> Self {
        Outcome::Emit(value.into())
    }
}

/// Result of a transform function.
///
/// Errors are open-ended so that exception handlers can match on the concrete
/// error type.
pub type TransformResult = std::result::Result<Outcome, anyhow::Error>;

/// Signature of a transform function: `(output_so_far, key, value)`.
pub type TransformFn = dyn Fn(&OrderedRecord, &str, &Value) -> TransformResult + Send + Sync;

/// A `(pattern, output_name, transform)` rule.
#[derive(Clone)]
pub struct Rule {
    pattern: String,
    output_name: String,
    transform: Arc<TransformFn>,
    accumulating: bool,
}

impl Rule {
    /// Create a rule whose result replaces any earlier value under
    /// `output_name`.
    pub fn new<F>(pattern: impl Into<String>, output_name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&OrderedRecord, &str, &Value) -> TransformResult + Send + Sync + 'static,
    {
        Self::from_shared(pattern, output_name, Arc::new(transform))
    }

    /// Create a rule sharing an existing transform function.
    pub fn from_shared(
        pattern: impl Into<String>,
        output_name: impl Into<String>,
        transform: Arc<TransformFn>,
    ) -> Self {
        Rule {
            pattern: pattern.into(),
            output_name: output_name.into(),
            transform,
            accumulating: false,
        }
    }

    /// Mark the rule as accumulating: its results are appended to the list
    /// under `output_name` instead of replacing it.
    #[must_use]
    pub fn accumulating(mut self) -> Self {
        self.accumulating = true;
        self
    }

    /// The regular expression matched against the start of each key.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Name of the output field.
    #[must_use]
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Whether results are appended rather than stored.
    #[must_use]
    pub fn is_accumulating(&self) -> bool {
        self.accumulating
    }

    /// The shared transform function.
    #[must_use]
    pub fn transform_fn(&self) -> &Arc<TransformFn> {
        &self.transform
    }

    /// Run the transform function.
    ///
    /// # Errors
    ///
    /// Propagates whatever error the transform function returns.
    pub fn apply(&self, output: &OrderedRecord, key: &str, value: &Value) -> TransformResult {
        (self.transform)(output, key, value)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .field("output_name", &self.output_name)
            .field("accumulating", &self.accumulating)
            .finish_non_exhaustive()
    }
}

/// A source of rules folded into a dispatcher before its index is first built.
///
/// Rule packs are handed to [`Overdo::with_provider`](crate::Overdo::with_provider)
/// and consulted lazily, so registering a pack is cheap.
pub trait RuleProvider: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    /// The rules this pack contributes, in priority order.
    fn provide_rules(&self) -> Vec<Rule>;
}

impl fmt::Debug for dyn RuleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleProvider")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_accessors() {
        let rule = Rule::new("^245..", "title_statement", |_, _, v| Ok(Outcome::emit(v.clone())));
        assert_eq!(rule.pattern(), "^245..");
        assert_eq!(rule.output_name(), "title_statement");
        assert!(!rule.is_accumulating());
        assert!(rule.accumulating().is_accumulating());
    }

    #[test]
    fn test_apply_passes_arguments() {
        let rule = Rule::new("^001", "control_number", |_, key, value| {
            Ok(Outcome::Emit(Value::from(format!(
                "{key}:{}",
                value.as_str().unwrap_or_default()
            ))))
        });
        let outcome = rule
            .apply(&OrderedRecord::new(), "001", &Value::from("123"))
            .unwrap();
        assert_eq!(outcome, Outcome::Emit(Value::from("001:123")));
    }

    #[test]
    fn test_shared_transform() {
        let rule = Rule::new("^100..", "a", |_, _, _| Ok(Outcome::Skip));
        let other = Rule::from_shared("^700..", "b", Arc::clone(rule.transform_fn()));
        assert!(Arc::ptr_eq(rule.transform_fn(), other.transform_fn()));
    }

    #[test]
    fn test_debug_omits_closure() {
        let rule = Rule::new("^650..", "subject", |_, _, _| Ok(Outcome::Skip));
        let debug = format!("{rule:?}");
        assert!(debug.contains("^650.."));
        assert!(debug.contains("subject"));
    }
}
