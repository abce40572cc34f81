//! The rule dispatcher.
//!
//! An [`Overdo`] owns an ordered rule list, compiles it lazily into a
//! [`RuleIndex`], and transforms records key by key: every occurrence in the
//! input is routed to the first rule whose pattern matches, and the rule's
//! result is stored under the rule's output name.
//!
//! The index is either *stale* (never built, or rules were registered since
//! the last build) or *ready*. Registration needs `&mut self` and marks it
//! stale; [`transform`](Overdo::transform) and
//! [`find_missing_rules`](Overdo::find_missing_rules) take `&self` and build
//! it on demand, so a fully registered dispatcher can be shared across threads.
//!
//! # Examples
//!
//! ```
//! use marcdo::{ExceptionHandlers, OrderedRecord, Outcome, Overdo, Value};
//!
//! let mut marc = Overdo::new();
//! marc.over_each("main_entry_personal_name", &["^100.."], |_, _, value| {
//!     let mut name = OrderedRecord::new();
//!     if let Some(a) = value.as_record().and_then(|sf| sf.get_str("a")) {
//!         name.push("personal_name", a);
//!     }
//!     Ok(Outcome::emit(name))
//! });
//!
//! let mut subfields = OrderedRecord::new();
//! subfields.push("a", "Donges, Jonathan F");
//! let mut record = OrderedRecord::new();
//! record.push("100  ", subfields);
//! record.push("999  ", "unmapped");
//!
//! let output = marc.transform(&record, false, &ExceptionHandlers::new())?;
//! assert_eq!(output.order(), ["main_entry_personal_name"]);
//! assert_eq!(marc.find_missing_rules(&record)?, ["999  "]);
//! # Ok::<(), marcdo::MarcError>(())
//! ```

use crate::config::{OverdoConfig, PackOrder};
use crate::error::{MarcError, Result};
use crate::ordered_record::OrderedRecord;
use crate::policy::{clean_missing, ExceptionHandlers, MissingRule};
use crate::rule::{Outcome, Rule, RuleProvider, TransformResult};
use crate::rule_index::RuleIndex;
use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Rule dispatcher turning input records into output records.
pub struct Overdo {
    rules: Vec<Rule>,
    providers: Vec<Arc<dyn RuleProvider>>,
    config: OverdoConfig,
    index: RwLock<Option<Arc<RuleIndex>>>,
}

impl Default for Overdo {
    fn default() -> Self {
        Self::new()
    }
}

impl Overdo {
    /// Create a dispatcher with no rules and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OverdoConfig::default())
    }

    /// Create a dispatcher with no rules.
    #[must_use]
    pub fn with_config(config: OverdoConfig) -> Self {
        Overdo {
            rules: Vec::new(),
            providers: Vec::new(),
            config,
            index: RwLock::new(None),
        }
    }

    /// Create a dispatcher starting with the rules and rule packs of `bases`,
    /// in the order given.
    #[must_use]
    pub fn with_bases(bases: &[&Overdo], config: OverdoConfig) -> Self {
        let mut overdo = Self::with_config(config);
        for base in bases {
            overdo.rules.extend(base.rules.iter().cloned());
            overdo.providers.extend(base.providers.iter().cloned());
        }
        overdo
    }

    /// Add a rule pack, consulted when the index is next built.
    #[must_use]
    pub fn with_provider(mut self, provider: impl RuleProvider + 'static) -> Self {
        self.add_provider(Arc::new(provider));
        self
    }

    /// Add a shared rule pack, consulted when the index is next built.
    pub fn add_provider(&mut self, provider: Arc<dyn RuleProvider>) {
        self.providers.push(provider);
        self.invalidate();
    }

    /// The dispatcher configuration.
    #[must_use]
    pub fn config(&self) -> &OverdoConfig {
        &self.config
    }

    /// Explicitly registered rules, excluding rule packs not yet loaded.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Append a rule.
    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self.invalidate();
        self
    }

    /// Register `transform` under `output_name` for every pattern in
    /// `patterns`. Each call result replaces any earlier value under
    /// `output_name`.
    pub fn over<F>(&mut self, output_name: &str, patterns: &[&str], transform: F) -> &mut Self
    where
        F: Fn(&OrderedRecord, &str, &Value) -> TransformResult + Send + Sync + 'static,
    {
        self.register(output_name, patterns, Arc::new(transform), false)
    }

    /// Like [`over`](Self::over), but results are appended to the list under
    /// `output_name`. A transform returning a [`Value::List`] contributes each
    /// item.
    pub fn over_each<F>(&mut self, output_name: &str, patterns: &[&str], transform: F) -> &mut Self
    where
        F: Fn(&OrderedRecord, &str, &Value) -> TransformResult + Send + Sync + 'static,
    {
        self.register(output_name, patterns, Arc::new(transform), true)
    }

    fn register(
        &mut self,
        output_name: &str,
        patterns: &[&str],
        transform: Arc<crate::rule::TransformFn>,
        accumulating: bool,
    ) -> &mut Self {
        for pattern in patterns {
            let rule = Rule::from_shared(*pattern, output_name, Arc::clone(&transform));
            self.rules.push(if accumulating {
                rule.accumulating()
            } else {
                rule
            });
        }
        self.invalidate();
        self
    }

    /// Fold all pending rule packs into the rule list now.
    ///
    /// Rules registered afterward come after the pack rules.
    pub fn load_rule_packs(&mut self) {
        if self.providers.is_empty() {
            return;
        }
        let pack_rules = self.collect_pack_rules();
        self.providers.clear();
        self.rules = self.merge(pack_rules);
        self.invalidate();
    }

    fn collect_pack_rules(&self) -> Vec<Rule> {
        let mut pack_rules = Vec::new();
        for provider in &self.providers {
            let rules = provider.provide_rules();
            log::debug!("rule pack '{}' contributed {} rules", provider.name(), rules.len());
            pack_rules.extend(rules);
        }
        pack_rules
    }

    fn merge(&self, pack_rules: Vec<Rule>) -> Vec<Rule> {
        match self.config.pack_order {
            PackOrder::PacksLast => self.rules.iter().cloned().chain(pack_rules).collect(),
            PackOrder::PacksFirst => pack_rules
                .into_iter()
                .chain(self.rules.iter().cloned())
                .collect(),
        }
    }

    fn invalidate(&mut self) {
        *self.index.get_mut() = None;
    }

    /// Whether the index matches the current rule list.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.index.read().is_some()
    }

    /// Build the index now if it is stale, and return it.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidPattern`] if a rule pattern does not compile,
    /// or [`MarcError::InvalidConfig`] for an unusable configuration.
    pub fn build(&self) -> Result<Arc<RuleIndex>> {
        if let Some(index) = self.index.read().as_ref() {
            return Ok(Arc::clone(index));
        }

        let mut slot = self.index.write();
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }
        self.config.validate()?;
        let rules = self.merge(self.collect_pack_rules());
        let index = Arc::new(RuleIndex::build(rules, self.config.branch_size)?);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// First rule whose pattern matches `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be built.
    pub fn query(&self, key: &str) -> Result<Option<Rule>> {
        Ok(self.build()?.query(key).cloned())
    }

    /// Transform `record` using the configured strictness and no custom
    /// handlers.
    ///
    /// # Errors
    ///
    /// See [`transform`](Self::transform).
    pub fn apply(&self, record: &OrderedRecord) -> Result<OrderedRecord> {
        self.transform(record, self.config.strict, &ExceptionHandlers::new())
    }

    /// Transform every occurrence of `record`, in order.
    ///
    /// For each `(key, value)`:
    ///
    /// - no matching rule: a handler for [`MissingRule`] wins if given;
    ///   otherwise strict mode fails and permissive mode drops the key;
    /// - [`Outcome::Skip`]: nothing is stored;
    /// - transform error: the handler for its exact type runs, or the
    ///   transform fails;
    /// - [`Outcome::Emit`]: the value is stored under the rule's output name,
    ///   or appended for accumulating rules.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MissingRule`] for an unmatched key in strict mode,
    /// [`MarcError::Transform`] for an unhandled transform error, and index
    /// build errors. Output built before the failure is discarded.
    pub fn transform(
        &self,
        record: &OrderedRecord,
        strict: bool,
        handlers: &ExceptionHandlers,
    ) -> Result<OrderedRecord> {
        let index = self.build()?;
        let mut output = OrderedRecord::new();

        for (key, value) in record.iter_repeated() {
            let Some(rule) = index.query(key) else {
                let err = anyhow::Error::new(MissingRule::new(key));
                if handlers.handle(&err, &mut output, key, value) {
                    continue;
                }
                if strict {
                    log::warn!("no rule matched key '{key}', aborting transform");
                    return Err(MarcError::MissingRule(key.to_string()));
                }
                log::debug!("dropping key '{key}': no matching rule");
                clean_missing(&mut output, key);
                continue;
            };

            log::trace!("key '{key}' -> '{}'", rule.output_name());
            match rule.apply(&output, key, value) {
                Ok(Outcome::Emit(result)) => store(&mut output, rule, result),
                Ok(Outcome::Skip) => {},
                Err(err) => {
                    if handlers.handle(&err, &mut output, key, value) {
                        continue;
                    }
                    log::warn!("unhandled error transforming key '{key}': {err}");
                    return Err(MarcError::Transform {
                        key: key.to_string(),
                        source: err,
                    });
                },
            }
        }

        Ok(output)
    }

    /// Every key occurrence in `record` that no rule matches, in order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the index cannot be built.
    pub fn find_missing_rules(&self, record: &OrderedRecord) -> Result<Vec<String>> {
        let index = self.build()?;
        Ok(record
            .iter_repeated()
            .filter(|(key, _)| index.query(key).is_none())
            .map(|(key, _)| key.to_string())
            .collect())
    }
}

fn store(output: &mut OrderedRecord, rule: &Rule, result: Value) {
    if rule.is_accumulating() {
        let items = match result {
            Value::List(items) => items,
            single => vec![single],
        };
        output.extend_field(rule.output_name(), items);
    } else {
        output.insert(rule.output_name(), result);
    }
}

impl fmt::Debug for Overdo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overdo")
            .field("rules", &self.rules.len())
            .field("providers", &self.providers)
            .field("config", &self.config)
            .field("ready", &self.is_ready())
            .finish()
    }
}
