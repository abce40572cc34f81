//! Compiled index over an ordered rule list.
//!
//! Combining every rule pattern into one alternation does not scale past a
//! regex engine's capture group ceiling, so the index splits the rule list into
//! branches of at most `branch_size` rules. Each branch compiles to one anchored
//! alternation with a wrapping group per rule:
//!
//! ```text
//! ^(?:(^100..)|(^245..)|...)
//! ```
//!
//! A query tries the branches in registration order. The first branch that
//! matches tells, through its participating wrapper group, which rule matched.
//! Inside a branch, leftmost-first alternation picks the earliest alternative,
//! so the first registered matching rule always wins. A query costs one regex
//! attempt per branch, not one per rule.
//!
//! Wrapper groups are located by index, counting the groups each pattern
//! defines. A rule whose named groups clash with a name already used in the
//! current branch starts a new branch.

use crate::error::{MarcError, Result};
use crate::rule::Rule;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

/// One compiled alternation covering a contiguous run of rules.
#[derive(Debug)]
struct Branch {
    regex: Regex,
    /// Position of the branch's first rule in the full rule list
    offset: usize,
    /// Capture group index of each rule's wrapper group, in rule order
    groups: Vec<usize>,
}

impl Branch {
    fn compile(rules: &[Rule], patterns: &[Regex], offset: usize) -> Result<Self> {
        let mut groups = Vec::with_capacity(rules.len());
        let mut next = 1;
        for pattern in patterns {
            groups.push(next);
            // The wrapper itself plus the pattern's own groups.
            next += pattern.captures_len();
        }

        let alternatives: Vec<String> = rules
            .iter()
            .map(|rule| format!("({})", rule.pattern()))
            .collect();
        let source = format!("^(?:{})", alternatives.join("|"));

        let regex = Regex::new(&source).map_err(|e| MarcError::InvalidPattern {
            pattern: source.clone(),
            source: e,
        })?;

        Ok(Branch {
            regex,
            offset,
            groups,
        })
    }

    /// Position within the branch of the first rule matching `key`.
    fn find(&self, key: &str) -> Option<usize> {
        let captures = self.regex.captures(key)?;
        self.groups
            .iter()
            .position(|&group| captures.get(group).is_some())
    }
}

/// Split `patterns` into contiguous runs of at most `branch_size`, cutting
/// early where a group name would repeat within a run.
fn partition(patterns: &[Regex], branch_size: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut names: HashSet<&str> = HashSet::new();

    for (i, pattern) in patterns.iter().enumerate() {
        let own: Vec<&str> = pattern.capture_names().flatten().collect();
        let full = i - start == branch_size;
        let clash = own.iter().any(|name| names.contains(name));
        if i > start && (full || clash) {
            ranges.push(start..i);
            start = i;
            names.clear();
        }
        names.extend(own);
    }
    if start < patterns.len() {
        ranges.push(start..patterns.len());
    }
    ranges
}

/// Index answering "first registered rule whose pattern matches this key".
///
/// The index is a pure function of its rule list: the same rules in the same
/// order always give the same answers.
#[derive(Debug)]
pub struct RuleIndex {
    rules: Vec<Rule>,
    branches: Vec<Branch>,
}

impl RuleIndex {
    /// Compile `rules` into branches of at most `branch_size` rules.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidPattern`] naming the first rule whose pattern
    /// does not compile, and [`MarcError::InvalidConfig`] if `branch_size` is
    /// zero.
    pub fn build(rules: Vec<Rule>, branch_size: usize) -> Result<Self> {
        if branch_size == 0 {
            return Err(MarcError::InvalidConfig(
                "branch_size must be at least 1".to_string(),
            ));
        }

        let patterns = rules
            .iter()
            .map(|rule| {
                Regex::new(rule.pattern()).map_err(|e| MarcError::InvalidPattern {
                    pattern: rule.pattern().to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let branches = partition(&patterns, branch_size)
            .into_iter()
            .map(|range| {
                Branch::compile(&rules[range.clone()], &patterns[range.clone()], range.start)
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "built rule index: {} rules in {} branches of up to {} rules",
            rules.len(),
            branches.len(),
            branch_size
        );

        Ok(RuleIndex { rules, branches })
    }

    /// Return the first rule, in registration order, whose pattern matches the
    /// start of `key`.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&Rule> {
        self.branches.iter().find_map(|branch| {
            branch
                .find(key)
                .and_then(|position| self.rules.get(branch.offset + position))
        })
    }

    /// All indexed rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of indexed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the index holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of compiled branches.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }
}
