//! Rules: antecedent patterns, consequent patterns, and safety.

use crate::core::{Interner, Term, Variable};
use crate::error::{Result, SyllogError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A production rule.
///
/// `when` holds the antecedent patterns, `then` the consequent patterns.
/// Rules are data: they serialize, clone, and compare structurally, and
/// can be built programmatically or parsed from the text syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Identifier used in trace output and tie-break logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Higher fires first
    #[serde(default)]
    pub priority: i32,
    pub when: Vec<Term>,
    pub then: Vec<Term>,
}

impl Rule {
    pub fn new(when: Vec<Term>, then: Vec<Term>) -> Self {
        Rule {
            name: None,
            priority: 0,
            when,
            then,
        }
    }

    pub fn named(name: impl Into<String>, when: Vec<Term>, then: Vec<Term>) -> Self {
        Rule {
            name: Some(name.into()),
            priority: 0,
            when,
            then,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The rule's label for diagnostics: its name, or a positional tag
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("rule#{index}"),
        }
    }

    /// Check the safety conditions.
    ///
    /// `then` must be non-empty; every pattern on either side must be a
    /// compound; wildcards may not appear in `then` (they never bind, so
    /// a consequent containing one could never become ground); and every
    /// `then` variable must occur in `when`, unless `when` is empty, in
    /// which case the consequents must already be ground.
    pub fn validate(&self) -> Result<()> {
        if self.then.is_empty() {
            return Err(SyllogError::Validation(
                "a rule must have at least one consequent".to_string(),
            ));
        }
        for pattern in self.when.iter().chain(self.then.iter()) {
            if !pattern.is_compound() || pattern.is_empty_compound() {
                return Err(SyllogError::Validation(format!(
                    "rule patterns must be non-empty compounds, got {pattern}"
                )));
            }
        }
        for consequent in &self.then {
            if contains_wildcard(consequent) {
                return Err(SyllogError::Validation(format!(
                    "wildcard in consequent {consequent} can never produce a ground fact"
                )));
            }
        }

        let mut when_vars: HashSet<Variable> = HashSet::new();
        for pattern in &self.when {
            pattern.collect_vars(&mut when_vars);
        }
        let mut then_vars: HashSet<Variable> = HashSet::new();
        for pattern in &self.then {
            pattern.collect_vars(&mut then_vars);
        }

        if self.when.is_empty() {
            if !then_vars.is_empty() {
                return Err(SyllogError::Validation(
                    "a rule without antecedents must have ground consequents".to_string(),
                ));
            }
            return Ok(());
        }
        if let Some(unbound) = then_vars.iter().find(|v| !when_vars.contains(*v)) {
            return Err(SyllogError::Validation(format!(
                "consequent variable {unbound} does not occur in any antecedent"
            )));
        }
        Ok(())
    }

    /// Format this rule with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            interner,
        }
    }
}

fn contains_wildcard(term: &Term) -> bool {
    match term {
        Term::Wildcard => true,
        Term::Atom(_) | Term::Variable(_) => false,
        Term::Compound(items) => items.iter().any(contains_wildcard),
    }
}

/// Display wrapper for Rule that resolves interned names
pub struct RuleDisplay<'a> {
    rule: &'a Rule,
    interner: &'a Interner,
}

impl fmt::Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{when [")?;
        for (i, pattern) in self.rule.when.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", pattern.display(self.interner))?;
        }
        write!(f, "] then [")?;
        for (i, pattern) in self.rule.then.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", pattern.display(self.interner))?;
        }
        write!(f, "]")?;
        if let Some(name) = &self.rule.name {
            write!(f, " name {name}")?;
        }
        if self.rule.priority != 0 {
            write!(f, " priority {}", self.rule.priority)?;
        }
        write!(f, "}}")
    }
}
