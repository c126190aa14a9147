//! The indexed fact base.

use crate::core::{Interner, Substitution, SymbolId, Term};
use crate::error::{Result, SyllogError};
use crate::unify::match_all;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// A mutable set of ground facts with a by-head index.
///
/// Facts are stored in insertion order (queries iterate deterministically)
/// together with a monotonic assertion stamp that feeds the recency
/// conflict-resolution key. `by_head[h]` holds exactly the facts whose
/// first element is the symbol `h`; facts headed by anything else are
/// reachable only through the full scan.
#[derive(Debug, Clone, Default)]
pub struct FactBase {
    all: IndexMap<Term, u64>,
    by_head: HashMap<SymbolId, IndexSet<Term>>,
    next_stamp: u64,
}

impl FactBase {
    pub fn new() -> Self {
        FactBase::default()
    }

    /// Reject anything that is not a ground, non-empty compound
    pub fn validate_fact(fact: &Term) -> Result<()> {
        if !fact.is_compound() {
            return Err(SyllogError::Validation(format!(
                "a fact must be a compound term, got {fact}"
            )));
        }
        if fact.is_empty_compound() {
            return Err(SyllogError::Validation(
                "the empty compound is not a valid fact".to_string(),
            ));
        }
        if !fact.is_ground() {
            return Err(SyllogError::Validation(format!(
                "a fact must be ground, got {fact}"
            )));
        }
        Ok(())
    }

    /// Add a fact. Idempotent: asserting a present fact changes nothing
    /// (including its stamp). Returns true when the fact was new.
    pub fn assert_fact(&mut self, fact: Term) -> Result<bool> {
        Self::validate_fact(&fact)?;
        if self.all.contains_key(&fact) {
            return Ok(false);
        }
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        if let Some(head) = fact.head_symbol() {
            self.by_head.entry(head).or_default().insert(fact.clone());
        }
        self.all.insert(fact, stamp);
        Ok(true)
    }

    /// Remove a fact. No-op (false) when absent.
    pub fn retract(&mut self, fact: &Term) -> bool {
        if self.all.shift_remove(fact).is_none() {
            return false;
        }
        if let Some(head) = fact.head_symbol() {
            if let Some(bucket) = self.by_head.get_mut(&head) {
                bucket.shift_remove(fact);
            }
        }
        true
    }

    pub fn contains(&self, fact: &Term) -> bool {
        self.all.contains_key(fact)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Remove every fact
    pub fn clear(&mut self) {
        self.all.clear();
        self.by_head.clear();
    }

    /// All facts, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.all.keys()
    }

    /// The facts sharing `head`, in insertion order (possibly none)
    pub fn by_relation(&self, head: SymbolId) -> impl Iterator<Item = &Term> {
        self.by_head.get(&head).into_iter().flatten()
    }

    /// Assertion stamp of a present fact
    pub fn stamp(&self, fact: &Term) -> Option<u64> {
        self.all.get(fact).copied()
    }

    /// Candidate facts for a pattern: the head bucket when the pattern
    /// leads with a ground symbol, otherwise everything.
    pub fn candidates<'a>(&'a self, pattern: &Term) -> Box<dyn Iterator<Item = &'a Term> + 'a> {
        match pattern.head_symbol() {
            Some(head) => Box::new(self.by_relation(head)),
            None => Box::new(self.iter()),
        }
    }

    /// Match `pattern` against the narrowed candidate set, extending
    /// `subst` per successful fact.
    pub fn query(&self, pattern: &Term, subst: &Substitution) -> Vec<Substitution> {
        match_all(pattern, self.candidates(pattern), subst)
    }

    /// Render the fact set for diagnostics
    pub fn display_all(&self, interner: &Interner) -> Vec<String> {
        self.iter()
            .map(|fact| fact.display(interner).to_string())
            .collect()
    }
}
