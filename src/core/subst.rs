//! Variable substitutions.

use super::term::{Term, Variable};
use std::collections::HashMap;
use std::fmt;

/// A finite mapping from variables to terms.
///
/// Invariants: the wildcard is not representable as a key (it is not a
/// `Variable`), and no key occurs in its own image after chasing; every
/// insertion goes through the occurs-checked [`extend`](Substitution::extend).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    map: HashMap<Variable, Term>,
}

impl Substitution {
    /// Create a new empty substitution
    pub fn new() -> Self {
        Substitution::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The stored binding for `var`, if any (not chased)
    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.map.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.map.contains_key(var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.map.iter()
    }

    /// Apply this substitution to a term.
    ///
    /// Bound variables are chased through the map until a non-variable or
    /// unbound variable is reached; compounds apply elementwise; atoms and
    /// wildcards pass through. Termination is guaranteed by the occurs
    /// invariant.
    pub fn apply(&self, term: &Term) -> Term {
        match term {
            Term::Variable(v) => match self.map.get(v) {
                Some(bound) => self.apply(bound),
                None => term.clone(),
            },
            Term::Atom(_) | Term::Wildcard => term.clone(),
            Term::Compound(items) => {
                Term::Compound(items.iter().map(|item| self.apply(item)).collect())
            }
        }
    }

    /// True iff `var` occurs in `term` after chasing bindings
    pub fn occurs(&self, var: &Variable, term: &Term) -> bool {
        match term {
            Term::Variable(v) => {
                if v == var {
                    return true;
                }
                match self.map.get(v) {
                    Some(bound) => self.occurs(var, bound),
                    None => false,
                }
            }
            Term::Atom(_) | Term::Wildcard => false,
            Term::Compound(items) => items.iter().any(|item| self.occurs(var, item)),
        }
    }

    /// Bind `var` to `term`, resolving `term` against this substitution
    /// first. Returns `false` (and stores nothing) when the occurs check
    /// rejects the binding.
    #[must_use]
    pub fn extend(&mut self, var: Variable, term: &Term) -> bool {
        let resolved = self.apply(term);
        if self.occurs(&var, &resolved) {
            return false;
        }
        self.map.insert(var, resolved);
        true
    }

    /// Compose with `other`: bindings of `other` are resolved against
    /// `self` and overlaid, taking precedence on shared keys.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result = self.clone();
        for (var, term) in &other.map {
            result.map.insert(*var, self.apply(term));
        }
        result
    }

    /// Keep only the bindings for the given variables, with values fully
    /// resolved
    pub fn restrict(&self, vars: &std::collections::HashSet<Variable>) -> Substitution {
        let map = vars
            .iter()
            .filter(|v| self.map.contains_key(*v))
            .map(|v| (*v, self.apply(&Term::Variable(*v))))
            .collect();
        Substitution { map }
    }

    /// Bindings as a sorted list, for deterministic comparison and
    /// deduplication
    pub fn canonical(&self) -> Vec<(Variable, Term)> {
        let mut entries: Vec<(Variable, Term)> = self
            .map
            .iter()
            .map(|(v, t)| (*v, self.apply(t)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, term)) in self.canonical().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", var, term)?;
        }
        write!(f, "}}")
    }
}
