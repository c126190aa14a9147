//! One-sided pattern matching against ground facts.

use super::mgu::{UnifyFailure, UnifyResult};
use crate::core::{Substitution, Term};

/// Match `pattern` against `fact`, extending `subst`.
///
/// Only pattern-side variables bind; a variable already bound must agree
/// with the fact exactly. Wildcards match anything and never bind. The
/// fact side is expected to be ground; a variable on the fact side never
/// matches anything but a pattern wildcard or an unbound pattern variable.
pub fn match_term(pattern: &Term, fact: &Term, subst: &Substitution) -> UnifyResult {
    let mut result = subst.clone();
    match_into(pattern, fact, &mut result)?;
    Ok(result)
}

/// Every substitution obtained by matching `pattern` against one of
/// `facts`, in the facts' iteration order.
pub fn match_all<'a, I>(pattern: &Term, facts: I, subst: &Substitution) -> Vec<Substitution>
where
    I: IntoIterator<Item = &'a Term>,
{
    facts
        .into_iter()
        .filter_map(|fact| match_term(pattern, fact, subst).ok())
        .collect()
}

/// Instantiate `pattern` under `subst`; ground iff every variable in the
/// pattern is bound.
pub fn bind(pattern: &Term, subst: &Substitution) -> Term {
    subst.apply(pattern)
}

fn match_into(
    pattern: &Term,
    fact: &Term,
    subst: &mut Substitution,
) -> std::result::Result<(), UnifyFailure> {
    match (pattern, fact) {
        (Term::Wildcard, _) => Ok(()),

        (Term::Variable(v), t) => {
            if subst.contains(v) {
                let bound = subst.apply(pattern);
                if bound == *t {
                    Ok(())
                } else {
                    Err(UnifyFailure::Clash(bound, t.clone()))
                }
            } else if subst.extend(*v, t) {
                Ok(())
            } else {
                Err(UnifyFailure::OccursCheck(*v, t.clone()))
            }
        }

        (Term::Atom(a), Term::Atom(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(UnifyFailure::Clash(pattern.clone(), fact.clone()))
            }
        }

        (Term::Compound(ps), Term::Compound(fs)) => {
            if ps.len() != fs.len() {
                return Err(UnifyFailure::LengthMismatch(ps.len(), fs.len()));
            }
            for (p, f) in ps.iter().zip(fs.iter()) {
                match_into(p, f, subst)?;
            }
            Ok(())
        }

        _ => Err(UnifyFailure::Clash(pattern.clone(), fact.clone())),
    }
}
