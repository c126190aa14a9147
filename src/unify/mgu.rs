//! Most general unifier computation.

use crate::core::{Substitution, Term, Variable};

/// Why a unification or match attempt failed.
///
/// Failures are ordinary values (a goal that does not unify simply yields
/// no bindings); the variants exist for trace output, not for `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifyFailure {
    /// Variable occurs in the term it would be bound to
    OccursCheck(Variable, Term),
    /// Structurally incompatible terms
    Clash(Term, Term),
    /// Compounds of different length
    LengthMismatch(usize, usize),
}

pub type UnifyResult = std::result::Result<Substitution, UnifyFailure>;

/// Unify two terms under an initial substitution, returning the most
/// general unifier extending it.
///
/// Robinson's algorithm with an immediate occurs check at every binding.
/// Wildcards unify with anything and are never recorded; distinct
/// wildcards do not alias each other.
pub fn unify(t1: &Term, t2: &Term, subst: &Substitution) -> UnifyResult {
    let mut result = subst.clone();
    unify_into(t1, t2, &mut result)?;
    Ok(result)
}

/// Unify every term in `terms` pairwise, folding left
pub fn unify_all(terms: &[Term], subst: &Substitution) -> UnifyResult {
    let mut result = subst.clone();
    for pair in terms.windows(2) {
        unify_into(&pair[0], &pair[1], &mut result)?;
    }
    Ok(result)
}

fn unify_into(
    t1: &Term,
    t2: &Term,
    subst: &mut Substitution,
) -> std::result::Result<(), UnifyFailure> {
    let a = subst.apply(t1);
    let b = subst.apply(t2);

    match (&a, &b) {
        _ if a == b => Ok(()),

        (Term::Wildcard, _) | (_, Term::Wildcard) => Ok(()),

        (Term::Variable(v), t) | (t, Term::Variable(v)) => {
            if subst.extend(*v, t) {
                Ok(())
            } else {
                Err(UnifyFailure::OccursCheck(*v, (*t).clone()))
            }
        }

        (Term::Compound(xs), Term::Compound(ys)) => {
            if xs.len() != ys.len() {
                return Err(UnifyFailure::LengthMismatch(xs.len(), ys.len()));
            }
            for (x, y) in xs.iter().zip(ys.iter()) {
                unify_into(x, y, subst)?;
            }
            Ok(())
        }

        _ => Err(UnifyFailure::Clash(a.clone(), b.clone())),
    }
}
