//! Property-based tests for unification and matching using proptest.

use super::{match_term, unify};
use crate::core::{Interner, Substitution, Term};
use proptest::prelude::*;

/// Term description (before interning)
#[derive(Debug, Clone)]
enum TermDesc {
    Var(u8),
    Sym(u8),
    Int(i64),
    Compound(Vec<TermDesc>),
}

fn arb_term_desc(max_depth: u32) -> BoxedStrategy<TermDesc> {
    if max_depth == 0 {
        prop_oneof![
            (0..4u8).prop_map(TermDesc::Var),
            (0..4u8).prop_map(TermDesc::Sym),
            (-2..3i64).prop_map(TermDesc::Int),
        ]
        .boxed()
    } else {
        prop_oneof![
            3 => (0..4u8).prop_map(TermDesc::Var),
            3 => (0..4u8).prop_map(TermDesc::Sym),
            1 => (-2..3i64).prop_map(TermDesc::Int),
            2 => proptest::collection::vec(arb_term_desc(max_depth - 1), 1..=3)
                .prop_map(TermDesc::Compound),
        ]
        .boxed()
    }
}

fn build_term(desc: &TermDesc, interner: &mut Interner) -> Term {
    match desc {
        TermDesc::Var(i) => {
            let id = interner.intern_variable(&format!("x{}", i));
            Term::variable(id)
        }
        TermDesc::Sym(i) => {
            let id = interner.intern_symbol(&format!("s{}", i));
            Term::symbol(id)
        }
        TermDesc::Int(n) => Term::int(*n),
        TermDesc::Compound(items) => Term::Compound(
            items
                .iter()
                .map(|item| build_term(item, interner))
                .collect(),
        ),
    }
}

/// Replace every variable in a term with a distinct ground atom, yielding
/// a fact that the original term matches.
fn ground_out(term: &Term, interner: &mut Interner) -> Term {
    match term {
        Term::Variable(v) => {
            let name = format!("g{}", v.name.as_u32());
            Term::symbol(interner.intern_symbol(&name))
        }
        Term::Wildcard | Term::Atom(_) => term.clone(),
        Term::Compound(items) => Term::Compound(
            items
                .iter()
                .map(|item| ground_out(item, interner))
                .collect(),
        ),
    }
}

/// Every stored binding must be occurs-safe under the final substitution
fn occurs_safe(subst: &Substitution) -> bool {
    subst.iter().all(|(var, term)| !subst.occurs(var, term))
}

proptest! {
    /// Unify soundness: a successful unifier equalizes both terms, and
    /// every stored binding passes the occurs check.
    #[test]
    fn prop_unify_soundness(d1 in arb_term_desc(3), d2 in arb_term_desc(3)) {
        let mut interner = Interner::new();
        let t1 = build_term(&d1, &mut interner);
        let t2 = build_term(&d2, &mut interner);

        if let Ok(subst) = unify(&t1, &t2, &Substitution::new()) {
            prop_assert_eq!(subst.apply(&t1), subst.apply(&t2));
            prop_assert!(occurs_safe(&subst));
        }
    }

    /// Apply idempotence: applying a unifier twice equals applying once.
    #[test]
    fn prop_apply_idempotent(d1 in arb_term_desc(3), d2 in arb_term_desc(3)) {
        let mut interner = Interner::new();
        let t1 = build_term(&d1, &mut interner);
        let t2 = build_term(&d2, &mut interner);

        if let Ok(subst) = unify(&t1, &t2, &Substitution::new()) {
            let once = subst.apply(&t1);
            prop_assert_eq!(subst.apply(&once), once);
        }
    }

    /// Match soundness: matching a pattern against a grounded copy of
    /// itself succeeds and instantiates the pattern back to the fact.
    #[test]
    fn prop_match_soundness(desc in arb_term_desc(3)) {
        let mut interner = Interner::new();
        let pattern = build_term(&desc, &mut interner);
        let fact = ground_out(&pattern, &mut interner);

        let subst = match_term(&pattern, &fact, &Substitution::new())
            .expect("pattern must match its own grounding");
        prop_assert_eq!(subst.apply(&pattern), fact);
        prop_assert!(occurs_safe(&subst));
    }

    /// A match result extends the initial substitution: every initial
    /// binding survives unchanged.
    #[test]
    fn prop_match_extends_initial(desc in arb_term_desc(2)) {
        let mut interner = Interner::new();
        let pattern = build_term(&desc, &mut interner);
        let fact = ground_out(&pattern, &mut interner);

        let seed_var = crate::core::Variable::new(interner.intern_variable("seed"));
        let seed_val = Term::symbol(interner.intern_symbol("seeded"));
        let mut initial = Substitution::new();
        prop_assert!(initial.extend(seed_var, &seed_val));

        if let Ok(subst) = match_term(&pattern, &fact, &initial) {
            prop_assert_eq!(subst.get(&seed_var), Some(&seed_val));
        }
    }
}
