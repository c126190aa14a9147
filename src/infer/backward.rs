//! Backward chaining: goal-driven proof search with proof trees.

use crate::base::{FactBase, Rule};
use crate::config::SearchStrategy;
use crate::core::{Substitution, SymbolId, Term};
use crate::trace::TraceEvent;
use crate::unify::unify;
use log::trace as log_trace;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

/// A proof of a goal.
///
/// `Fact` proofs close a branch against a stored fact; `Rule` proofs
/// record the rule applied and one proof per antecedent, in antecedent
/// order. `bindings` is the substitution as of the moment the proof was
/// completed, so threading it into a following goal keeps shared
/// variables consistent.
#[derive(Debug, Clone, PartialEq)]
pub enum Proof {
    Fact {
        goal: Term,
        bindings: Substitution,
        fact: Term,
    },
    Rule {
        goal: Term,
        bindings: Substitution,
        rule: Rule,
        children: Vec<Proof>,
    },
}

impl Proof {
    pub fn goal(&self) -> &Term {
        match self {
            Proof::Fact { goal, .. } | Proof::Rule { goal, .. } => goal,
        }
    }

    pub fn bindings(&self) -> &Substitution {
        match self {
            Proof::Fact { bindings, .. } | Proof::Rule { bindings, .. } => bindings,
        }
    }

    /// Total number of nodes in this tree
    pub fn node_count(&self) -> usize {
        match self {
            Proof::Fact { .. } => 1,
            Proof::Rule { children, .. } => {
                1 + children.iter().map(Proof::node_count).sum::<usize>()
            }
        }
    }

    /// Height of this tree (a fact leaf has depth 1)
    pub fn tree_depth(&self) -> usize {
        match self {
            Proof::Fact { .. } => 1,
            Proof::Rule { children, .. } => {
                1 + children.iter().map(Proof::tree_depth).max().unwrap_or(0)
            }
        }
    }

    /// Labels of the rules applied anywhere in this tree, pre-order,
    /// without duplicates
    pub fn rules_used(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_rules(&mut out);
        out
    }

    fn collect_rules(&self, out: &mut Vec<String>) {
        if let Proof::Rule { rule, children, .. } = self {
            let label = rule
                .name
                .clone()
                .unwrap_or_else(|| "<unnamed>".to_string());
            if !out.contains(&label) {
                out.push(label);
            }
            for child in children {
                child.collect_rules(out);
            }
        }
    }
}

/// A proof tree plus summary metadata, as returned by `explain`
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub proof: Proof,
    pub node_count: usize,
    pub tree_depth: usize,
    pub rules_used: Vec<String>,
}

impl Explanation {
    pub fn new(proof: Proof) -> Self {
        let node_count = proof.node_count();
        let tree_depth = proof.tree_depth();
        let rules_used = proof.rules_used();
        Explanation {
            proof,
            node_count,
            tree_depth,
            rules_used,
        }
    }
}

/// Per-query options; unset fields fall back to the engine config
#[derive(Debug, Clone, Default)]
pub struct ProveOptions {
    pub strategy: Option<SearchStrategy>,
    pub max_depth: Option<usize>,
    /// Stop after this many proofs (or bindings, for `ask`)
    pub limit: Option<usize>,
}

impl ProveOptions {
    pub fn limited(limit: usize) -> Self {
        ProveOptions {
            limit: Some(limit),
            ..ProveOptions::default()
        }
    }
}

/// One proof search over a frozen view of the engine state.
pub(crate) struct Prover<'a> {
    facts: &'a FactBase,
    rules: &'a [Rule],
    strategy: SearchStrategy,
    max_depth: usize,
    not_symbol: SymbolId,
    /// Next scope for standardizing a rule apart from the goal
    next_scope: Cell<u32>,
    /// Advisory flag: some branch was pruned at the configured depth
    depth_limit_hit: &'a Cell<bool>,
    trace: Option<&'a RefCell<Vec<TraceEvent>>>,
}

impl<'a> Prover<'a> {
    pub(crate) fn new(
        facts: &'a FactBase,
        rules: &'a [Rule],
        strategy: SearchStrategy,
        max_depth: usize,
        not_symbol: SymbolId,
        depth_limit_hit: &'a Cell<bool>,
        trace: Option<&'a RefCell<Vec<TraceEvent>>>,
    ) -> Self {
        Prover {
            facts,
            rules,
            strategy,
            max_depth,
            not_symbol,
            next_scope: Cell::new(1),
            depth_limit_hit,
            trace,
        }
    }

    /// Enumerate proofs of `goal`, capped by `limit` when given
    pub(crate) fn run(&self, goal: &Term, limit: Option<usize>) -> Vec<Proof> {
        let mut proofs = match self.strategy {
            SearchStrategy::DepthFirst | SearchStrategy::BreadthFirst => self.prove_goal(
                goal,
                &Substitution::new(),
                0,
                self.max_depth,
                &mut Vec::new(),
            ),
            SearchStrategy::IterativeDeepening => self.iterative_deepening(goal),
        };
        if let Some(limit) = limit {
            proofs.truncate(limit);
        }
        proofs
    }

    /// Depth-first passes with caps 0, 1, ..., max_depth, deduplicating
    /// proofs by their instantiated goal and restricted bindings.
    fn iterative_deepening(&self, goal: &Term) -> Vec<Proof> {
        let goal_vars = goal.vars();
        let mut seen: HashSet<(Term, Vec<_>)> = HashSet::new();
        let mut out = Vec::new();
        for cap in 0..=self.max_depth {
            let pass = self.prove_goal(goal, &Substitution::new(), 0, cap, &mut Vec::new());
            for proof in pass {
                let bindings = proof.bindings();
                let key = (
                    bindings.apply(proof.goal()),
                    bindings.restrict(&goal_vars).canonical(),
                );
                if seen.insert(key) {
                    out.push(proof);
                }
            }
        }
        out
    }

    /// All proofs of `goal` under `subst`, searching to `cap`.
    ///
    /// `stack` carries the (rule, instantiated goal) frames currently
    /// being expanded; re-entering one fails the branch.
    fn prove_goal(
        &self,
        goal: &Term,
        subst: &Substitution,
        depth: usize,
        cap: usize,
        stack: &mut Vec<(usize, Term)>,
    ) -> Vec<Proof> {
        if depth > cap {
            if cap >= self.max_depth {
                self.depth_limit_hit.set(true);
            }
            self.push_trace(|| TraceEvent::DepthCut {
                goal: subst.apply(goal),
                depth,
            });
            return Vec::new();
        }
        let goal = subst.apply(goal);
        log_trace!("prove: depth {depth} goal {goal}");
        self.push_trace(|| TraceEvent::GoalEnter {
            goal: goal.clone(),
            depth,
        });

        // Negation as failure: [:not g] succeeds, binding nothing, iff g
        // has no proof. Sound only under the closed-world assumption. The
        // subquery always searches to the configured depth; an
        // iterative-deepening pass must not report "no proof" while its
        // own cap is still shallow.
        if let Some(inner) = self.negation_body(&goal) {
            let refutations = self.prove_goal(inner, subst, depth + 1, self.max_depth, stack);
            if refutations.is_empty() {
                return vec![Proof::Fact {
                    goal: goal.clone(),
                    bindings: subst.clone(),
                    fact: goal.clone(),
                }];
            }
            return Vec::new();
        }

        // One stream per alternative: the fact branch first, then one per
        // rule. Depth-first concatenates; breadth-first round-robins.
        let mut alternatives: Vec<Vec<Proof>> = Vec::new();

        let mut fact_stream = Vec::new();
        for fact in self.facts.candidates(&goal) {
            if let Ok(extended) = unify(&goal, fact, subst) {
                fact_stream.push(Proof::Fact {
                    goal: goal.clone(),
                    bindings: extended,
                    fact: fact.clone(),
                });
            }
        }
        alternatives.push(fact_stream);

        for (rule_idx, rule) in self.rules.iter().enumerate() {
            let frame = (rule_idx, goal.clone());
            if stack.contains(&frame) {
                self.push_trace(|| TraceEvent::LoopCut {
                    rule_idx,
                    goal: goal.clone(),
                });
                continue;
            }

            let mut rule_stream = Vec::new();
            for consequent in &rule.then {
                let scope = self.fresh_scope();
                let lifted = consequent.lift(scope);
                let matched = match unify(&goal, &lifted, subst) {
                    Ok(matched) => matched,
                    Err(_) => continue,
                };
                let antecedents: Vec<Term> =
                    rule.when.iter().map(|p| p.lift(scope)).collect();

                stack.push(frame.clone());
                let solutions =
                    self.solve_sequence(&antecedents, &matched, depth + 1, cap, stack);
                stack.pop();

                for (bindings, children) in solutions {
                    rule_stream.push(Proof::Rule {
                        goal: goal.clone(),
                        bindings,
                        rule: rule.clone(),
                        children,
                    });
                }
            }
            alternatives.push(rule_stream);
        }

        let proofs = match self.strategy {
            SearchStrategy::BreadthFirst => interleave(alternatives),
            _ => alternatives.into_iter().flatten().collect(),
        };
        if !proofs.is_empty() {
            self.push_trace(|| TraceEvent::GoalProved {
                goal: goal.clone(),
                depth,
            });
        }
        proofs
    }

    /// Prove a sequence of goals left to right, threading the
    /// substitution; the result is the Cartesian product of the per-goal
    /// proofs, each with the final substitution it leads to.
    fn solve_sequence(
        &self,
        goals: &[Term],
        subst: &Substitution,
        depth: usize,
        cap: usize,
        stack: &mut Vec<(usize, Term)>,
    ) -> Vec<(Substitution, Vec<Proof>)> {
        let Some((first, rest)) = goals.split_first() else {
            return vec![(subst.clone(), Vec::new())];
        };
        let mut out = Vec::new();
        for proof in self.prove_goal(first, subst, depth, cap, stack) {
            let threaded = proof.bindings().clone();
            for (bindings, mut children) in
                self.solve_sequence(rest, &threaded, depth, cap, stack)
            {
                children.insert(0, proof.clone());
                out.push((bindings, children));
            }
        }
        out
    }

    fn negation_body<'g>(&self, goal: &'g Term) -> Option<&'g Term> {
        match goal {
            Term::Compound(items)
                if items.len() == 2
                    && items[0] == Term::symbol(self.not_symbol) =>
            {
                Some(&items[1])
            }
            _ => None,
        }
    }

    fn fresh_scope(&self) -> u32 {
        let scope = self.next_scope.get();
        self.next_scope.set(scope + 1);
        scope
    }

    fn push_trace(&self, event: impl FnOnce() -> TraceEvent) {
        if let Some(trace) = self.trace {
            trace.borrow_mut().push(event());
        }
    }
}

/// Round-robin across alternative proof streams
fn interleave(streams: Vec<Vec<Proof>>) -> Vec<Proof> {
    let mut iters: Vec<_> = streams.into_iter().map(Vec::into_iter).collect();
    let mut out = Vec::new();
    loop {
        let mut exhausted = true;
        for iter in &mut iters {
            if let Some(proof) = iter.next() {
                out.push(proof);
                exhausted = false;
            }
        }
        if exhausted {
            return out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FactBase;
    use crate::core::Interner;
    use crate::parser;

    struct TestContext {
        interner: Interner,
        facts: FactBase,
        rules: Vec<Rule>,
        not_symbol: SymbolId,
        flag: Cell<bool>,
    }

    impl TestContext {
        fn new() -> Self {
            let mut interner = Interner::new();
            let not_symbol = interner.intern_symbol("not");
            TestContext {
                interner,
                facts: FactBase::new(),
                rules: Vec::new(),
                not_symbol,
                flag: Cell::new(false),
            }
        }

        fn fact(&mut self, text: &str) {
            let fact = parser::parse_fact(text, &mut self.interner).unwrap();
            self.facts.assert_fact(fact).unwrap();
        }

        fn rule(&mut self, text: &str) {
            let rule = parser::parse_rule(text, &mut self.interner).unwrap();
            rule.validate().unwrap();
            self.rules.push(rule);
        }

        fn goal(&mut self, text: &str) -> Term {
            parser::parse_term(text, &mut self.interner).unwrap()
        }

        fn prover(&self, strategy: SearchStrategy, max_depth: usize) -> Prover<'_> {
            Prover::new(
                &self.facts,
                &self.rules,
                strategy,
                max_depth,
                self.not_symbol,
                &self.flag,
                None,
            )
        }

        /// The goal instantiated by each proof, rendered for assertions
        fn answers(&self, goal: &Term, proofs: &[Proof]) -> Vec<String> {
            proofs
                .iter()
                .map(|proof| {
                    proof
                        .bindings()
                        .apply(goal)
                        .display(&self.interner)
                        .to_string()
                })
                .collect()
        }
    }

    #[test]
    fn test_fact_proofs_follow_insertion_order() {
        let mut ctx = TestContext::new();
        ctx.fact("[:person :alice]");
        ctx.fact("[:person :bob]");
        let goal = ctx.goal("[:person ?who]");

        let proofs = ctx.prover(SearchStrategy::DepthFirst, 10).run(&goal, None);
        assert_eq!(
            ctx.answers(&goal, &proofs),
            vec!["[:person :alice]", "[:person :bob]"]
        );
    }

    #[test]
    fn test_rule_proof_children_follow_antecedent_order() {
        let mut ctx = TestContext::new();
        ctx.fact("[:p :a]");
        ctx.fact("[:q :a]");
        ctx.rule("{when [[:p ?x] [:q ?x]], then [[:r ?x]], name join}");
        let goal = ctx.goal("[:r :a]");

        let proofs = ctx.prover(SearchStrategy::DepthFirst, 10).run(&goal, None);
        assert_eq!(proofs.len(), 1);
        match &proofs[0] {
            Proof::Rule { rule, children, .. } => {
                assert_eq!(rule.name.as_deref(), Some("join"));
                assert_eq!(children.len(), 2);
                let first = children[0].bindings().apply(children[0].goal());
                let second = children[1].bindings().apply(children[1].goal());
                assert_eq!(first.display(&ctx.interner).to_string(), "[:p :a]");
                assert_eq!(second.display(&ctx.interner).to_string(), "[:q :a]");
            }
            other => panic!("expected rule proof, got {other:?}"),
        }
    }

    #[test]
    fn test_breadth_first_interleaves_alternatives() {
        let mut ctx = TestContext::new();
        ctx.fact("[:p :a]");
        ctx.fact("[:p :b]");
        ctx.fact("[:s :c]");
        ctx.fact("[:s :d]");
        ctx.rule("{when [[:s ?x]], then [[:p ?x]]}");
        let goal = ctx.goal("[:p ?x]");

        let depth_first = ctx.prover(SearchStrategy::DepthFirst, 10).run(&goal, None);
        assert_eq!(
            ctx.answers(&goal, &depth_first),
            vec!["[:p :a]", "[:p :b]", "[:p :c]", "[:p :d]"]
        );

        let breadth_first = ctx.prover(SearchStrategy::BreadthFirst, 10).run(&goal, None);
        assert_eq!(
            ctx.answers(&goal, &breadth_first),
            vec!["[:p :a]", "[:p :c]", "[:p :b]", "[:p :d]"]
        );
    }

    #[test]
    fn test_iterative_deepening_deduplicates() {
        let mut ctx = TestContext::new();
        ctx.fact("[:p :a]");
        ctx.rule("{when [[:p ?x]], then [[:p ?x]]}");
        let goal = ctx.goal("[:p :a]");

        // depth-first sees the fact directly and again through the rule
        let depth_first = ctx.prover(SearchStrategy::DepthFirst, 5).run(&goal, None);
        assert_eq!(depth_first.len(), 2);

        // iterative deepening collapses both onto one (goal, bindings) pair
        let deepening = ctx
            .prover(SearchStrategy::IterativeDeepening, 5)
            .run(&goal, None);
        assert_eq!(deepening.len(), 1);
        assert!(matches!(deepening[0], Proof::Fact { .. }));
    }

    #[test]
    fn test_limit_truncates() {
        let mut ctx = TestContext::new();
        ctx.fact("[:p :a]");
        ctx.fact("[:p :b]");
        ctx.fact("[:p :c]");
        let goal = ctx.goal("[:p ?x]");

        let proofs = ctx.prover(SearchStrategy::DepthFirst, 10).run(&goal, Some(2));
        assert_eq!(proofs.len(), 2);
    }

    #[test]
    fn test_depth_cut_sets_advisory_flag() {
        let mut ctx = TestContext::new();
        ctx.fact("[:p :a]");
        ctx.rule("{when [[:p ?x]], then [[:q ?x]]}");
        let goal = ctx.goal("[:q :a]");

        let proofs = ctx.prover(SearchStrategy::DepthFirst, 0).run(&goal, None);
        assert!(proofs.is_empty());
        assert!(ctx.flag.get());
    }

    #[test]
    fn test_shared_variables_thread_across_antecedents() {
        let mut ctx = TestContext::new();
        ctx.fact("[:parent :alice :bob]");
        ctx.fact("[:parent :bob :carol]");
        ctx.rule("{when [[:parent ?x ?y] [:parent ?y ?z]], then [[:grandparent ?x ?z]]}");
        let goal = ctx.goal("[:grandparent ?a ?b]");

        let proofs = ctx.prover(SearchStrategy::DepthFirst, 10).run(&goal, None);
        assert_eq!(
            ctx.answers(&goal, &proofs),
            vec!["[:grandparent :alice :carol]"]
        );
    }
}
