//! Engine facade: owns the fact base, the rule list, and the
//! configuration, and drives both chainers.

use crate::base::{FactBase, Rule};
use crate::config::EngineConfig;
use crate::core::{Interner, Substitution, SymbolId, Term};
use crate::error::{Result, SyllogError};
use crate::infer::backward::{Explanation, Proof, ProveOptions, Prover};
use crate::infer::forward::{self, ForwardOutcome, TraceSink};
use crate::parser;
use crate::trace::TraceEvent;
use serde::Serialize;
use std::cell::{Cell, RefCell};

/// Counts reported by [`Engine::stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub fact_count: usize,
    pub rule_count: usize,
    /// Forward rounds fired since creation
    pub forward_steps: u64,
    /// Proofs produced by backward queries since creation
    pub proofs_produced: u64,
    /// Some backward branch was pruned at the configured depth
    pub depth_limit_hit: bool,
}

#[derive(Debug, Default)]
struct Counters {
    forward_steps: Cell<u64>,
    proofs_produced: Cell<u64>,
    depth_limit_hit: Cell<bool>,
}

/// A symbolic inference engine over a fact base.
///
/// One logical actor drives an engine: mutation (assert, retract,
/// add_rule, run_forward, configure, clear) takes `&mut self`, queries
/// take `&self` and run to completion within their step or depth bound.
/// Engines are independent; running several in parallel shares nothing.
pub struct Engine {
    interner: Interner,
    facts: FactBase,
    rules: Vec<Rule>,
    config: EngineConfig,
    not_symbol: SymbolId,
    counters: Counters,
    trace: RefCell<Vec<TraceEvent>>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut interner = Interner::new();
        let not_symbol = interner.intern_symbol("not");
        Engine {
            interner,
            facts: FactBase::new(),
            rules: Vec::new(),
            config,
            not_symbol,
            counters: Counters::default(),
            trace: RefCell::new(Vec::new()),
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Set one configuration option from its string key and value
    pub fn configure(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set(key, value)
    }

    // === Facts and rules ===

    /// Add a ground fact. Idempotent; returns true when the fact was new.
    pub fn assert_fact(&mut self, fact: Term) -> Result<bool> {
        self.facts.assert_fact(fact)
    }

    /// Remove a fact; no-op when absent
    pub fn retract(&mut self, fact: &Term) -> bool {
        self.facts.retract(fact)
    }

    pub fn contains(&self, fact: &Term) -> bool {
        self.facts.contains(fact)
    }

    /// All facts, in insertion order
    pub fn facts(&self) -> impl Iterator<Item = &Term> {
        self.facts.iter()
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// The underlying fact base
    pub fn fact_base(&self) -> &FactBase {
        &self.facts
    }

    /// Empty the fact base (rules and configuration survive)
    pub fn clear(&mut self) {
        self.facts.clear();
    }

    /// Add a rule after checking its safety conditions
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        rule.validate()?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    // === Forward chaining ===

    /// Run forward rounds to fixed point, or error at `max_steps`
    pub fn run_forward(&mut self) -> Result<ForwardOutcome> {
        let outcome = {
            let mut buffer = self.trace.borrow_mut();
            let mut sink = TraceSink::new(if self.config.trace {
                Some(&mut *buffer)
            } else {
                None
            });
            forward::run(&mut self.facts, &self.rules, &self.config, &mut sink)
        };

        let steps = match &outcome {
            Ok(done) => done.rounds as u64,
            Err(SyllogError::StepLimitExceeded { steps }) => *steps as u64,
            Err(_) => 0,
        };
        self.counters
            .forward_steps
            .set(self.counters.forward_steps.get() + steps);
        outcome
    }

    // === Backward chaining ===

    /// Enumerate all proofs of `goal` under the engine configuration
    pub fn prove(&self, goal: &Term) -> Result<Vec<Proof>> {
        self.prove_with(goal, &ProveOptions::default())
    }

    /// Enumerate proofs with per-query overrides
    pub fn prove_with(&self, goal: &Term, opts: &ProveOptions) -> Result<Vec<Proof>> {
        if !goal.is_compound() || goal.is_empty_compound() {
            return Err(SyllogError::Validation(format!(
                "a goal must be a non-empty compound, got {goal}"
            )));
        }
        let prover = Prover::new(
            &self.facts,
            &self.rules,
            opts.strategy.unwrap_or(self.config.strategy),
            opts.max_depth.unwrap_or(self.config.max_depth),
            self.not_symbol,
            &self.counters.depth_limit_hit,
            if self.config.trace {
                Some(&self.trace)
            } else {
                None
            },
        );
        let proofs = prover.run(goal, opts.limit);
        self.counters
            .proofs_produced
            .set(self.counters.proofs_produced.get() + proofs.len() as u64);
        Ok(proofs)
    }

    /// First proof of `goal`, if any
    pub fn prove_one(&self, goal: &Term) -> Result<Option<Proof>> {
        let mut proofs = self.prove_with(goal, &ProveOptions::limited(1))?;
        Ok(proofs.pop())
    }

    /// Bindings of every proof, restricted to the variables of `goal`
    pub fn ask(&self, goal: &Term) -> Result<Vec<Substitution>> {
        self.ask_with(goal, &ProveOptions::default())
    }

    pub fn ask_with(&self, goal: &Term, opts: &ProveOptions) -> Result<Vec<Substitution>> {
        let goal_vars = goal.vars();
        let proofs = self.prove_with(goal, opts)?;
        Ok(proofs
            .iter()
            .map(|proof| proof.bindings().restrict(&goal_vars))
            .collect())
    }

    /// First proof of `goal` with summary metadata
    pub fn explain(&self, goal: &Term) -> Result<Option<Explanation>> {
        Ok(self.prove_one(goal)?.map(Explanation::new))
    }

    // === Introspection ===

    pub fn stats(&self) -> Stats {
        Stats {
            fact_count: self.facts.len(),
            rule_count: self.rules.len(),
            forward_steps: self.counters.forward_steps.get(),
            proofs_produced: self.counters.proofs_produced.get(),
            depth_limit_hit: self.counters.depth_limit_hit.get(),
        }
    }

    /// Events recorded since the last [`take_trace`](Engine::take_trace)
    pub fn trace_events(&self) -> Vec<TraceEvent> {
        self.trace.borrow().clone()
    }

    /// Drain the trace buffer
    pub fn take_trace(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.trace.borrow_mut())
    }

    // === Text-syntax conveniences ===

    /// Parse a term, interning through this engine
    pub fn parse_term(&mut self, text: &str) -> Result<Term> {
        parser::parse_term(text, &mut self.interner)
    }

    /// Parse and assert a ground fact
    pub fn assert_str(&mut self, text: &str) -> Result<bool> {
        let fact = parser::parse_fact(text, &mut self.interner)?;
        self.assert_fact(fact)
    }

    /// Parse a fact and retract it
    pub fn retract_str(&mut self, text: &str) -> Result<bool> {
        let fact = parser::parse_fact(text, &mut self.interner)?;
        Ok(self.retract(&fact))
    }

    /// Parse and add a rule
    pub fn add_rule_str(&mut self, text: &str) -> Result<()> {
        let rule = parser::parse_rule(text, &mut self.interner)?;
        self.add_rule(rule)
    }

    /// Parse a goal and ask it
    pub fn ask_str(&mut self, text: &str) -> Result<Vec<Substitution>> {
        let goal = parser::parse_term(text, &mut self.interner)?;
        self.ask(&goal)
    }

    /// Parse a goal and prove it
    pub fn prove_str(&mut self, text: &str) -> Result<Vec<Proof>> {
        let goal = parser::parse_term(text, &mut self.interner)?;
        self.prove(&goal)
    }
}
