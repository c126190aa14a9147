//! Forward chaining: saturate the fact base under the rule set.

use crate::base::{FactBase, Rule};
use crate::config::{ConflictResolution, EngineConfig};
use crate::core::{Substitution, Term, Variable};
use crate::error::{Result, SyllogError};
use crate::trace::TraceEvent;
use crate::unify::match_term;
use indexmap::IndexMap;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Result of a completed forward run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ForwardOutcome {
    /// Rounds fired before the fixed point
    pub rounds: usize,
    /// Facts added across all rounds
    pub facts_added: usize,
}

/// A rule matching ready to fire: the joined bindings and the ground
/// consequents they produce. Only novel activations (at least one absent
/// consequent) are kept.
struct Activation {
    rule_idx: usize,
    priority: i32,
    specificity: usize,
    /// Max assertion stamp over the matched support facts
    support: u64,
    /// Construction order within the agenda (final tie-break key)
    seq: usize,
    derived: Vec<Term>,
}

/// Append-only sink for trace events; a no-op when tracing is off
pub(crate) struct TraceSink<'a> {
    events: Option<&'a mut Vec<TraceEvent>>,
}

impl<'a> TraceSink<'a> {
    pub(crate) fn new(events: Option<&'a mut Vec<TraceEvent>>) -> Self {
        TraceSink { events }
    }

    pub(crate) fn push(&mut self, event: TraceEvent) {
        if let Some(events) = self.events.as_mut() {
            events.push(event);
        }
    }
}

/// Run rounds until the agenda is empty.
///
/// Each round builds the agenda of novel activations, orders it by the
/// configured conflict chain, and fires the first activation. A round
/// always adds at least one fact, so the loop terminates within the size
/// of the derivable closure, or errors at `max_steps` rounds.
pub(crate) fn run(
    facts: &mut FactBase,
    rules: &[Rule],
    config: &EngineConfig,
    trace: &mut TraceSink<'_>,
) -> Result<ForwardOutcome> {
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let mut rounds = 0;
    let mut facts_added = 0;

    loop {
        let mut agenda = build_agenda(facts, rules);
        if agenda.is_empty() {
            debug!("forward: fixed point after {rounds} rounds");
            trace.push(TraceEvent::FixedPoint { rounds });
            return Ok(ForwardOutcome {
                rounds,
                facts_added,
            });
        }
        if rounds >= config.max_steps {
            debug!("forward: step limit at {rounds} rounds");
            trace.push(TraceEvent::StepLimit { steps: rounds });
            return Err(SyllogError::StepLimitExceeded { steps: rounds });
        }
        trace.push(TraceEvent::RoundStart {
            round: rounds,
            agenda_size: agenda.len(),
        });

        order_agenda(&mut agenda, config.conflict_resolution, &mut rng);
        let activation = agenda.swap_remove(0);
        let rule = &rules[activation.rule_idx];
        debug!(
            "forward: round {rounds} fires {} ({} candidate activations)",
            rule.label(activation.rule_idx),
            agenda.len() + 1
        );
        trace.push(TraceEvent::ActivationFired {
            rule_idx: activation.rule_idx,
            rule_name: rule.name.clone(),
            derived: activation.derived.clone(),
        });

        for fact in activation.derived {
            if facts.assert_fact(fact.clone())? {
                facts_added += 1;
                trace.push(TraceEvent::FactAsserted { fact });
            }
        }
        rounds += 1;
    }
}

/// All novel activations for the current fact base.
///
/// Substitutions come from the left-fold join over each rule's
/// antecedents, which enforces binding consistency for shared variables.
/// Duplicate (rule, bindings) pairs arise when wildcard patterns match
/// several facts identically; they collapse to one activation keeping
/// the most recent support stamp.
fn build_agenda(facts: &FactBase, rules: &[Rule]) -> Vec<Activation> {
    let mut agenda: IndexMap<(usize, Vec<(Variable, Term)>), Activation> = IndexMap::new();
    let mut seq = 0;

    for (rule_idx, rule) in rules.iter().enumerate() {
        let mut branches: Vec<(Substitution, u64)> = vec![(Substitution::new(), 0)];
        for pattern in &rule.when {
            let mut next = Vec::new();
            for (subst, support) in &branches {
                for fact in facts.candidates(pattern) {
                    if let Ok(extended) = match_term(pattern, fact, subst) {
                        let stamp = facts.stamp(fact).unwrap_or(0);
                        next.push((extended, (*support).max(stamp)));
                    }
                }
            }
            branches = next;
            if branches.is_empty() {
                break;
            }
        }

        for (subst, support) in branches {
            let derived: Vec<Term> = rule.then.iter().map(|c| subst.apply(c)).collect();
            if !derived.iter().all(Term::is_ground) {
                continue;
            }
            if derived.iter().all(|fact| facts.contains(fact)) {
                continue; // not novel
            }
            let key = (rule_idx, subst.canonical());
            match agenda.get_mut(&key) {
                Some(existing) => existing.support = existing.support.max(support),
                None => {
                    agenda.insert(
                        key,
                        Activation {
                            rule_idx,
                            priority: rule.priority,
                            specificity: rule.when.len(),
                            support,
                            seq,
                            derived,
                        },
                    );
                    seq += 1;
                }
            }
        }
    }

    agenda.into_values().collect()
}

/// Order the agenda by the configured total-order chain. The trailing
/// (rule index, sequence) keys make every chain a total order, so runs
/// are reproducible; `Random` shuffles each priority tie group with the
/// seeded generator.
fn order_agenda(agenda: &mut Vec<Activation>, chain: ConflictResolution, rng: &mut StdRng) {
    match chain {
        ConflictResolution::Priority => {
            agenda.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(a.rule_idx.cmp(&b.rule_idx))
                    .then(a.seq.cmp(&b.seq))
            });
        }
        ConflictResolution::Specificity => {
            agenda.sort_by(|a, b| {
                b.specificity
                    .cmp(&a.specificity)
                    .then(b.priority.cmp(&a.priority))
                    .then(a.rule_idx.cmp(&b.rule_idx))
                    .then(a.seq.cmp(&b.seq))
            });
        }
        ConflictResolution::Recency => {
            agenda.sort_by(|a, b| {
                b.support
                    .cmp(&a.support)
                    .then(b.priority.cmp(&a.priority))
                    .then(a.rule_idx.cmp(&b.rule_idx))
                    .then(a.seq.cmp(&b.seq))
            });
        }
        ConflictResolution::Mrs => {
            agenda.sort_by(|a, b| {
                b.support
                    .cmp(&a.support)
                    .then(b.specificity.cmp(&a.specificity))
                    .then(a.rule_idx.cmp(&b.rule_idx))
                    .then(a.seq.cmp(&b.seq))
            });
        }
        ConflictResolution::Mevis => {
            agenda.sort_by(|a, b| {
                b.specificity
                    .cmp(&a.specificity)
                    .then(b.support.cmp(&a.support))
                    .then(a.rule_idx.cmp(&b.rule_idx))
                    .then(a.seq.cmp(&b.seq))
            });
        }
        ConflictResolution::Random => {
            agenda.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
            let mut start = 0;
            while start < agenda.len() {
                let priority = agenda[start].priority;
                let mut end = start + 1;
                while end < agenda.len() && agenda[end].priority == priority {
                    end += 1;
                }
                agenda[start..end].shuffle(rng);
                start = end;
            }
        }
    }
}
