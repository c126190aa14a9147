//! Diagnostic event log.
//!
//! When `EngineConfig::trace` is set, both chainers append events to the
//! engine's trace buffer. Events carry interned terms and serialize
//! compactly; resolve names through `json.rs` for human-readable export.

use crate::core::Term;
use serde::{Deserialize, Serialize};

/// One diagnostic event from a forward round or a backward search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A forward round began with this agenda
    RoundStart { round: usize, agenda_size: usize },
    /// The selected activation fired
    ActivationFired {
        rule_idx: usize,
        rule_name: Option<String>,
        derived: Vec<Term>,
    },
    /// A derived fact entered the base
    FactAsserted { fact: Term },
    /// Forward chaining reached a fixed point
    FixedPoint { rounds: usize },
    /// Forward chaining hit the round cap
    StepLimit { steps: usize },
    /// The prover descended into a goal
    GoalEnter { goal: Term, depth: usize },
    /// A proof of this goal was emitted
    GoalProved { goal: Term, depth: usize },
    /// A branch was pruned by the depth bound
    DepthCut { goal: Term, depth: usize },
    /// A branch re-entered an active (rule, goal) frame
    LoopCut { rule_idx: usize, goal: Term },
}
