//! Engine configuration types.

use crate::error::{Result, SyllogError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Search order for the backward prover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// All proofs from the fact branch, then rule by rule, descending eagerly
    DepthFirst,
    /// Interleave proofs across alternatives at each choice point
    BreadthFirst,
    /// Depth-first with caps 0, 1, 2, ..., max_depth, deduplicating proofs
    IterativeDeepening,
}

impl FromStr for SearchStrategy {
    type Err = SyllogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "depth-first" => Ok(SearchStrategy::DepthFirst),
            "breadth-first" => Ok(SearchStrategy::BreadthFirst),
            "iterative-deepening" => Ok(SearchStrategy::IterativeDeepening),
            other => Err(SyllogError::Validation(format!(
                "unknown strategy '{other}'"
            ))),
        }
    }
}

/// Tie-break chain for ordering novel activations in a forward round.
///
/// Every chain is a total order (final keys are rule insertion index and
/// activation sequence), so forward runs are reproducible on identical
/// inputs; `Random` shuffles priority ties with a seeded generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    /// Higher rule priority first
    Priority,
    /// Activations supported by more recently asserted facts first
    Recency,
    /// Rules with more antecedent patterns first
    Specificity,
    /// Uniform random over priority ties, seeded by `random_seed`
    Random,
    /// Recency, then specificity
    Mrs,
    /// Specificity, then recency
    Mevis,
}

impl FromStr for ConflictResolution {
    type Err = SyllogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "priority" => Ok(ConflictResolution::Priority),
            "recency" => Ok(ConflictResolution::Recency),
            "specificity" => Ok(ConflictResolution::Specificity),
            "random" => Ok(ConflictResolution::Random),
            "mrs" => Ok(ConflictResolution::Mrs),
            "mevis" => Ok(ConflictResolution::Mevis),
            other => Err(SyllogError::Validation(format!(
                "unknown conflict resolution '{other}'"
            ))),
        }
    }
}

/// Configuration for an engine instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Backward search order
    pub strategy: SearchStrategy,
    /// Backward recursion cap
    pub max_depth: usize,
    /// Forward round cap
    pub max_steps: usize,
    /// Forward tie-breaker
    pub conflict_resolution: ConflictResolution,
    /// Seed for the `Random` conflict chain
    pub random_seed: u64,
    /// Record diagnostic events in the engine trace buffer
    pub trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strategy: SearchStrategy::DepthFirst,
            max_depth: 10,
            max_steps: 1000,
            conflict_resolution: ConflictResolution::Priority,
            random_seed: 0,
            trace: false,
        }
    }
}

impl EngineConfig {
    /// Set a configuration option from its string key and value.
    ///
    /// Unknown keys and unparseable values are `Validation` errors.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "strategy" => self.strategy = value.parse()?,
            "max-depth" => self.max_depth = parse_number(key, value)?,
            "max-steps" => self.max_steps = parse_number(key, value)?,
            "conflict-resolution" => self.conflict_resolution = value.parse()?,
            "random-seed" => self.random_seed = parse_number(key, value)?,
            "trace" => {
                self.trace = match value {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(SyllogError::Validation(format!(
                            "expected true or false for 'trace', got '{other}'"
                        )))
                    }
                }
            }
            other => {
                return Err(SyllogError::Validation(format!(
                    "unknown config key '{other}'"
                )))
            }
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        SyllogError::Validation(format!("expected a non-negative integer for '{key}', got '{value}'"))
    })
}
