//! syllog: a symbolic inference engine over a fact base.
//!
//! The engine stores ground compound facts in an indexed base, matches
//! rule antecedents against them with one-sided pattern matching, and
//! derives new facts by forward chaining to a fixed point. Goal-driven
//! queries run backward through facts and rule consequents with full
//! unification, producing proof trees.
//!
//! ```
//! use syllog::Engine;
//!
//! let mut engine = Engine::new();
//! engine.assert_str("[:parent :alice :bob]").unwrap();
//! engine.assert_str("[:parent :bob :carol]").unwrap();
//! engine
//!     .add_rule_str("{when [[:parent ?x ?y]], then [[:ancestor ?x ?y]], name base}")
//!     .unwrap();
//! engine
//!     .add_rule_str(
//!         "{when [[:ancestor ?x ?y] [:parent ?y ?z]], then [[:ancestor ?x ?z]], name step}",
//!     )
//!     .unwrap();
//!
//! engine.run_forward().unwrap();
//! let derived = engine.parse_term("[:ancestor :alice :carol]").unwrap();
//! assert!(engine.contains(&derived));
//! ```

pub mod base;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod infer;
pub mod json;
pub mod parser;
pub mod trace;
pub mod unify;

pub use base::{FactBase, Rule};
pub use config::{ConflictResolution, EngineConfig, SearchStrategy};
pub use core::{Atom, Interner, Substitution, SymbolId, Term, VarNameId, Variable};
pub use engine::{Engine, Stats};
pub use error::{Result, SyllogError};
pub use infer::{Explanation, ForwardOutcome, Proof, ProveOptions};
pub use json::{ProofJson, RuleJson, TermJson};
pub use parser::{parse_fact, parse_rule, parse_term};
pub use trace::TraceEvent;
pub use unify::{bind, match_all, match_term, unify, unify_all, UnifyFailure, UnifyResult};
