//! The mutable knowledge layer: fact base and rules.

pub mod facts;
pub mod rule;

pub use facts::FactBase;
pub use rule::Rule;
