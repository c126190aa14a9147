//! Two-sided unification and one-sided pattern matching.

pub mod matching;
pub mod mgu;

#[cfg(test)]
mod proptest_tests;

pub use matching::{bind, match_all, match_term};
pub use mgu::{unify, unify_all, UnifyFailure, UnifyResult};
