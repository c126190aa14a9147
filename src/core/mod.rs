//! Core value model: interned symbols, terms, and substitutions.

pub mod interner;
pub mod subst;
pub mod term;

pub use interner::{Interner, SymbolId, VarNameId};
pub use subst::Substitution;
pub use term::{Atom, Term, TermDisplay, Variable};
