//! JSON representations with resolved names.
//!
//! Core types serialize with raw interned ids; these mirrors resolve ids
//! through the interner for persisted forms, trace export, and logs.

use crate::base::Rule;
use crate::core::{Atom, Interner, Substitution, Term};
use crate::error::{Result, SyllogError};
use crate::infer::backward::Proof;
use serde::{Deserialize, Serialize};

/// JSON representation of a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TermJson {
    Symbol { name: String },
    Int { value: i64 },
    Float { value: f64 },
    Str { value: String },
    Bool { value: bool },
    Null,
    Variable { name: String, scope: u32 },
    Wildcard,
    Compound { items: Vec<TermJson> },
}

impl TermJson {
    pub fn from_term(term: &Term, interner: &Interner) -> Self {
        match term {
            Term::Atom(Atom::Symbol(id)) => TermJson::Symbol {
                name: interner.resolve_symbol(*id).to_string(),
            },
            Term::Atom(Atom::Int(n)) => TermJson::Int { value: *n },
            Term::Atom(Atom::Float(x)) => TermJson::Float { value: x.into_inner() },
            Term::Atom(Atom::Str(s)) => TermJson::Str { value: s.clone() },
            Term::Atom(Atom::Bool(b)) => TermJson::Bool { value: *b },
            Term::Atom(Atom::Null) => TermJson::Null,
            Term::Variable(v) => TermJson::Variable {
                name: interner.resolve_variable(v.name).to_string(),
                scope: v.scope,
            },
            Term::Wildcard => TermJson::Wildcard,
            Term::Compound(items) => TermJson::Compound {
                items: items
                    .iter()
                    .map(|item| TermJson::from_term(item, interner))
                    .collect(),
            },
        }
    }

    /// Rebuild a term, interning names as needed.
    ///
    /// Variables with a non-zero scope only arise inside exported proofs;
    /// round-tripping them back into source-level terms is rejected.
    pub fn to_term(&self, interner: &mut Interner) -> Result<Term> {
        match self {
            TermJson::Symbol { name } => Ok(Term::symbol(interner.intern_symbol(name))),
            TermJson::Int { value } => Ok(Term::int(*value)),
            TermJson::Float { value } => Ok(Term::float(*value)),
            TermJson::Str { value } => Ok(Term::string(value.clone())),
            TermJson::Bool { value } => Ok(Term::bool(*value)),
            TermJson::Null => Ok(Term::null()),
            TermJson::Variable { name, scope } => {
                if *scope != 0 {
                    return Err(SyllogError::Validation(format!(
                        "variable ?{name} carries internal scope {scope}"
                    )));
                }
                Ok(Term::variable(interner.intern_variable(name)))
            }
            TermJson::Wildcard => Ok(Term::Wildcard),
            TermJson::Compound { items } => Ok(Term::Compound(
                items
                    .iter()
                    .map(|item| item.to_term(interner))
                    .collect::<Result<_>>()?,
            )),
        }
    }
}

/// JSON representation of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub when: Vec<TermJson>,
    pub then: Vec<TermJson>,
}

impl RuleJson {
    pub fn from_rule(rule: &Rule, interner: &Interner) -> Self {
        RuleJson {
            name: rule.name.clone(),
            priority: rule.priority,
            when: rule
                .when
                .iter()
                .map(|p| TermJson::from_term(p, interner))
                .collect(),
            then: rule
                .then
                .iter()
                .map(|p| TermJson::from_term(p, interner))
                .collect(),
        }
    }

    pub fn to_rule(&self, interner: &mut Interner) -> Result<Rule> {
        let mut rule = Rule::new(
            self.when
                .iter()
                .map(|p| p.to_term(interner))
                .collect::<Result<_>>()?,
            self.then
                .iter()
                .map(|p| p.to_term(interner))
                .collect::<Result<_>>()?,
        );
        rule.name = self.name.clone();
        rule.priority = self.priority;
        rule.validate()?;
        Ok(rule)
    }
}

/// One resolved binding in a proof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingJson {
    pub var: String,
    pub term: TermJson,
}

fn bindings_json(subst: &Substitution, interner: &Interner) -> Vec<BindingJson> {
    subst
        .canonical()
        .iter()
        .map(|(var, term)| BindingJson {
            var: {
                let name = interner.resolve_variable(var.name);
                if var.scope == 0 {
                    name.to_string()
                } else {
                    format!("{}_{}", name, var.scope)
                }
            },
            term: TermJson::from_term(term, interner),
        })
        .collect()
}

/// JSON representation of a proof tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofJson {
    Fact {
        goal: TermJson,
        bindings: Vec<BindingJson>,
        node: TermJson,
    },
    Rule {
        goal: TermJson,
        bindings: Vec<BindingJson>,
        node: RuleJson,
        children: Vec<ProofJson>,
    },
}

impl ProofJson {
    pub fn from_proof(proof: &Proof, interner: &Interner) -> Self {
        match proof {
            Proof::Fact {
                goal,
                bindings,
                fact,
            } => ProofJson::Fact {
                goal: TermJson::from_term(goal, interner),
                bindings: bindings_json(bindings, interner),
                node: TermJson::from_term(fact, interner),
            },
            Proof::Rule {
                goal,
                bindings,
                rule,
                children,
            } => ProofJson::Rule {
                goal: TermJson::from_term(goal, interner),
                bindings: bindings_json(bindings, interner),
                node: RuleJson::from_rule(rule, interner),
                children: children
                    .iter()
                    .map(|child| ProofJson::from_proof(child, interner))
                    .collect(),
            },
        }
    }
}
