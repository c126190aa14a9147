//! Symbol interning for efficient comparison and storage
//!
//! Symbol atoms and variable names are replaced by `u32` ids drawn from two
//! separate arenas. Ids are `Copy`, compare and hash in O(1), and resolve
//! back to their string through the interner. The interner is owned by the
//! engine and passed through context rather than held in process-global
//! state, so concurrent reads after construction need no synchronization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Id for an interned symbol atom
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

/// Id for an interned variable name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarNameId(pub(crate) u32);

impl SymbolId {
    /// Raw id value (for debugging and serialization)
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl VarNameId {
    /// Raw id value (for debugging and serialization)
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Internal string arena for a single namespace
#[derive(Debug, Clone, Default)]
struct StringArena {
    /// Interned strings, indexed by id
    strings: Vec<String>,
    /// Lookup table from string to id
    lookup: HashMap<String, u32>,
}

impl StringArena {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    fn resolve(&self, id: u32) -> &str {
        &self.strings[id as usize]
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    fn len(&self) -> usize {
        self.strings.len()
    }
}

/// Interner for symbol atoms and variable names
#[derive(Debug, Clone, Default)]
pub struct Interner {
    symbols: StringArena,
    variables: StringArena,
}

impl Interner {
    /// Create a new empty interner
    pub fn new() -> Self {
        Interner::default()
    }

    /// Intern a symbol name, returning its id (get-or-create)
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        SymbolId(self.symbols.intern(name))
    }

    /// Resolve a symbol id to its name
    pub fn resolve_symbol(&self, id: SymbolId) -> &str {
        self.symbols.resolve(id.0)
    }

    /// Id of an already-interned symbol, if present
    pub fn get_symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).map(SymbolId)
    }

    /// Number of interned symbols
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Intern a variable name, returning its id (get-or-create)
    pub fn intern_variable(&mut self, name: &str) -> VarNameId {
        VarNameId(self.variables.intern(name))
    }

    /// Resolve a variable name id to its name
    pub fn resolve_variable(&self, id: VarNameId) -> &str {
        self.variables.resolve(id.0)
    }

    /// Id of an already-interned variable name, if present
    pub fn get_variable(&self, name: &str) -> Option<VarNameId> {
        self.variables.get(name).map(VarNameId)
    }

    /// Number of interned variable names
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

// Display shows raw ids; name resolution goes through display wrappers
// that carry the interner.

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for VarNameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

// Ids serialize as bare u32; string resolution happens in json.rs.

impl Serialize for SymbolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        u32::deserialize(deserializer).map(SymbolId)
    }
}

impl Serialize for VarNameId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VarNameId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        u32::deserialize(deserializer).map(VarNameId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_interning() {
        let mut interner = Interner::new();

        let a1 = interner.intern_symbol("alice");
        let a2 = interner.intern_symbol("alice");
        let b = interner.intern_symbol("bob");

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(interner.resolve_symbol(a1), "alice");
        assert_eq!(interner.symbol_count(), 2);
    }

    #[test]
    fn test_separate_namespaces() {
        let mut interner = Interner::new();

        let s = interner.intern_symbol("x");
        let v = interner.intern_variable("x");

        assert_eq!(interner.resolve_symbol(s), "x");
        assert_eq!(interner.resolve_variable(v), "x");
        assert_eq!(interner.symbol_count(), 1);
        assert_eq!(interner.variable_count(), 1);
    }

    #[test]
    fn test_get_without_interning() {
        let mut interner = Interner::new();
        assert!(interner.get_symbol("likes").is_none());
        let id = interner.intern_symbol("likes");
        assert_eq!(interner.get_symbol("likes"), Some(id));
    }

    #[test]
    fn test_ids_are_ordered_by_insertion() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("x");
        let y = interner.intern_variable("y");
        assert!(x < y);
    }
}
