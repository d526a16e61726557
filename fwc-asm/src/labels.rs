//! Synthesized label names (§4.5: "All synthesized names use the template
//! `@<kind>_<blockNumber>_<suffix>`"). Names are interned into a string
//! table and referenced everywhere else by `SymbolId`, matching how every
//! other symbol in the object model is addressed.

use std::collections::HashMap;

use fwc_types::SymbolId;

/// Interning table for synthesized control-flow labels.
#[derive(Debug)]
pub struct LabelTable {
    names: Vec<String>,
    by_name: HashMap<String, SymbolId>,
    next_id: SymbolId,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTable {
    /// Symbol id `0` is reserved ("no symbol") across the object model, so
    /// allocation starts at 1 — the first synthesized label must never
    /// collide with that sentinel.
    pub fn new() -> Self {
        Self {
            names: vec![String::new()],
            by_name: HashMap::new(),
            next_id: 1,
        }
    }

    fn intern(&mut self, name: String) -> SymbolId {
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        id
    }

    /// Synthesizes (or returns the existing id for) `@<kind>_<number>_<suffix>`.
    pub fn synthesize(&mut self, kind: &str, number: u32, suffix: &str) -> SymbolId {
        self.intern(format!("@{kind}_{number}_{suffix}"))
    }

    pub fn name_of(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }
}
