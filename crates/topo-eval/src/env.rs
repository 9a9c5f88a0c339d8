//! Variable environment for the topo evaluator.

use std::collections::BTreeMap;

use topo_stdlib::Value;

/// Flat program scope: each name holds its most recent binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    bindings: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    /// Returns the value it shadowed, if any.
    pub fn define(&mut self, name: &str, value: Value) -> Option<Value> {
        self.bindings.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn into_bindings(self) -> BTreeMap<String, Value> {
        self.bindings
    }
}
