//! # Symbol Table
//!
//! Registry of every name seen in an asserted clause, with optional
//! component aliases.

use crate::pattern::Token;
use std::collections::BTreeMap;

/// Resolves names to their registered components.
///
/// The knowledge map calls `add(name, None)` for the name field of every
/// asserted clause.
pub trait SymbolExpander {
    /// Register `name`, optionally with an ordered set of component aliases.
    fn add(&mut self, name: &str, components: Option<Vec<String>>);

    /// Components registered for `name` that match `filter`.
    fn get(&self, name: &str, filter: &Token) -> Vec<String>;
}

/// Default `SymbolExpander`.
///
/// Components keep their first-registration order and are deduplicated.
/// Registering a name without components never clears existing ones.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Vec<String>>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.keys().map(String::as_str)
    }
}

impl SymbolExpander for SymbolTable {
    fn add(&mut self, name: &str, components: Option<Vec<String>>) {
        let known = self.symbols.entry(name.to_string()).or_default();
        for component in components.into_iter().flatten() {
            if !known.contains(&component) {
                known.push(component);
            }
        }
    }

    fn get(&self, name: &str, filter: &Token) -> Vec<String> {
        self.symbols
            .get(name)
            .map(|components| {
                components
                    .iter()
                    .filter(|c| filter.matches(c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
