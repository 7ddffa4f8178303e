//! Statement grammars: which sections exist and how they connect.
//!
//! A grammar is built once per document session and consumed by the run
//! loop. Grammars are registered by institution name so that further
//! institutions can be added next to the built-in one.
//!
//! # Example
//!
//! ```
//! use stmtledger::grammar::{GrammarRegistry, BecuGrammar};
//! use std::sync::Arc;
//!
//! let mut registry = GrammarRegistry::new();
//! registry.register(Arc::new(BecuGrammar::default()));
//!
//! let grammar = registry.build("becu").unwrap();
//! assert_eq!(grammar.section(grammar.initial).tag, "initial");
//! ```

mod becu;
mod builder;

pub use becu::{BecuGrammar, BecuPatterns};
pub use builder::GrammarBuilder;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::{Section, SectionGraph, SectionId, SectionTree};

/// Sections, tree and graph of one statement layout, ready to run.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// Grammar name
    pub name: String,
    /// Section arena, indexed by [`SectionId`]
    pub sections: Vec<Section>,
    /// Document structure
    pub tree: SectionTree,
    /// Guarded transitions
    pub graph: SectionGraph,
    /// State the run loop starts in
    pub initial: SectionId,
    /// State that ends the run loop
    pub terminal: SectionId,
    /// Page-boundary state, if the layout has one
    pub page_boundary: Option<SectionId>,
}

impl Grammar {
    /// Get a section by id.
    ///
    /// Ids handed out by the builder are always valid for the grammar they
    /// came from.
    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.index()]
    }

    /// Look a section up by tag.
    pub fn find(&self, tag: &str) -> Option<&Section> {
        self.tree.find(tag).map(|id| self.section(id))
    }
}

/// Trait for statement layouts.
///
/// Implement this trait to teach the walker a new institution's layout.
pub trait StatementGrammar: Send + Sync {
    /// Registry name (lowercase).
    fn name(&self) -> &str;

    /// Build a fresh grammar for one document session.
    fn build(&self) -> Result<Grammar>;
}

/// Registry of statement grammars by name.
pub struct GrammarRegistry {
    grammars: HashMap<String, Arc<dyn StatementGrammar>>,
}

impl GrammarRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            grammars: HashMap::new(),
        }
    }

    /// Create a registry with the built-in grammars.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(BecuGrammar::default()));
        registry
    }

    /// Register a grammar under its name, replacing any previous one.
    pub fn register(&mut self, grammar: Arc<dyn StatementGrammar>) {
        self.grammars.insert(grammar.name().to_lowercase(), grammar);
    }

    /// Get a grammar by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn StatementGrammar>> {
        self.grammars.get(&name.to_lowercase()).cloned()
    }

    /// Check if a grammar is registered.
    pub fn supports(&self, name: &str) -> bool {
        self.grammars.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the grammar registered under `name`.
    pub fn build(&self, name: &str) -> Result<Grammar> {
        self.get(name)
            .ok_or_else(|| Error::UnknownGrammar(name.to_string()))?
            .build()
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = GrammarRegistry::with_defaults();
        assert!(registry.supports("becu"));
        assert!(registry.supports("BECU"));
        assert!(!registry.supports("chase"));
        assert_eq!(registry.names(), vec!["becu"]);
    }

    #[test]
    fn test_registry_unknown() {
        let registry = GrammarRegistry::new();
        assert!(matches!(
            registry.build("becu"),
            Err(Error::UnknownGrammar(name)) if name == "becu"
        ));
    }

    #[test]
    fn test_grammar_find() {
        let grammar = GrammarRegistry::with_defaults().build("becu").unwrap();
        let boundary = grammar.find("page_boundary").unwrap();
        assert_eq!(Some(boundary.id), grammar.page_boundary);
        assert!(grammar.find("missing").is_none());
    }
}
