//! Type registry: name -> declaration table built during the load phase

use super::parser::SchemaParser;
use super::types::EntityDecl;
use super::validation::Diagnostics;
use crate::entity::types::{SchemaError, SchemaResult};
use std::collections::HashMap;
use tracing::debug;

/// Append-only registry used while schema documents are loaded
///
/// Registration order is the first-seen order used to break ties in the
/// emission order. Call [`TypeRegistry::freeze`] once loading is done.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    entries: Vec<EntityDecl>,
    index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a batch of `(document name, content)` pairs
    ///
    /// Every syntax and duplicate error is collected before failing.
    pub fn load<I, D, C>(parser: &SchemaParser, documents: I) -> Result<Self, Diagnostics>
    where
        I: IntoIterator<Item = (D, C)>,
        D: AsRef<str>,
        C: AsRef<str>,
    {
        let mut registry = Self::new();
        let mut errors = Vec::new();

        for (document, content) in documents {
            let result = parser
                .parse_document(document.as_ref(), content.as_ref())
                .and_then(|decl| registry.register(decl));
            if let Err(e) = result {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(Diagnostics::new(errors))
        }
    }

    /// Add a declaration; names must be unique across the registry
    pub fn register(&mut self, decl: EntityDecl) -> SchemaResult<()> {
        if self.index.contains_key(&decl.name) {
            return Err(SchemaError::duplicate_entity(&decl.name));
        }

        debug!("Registering declaration: {}", decl.name);
        self.index.insert(decl.name.clone(), self.entries.len());
        self.entries.push(decl);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&EntityDecl> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End the load phase and produce the read-only snapshot the resolver consumes
    pub fn freeze(self) -> FrozenRegistry {
        FrozenRegistry {
            entries: self.entries,
            index: self.index,
        }
    }
}

/// Immutable registry snapshot
#[derive(Debug, Clone)]
pub struct FrozenRegistry {
    entries: Vec<EntityDecl>,
    index: HashMap<String, usize>,
}

impl FrozenRegistry {
    pub fn lookup(&self, name: &str) -> Option<&EntityDecl> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// First-seen position of a declaration
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declarations in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &EntityDecl> {
        self.entries.iter()
    }

    pub fn get(&self, position: usize) -> Option<&EntityDecl> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
