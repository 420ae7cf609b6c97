//! Fully resolved model handed to emitters

use super::types::{DeclKind, FieldType};
use crate::entity::types::Literal;
use serde::{Deserialize, Serialize};

/// A field after inheritance has been flattened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    /// Entity whose document declares this field
    pub declared_in: String,
}

/// One declaration with its inheritance chain and full field layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub name: String,
    pub kind: DeclKind,
    /// Ancestor names, root first, immediate parent last
    pub ancestors: Vec<String>,
    /// Inherited fields followed by own fields, each in declared order
    pub fields: Vec<ResolvedField>,
    /// Position in the emission order
    pub rank: usize,
    /// Hard dependencies: the base and every by-value reference
    pub dependencies: Vec<String>,
    /// Every referenced declaration, including those behind collections
    pub references: Vec<String>,
    pub description: Option<String>,
    pub namespace: Option<String>,
    pub package: Option<String>,
    pub implements: Option<String>,
    pub subdir: Option<String>,
}

impl ResolvedEntity {
    /// Immediate base entity
    pub fn parent(&self) -> Option<&str> {
        self.ancestors.last().map(String::as_str)
    }

    /// Fields declared on this entity itself
    pub fn own_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(move |f| f.declared_in == self.name)
    }

    /// Fields declared on ancestors
    pub fn inherited_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(move |f| f.declared_in != self.name)
    }

    pub fn get_field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, DeclKind::Enum { .. })
    }

    pub fn enum_values(&self) -> &[String] {
        match &self.kind {
            DeclKind::Enum { values } => values,
            DeclKind::Class => &[],
        }
    }
}

/// Resolved entities in emission order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    entities: Vec<ResolvedEntity>,
}

impl Model {
    /// Build a model; entities are kept sorted by rank
    pub fn new(mut entities: Vec<ResolvedEntity>) -> Self {
        entities.sort_by_key(|e| e.rank);
        Self { entities }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Entities in emission order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEntity> {
        self.entities.iter()
    }

    pub fn emission_order(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check whether a referenced name is an enumeration
    pub fn is_enum(&self, name: &str) -> bool {
        self.get(name).is_some_and(ResolvedEntity::is_enum)
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = &'a ResolvedEntity;
    type IntoIter = std::slice::Iter<'a, ResolvedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
