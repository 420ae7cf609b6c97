//! Declaration types produced by the schema parser

use crate::entity::types::{Literal, PrimitiveKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract field type, independent of any target language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Built-in scalar kind
    Primitive(PrimitiveKind),
    /// Reference to another declaration by name
    Reference(String),
    /// Ordered sequence of the inner type
    Collection(Box<FieldType>),
}

impl FieldType {
    pub fn collection(inner: FieldType) -> Self {
        FieldType::Collection(Box::new(inner))
    }

    pub fn reference<S: Into<String>>(name: S) -> Self {
        FieldType::Reference(name.into())
    }

    /// Get the element type with every collection layer removed
    pub fn base_type(&self) -> &FieldType {
        match self {
            FieldType::Collection(inner) => inner.base_type(),
            _ => self,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::Collection(_))
    }

    /// Referenced name after unwrapping collections
    pub fn referenced_name(&self) -> Option<&str> {
        match self.base_type() {
            FieldType::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Referenced name only when the reference is held by value
    pub fn direct_reference(&self) -> Option<&str> {
        match self {
            FieldType::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Number of collection layers around the element type
    pub fn depth(&self) -> usize {
        match self {
            FieldType::Collection(inner) => 1 + inner.depth(),
            _ => 0,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(kind) => write!(f, "{}", kind),
            FieldType::Reference(name) => write!(f, "{}", name),
            FieldType::Collection(inner) => write!(f, "collection<{}>", inner),
        }
    }
}

/// Field declared directly on an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
}

impl FieldDecl {
    pub fn new<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }

    pub fn with_default<L: Into<Literal>>(mut self, default: L) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Whether a declaration is a record with fields or an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Enum { values: Vec<String> },
}

/// One schema document after parsing, before any cross-entity checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    pub kind: DeclKind,
    /// Name of the single base entity, unresolved
    pub base: Option<String>,
    /// Fields declared on this entity only, in document order
    pub fields: Vec<FieldDecl>,
    pub description: Option<String>,
    /// C++ and C# namespace
    pub namespace: Option<String>,
    /// Java package, falls back to the namespace
    pub package: Option<String>,
    /// Java interface the class implements
    pub implements: Option<String>,
    /// Output subdirectory below the language's output directory
    pub subdir: Option<String>,
}

impl EntityDecl {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            kind: DeclKind::Class,
            base: None,
            fields: Vec::new(),
            description: None,
            namespace: None,
            package: None,
            implements: None,
            subdir: None,
        }
    }

    pub fn enumeration<S: Into<String>>(name: S, values: Vec<String>) -> Self {
        Self {
            kind: DeclKind::Enum { values },
            ..Self::new(name)
        }
    }

    pub fn extends<S: Into<String>>(mut self, base: S) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, DeclKind::Enum { .. })
    }

    /// Enumerator names, empty for classes
    pub fn enum_values(&self) -> &[String] {
        match &self.kind {
            DeclKind::Enum { values } => values,
            DeclKind::Class => &[],
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_unwrapping() {
        let nested = FieldType::collection(FieldType::collection(FieldType::reference("Entity")));
        assert_eq!(nested.referenced_name(), Some("Entity"));
        assert_eq!(nested.direct_reference(), None);
        assert_eq!(nested.depth(), 2);
        assert_eq!(nested.to_string(), "collection<collection<Entity>>");

        let direct = FieldType::reference("Hat");
        assert_eq!(direct.direct_reference(), Some("Hat"));
        assert!(!direct.is_collection());
    }

    #[test]
    fn test_builder_helpers() {
        let decl = EntityDecl::new("Animal")
            .extends("Entity")
            .field(FieldDecl::new("owner", FieldType::Primitive(PrimitiveKind::String)).with_default("John"));

        assert_eq!(decl.base.as_deref(), Some("Entity"));
        assert_eq!(decl.get_field("owner").and_then(|f| f.default.clone()), Some(Literal::from("John")));
        assert!(decl.enum_values().is_empty());

        let color = EntityDecl::enumeration("Color", vec!["Red".into(), "Blue".into()]);
        assert!(color.is_enum());
        assert_eq!(color.enum_values().len(), 2);
    }
}
