//! Core vocabulary shared by the parser, the resolver and every target mapper

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Primitive field kinds understood by every target language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    String,
    /// integer-unsigned-32
    U32,
    /// integer-signed-32
    I32,
    F32,
    F64,
    Boolean,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::String,
        PrimitiveKind::U32,
        PrimitiveKind::I32,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Boolean,
    ];

    /// Look up a primitive by its schema spelling (canonical name or alias)
    pub fn from_schema_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PrimitiveKind::String),
            "integer-unsigned-32" | "u32" | "uint32" | "integer" => Some(PrimitiveKind::U32),
            "integer-signed-32" | "i32" | "int32" => Some(PrimitiveKind::I32),
            "float32" | "f32" | "float" => Some(PrimitiveKind::F32),
            "float64" | "f64" | "double" => Some(PrimitiveKind::F64),
            "boolean" | "bool" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }

    /// Canonical schema spelling
    pub fn schema_name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::U32 => "integer-unsigned-32",
            PrimitiveKind::I32 => "integer-signed-32",
            PrimitiveKind::F32 => "float32",
            PrimitiveKind::F64 => "float64",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    /// Check whether a default literal can be stored in a field of this kind
    pub fn accepts(&self, literal: &Literal) -> bool {
        match (self, literal) {
            (PrimitiveKind::String, Literal::String(_)) => true,
            (PrimitiveKind::Boolean, Literal::Boolean(_)) => true,
            (PrimitiveKind::U32, Literal::Integer(i)) => u32::try_from(*i).is_ok(),
            (PrimitiveKind::I32, Literal::Integer(i)) => i32::try_from(*i).is_ok(),
            (PrimitiveKind::F32 | PrimitiveKind::F64, Literal::Integer(_) | Literal::Float(_)) => {
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.schema_name())
    }
}

/// Default value attached to a field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Boolean(_) => LiteralKind::Boolean,
            Literal::Integer(_) => LiteralKind::Integer,
            Literal::Float(_) => LiteralKind::Float,
            Literal::String(_) => LiteralKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Float(f)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// Kind tag of a literal, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralKind::String => "string",
            LiteralKind::Integer => "integer",
            LiteralKind::Float => "float",
            LiteralKind::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// Error taxonomy reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    SchemaSyntaxError,
    DuplicateEntityError,
    UnresolvedReferenceError,
    InheritanceCycleError,
    FieldShadowError,
    ValueCycleError,
    DefaultTypeMismatchError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single schema problem found while loading or resolving
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The document could not be turned into a declaration
    #[error("Syntax error in schema document '{document}'{}: {message}", field_suffix(.field))]
    Syntax {
        document: String,
        field: Option<String>,
        message: String,
    },

    /// Two documents declare the same name
    #[error("Entity '{name}' is declared more than once")]
    DuplicateEntity { name: String },

    /// A field type or base link names something that is not registered
    #[error("Entity '{entity}'{} references unknown entity '{referenced}'{}", field_suffix(.field), reason_suffix(.reason))]
    UnresolvedReference {
        entity: String,
        field: Option<String>,
        referenced: String,
        reason: Option<String>,
    },

    /// Following base links revisits an entity
    #[error("Inheritance cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    /// A derived entity redeclares an inherited field
    #[error("Field '{field}' of entity '{entity}' shadows the field inherited from '{declared_in}'")]
    FieldShadow {
        entity: String,
        field: String,
        declared_in: String,
    },

    /// Entities embed each other by value
    #[error("Value cycle through field '{field}' of entity '{entity}': {}", .cycle.join(" -> "))]
    ValueCycle {
        entity: String,
        field: String,
        cycle: Vec<String>,
    },

    /// A default literal does not fit its field type
    #[error("Default of field '{field}' in entity '{entity}' is a {literal} literal, expected {expected}")]
    DefaultTypeMismatch {
        entity: String,
        field: String,
        expected: String,
        literal: LiteralKind,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|f| format!(", field '{}'", f))
        .unwrap_or_default()
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default()
}

impl SchemaError {
    /// Create a Syntax error
    pub fn syntax<D: AsRef<str>, M: AsRef<str>>(document: D, field: Option<&str>, message: M) -> Self {
        Self::Syntax {
            document: document.as_ref().to_string(),
            field: field.map(str::to_string),
            message: message.as_ref().to_string(),
        }
    }

    /// Create a DuplicateEntity error
    pub fn duplicate_entity<N: AsRef<str>>(name: N) -> Self {
        Self::DuplicateEntity {
            name: name.as_ref().to_string(),
        }
    }

    /// Create an UnresolvedReference error
    pub fn unresolved<E: AsRef<str>, R: AsRef<str>>(entity: E, field: Option<&str>, referenced: R) -> Self {
        Self::UnresolvedReference {
            entity: entity.as_ref().to_string(),
            field: field.map(str::to_string),
            referenced: referenced.as_ref().to_string(),
            reason: None,
        }
    }

    /// Attach a reason to an UnresolvedReference error
    pub fn with_reason<R: AsRef<str>>(mut self, why: R) -> Self {
        if let Self::UnresolvedReference { reason, .. } = &mut self {
            *reason = Some(why.as_ref().to_string());
        }
        self
    }

    /// Create a DefaultTypeMismatch error
    pub fn default_mismatch<E: AsRef<str>, F: AsRef<str>, X: AsRef<str>>(
        entity: E,
        field: F,
        expected: X,
        literal: LiteralKind,
    ) -> Self {
        Self::DefaultTypeMismatch {
            entity: entity.as_ref().to_string(),
            field: field.as_ref().to_string(),
            expected: expected.as_ref().to_string(),
            literal,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::SchemaSyntaxError,
            Self::DuplicateEntity { .. } => ErrorKind::DuplicateEntityError,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReferenceError,
            Self::InheritanceCycle { .. } => ErrorKind::InheritanceCycleError,
            Self::FieldShadow { .. } => ErrorKind::FieldShadowError,
            Self::ValueCycle { .. } => ErrorKind::ValueCycleError,
            Self::DefaultTypeMismatch { .. } => ErrorKind::DefaultTypeMismatchError,
        }
    }

    /// Entity the error is attached to, if any
    ///
    /// Syntax errors report the document name since the entity name may be
    /// what failed to parse. Inheritance cycles report the first chain member.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::Syntax { document, .. } => Some(document),
            Self::DuplicateEntity { name } => Some(name),
            Self::UnresolvedReference { entity, .. }
            | Self::FieldShadow { entity, .. }
            | Self::ValueCycle { entity, .. }
            | Self::DefaultTypeMismatch { entity, .. } => Some(entity),
            Self::InheritanceCycle { chain } => chain.first().map(String::as_str),
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Syntax { field, .. } | Self::UnresolvedReference { field, .. } => field.as_deref(),
            Self::FieldShadow { field, .. }
            | Self::ValueCycle { field, .. }
            | Self::DefaultTypeMismatch { field, .. } => Some(field),
            Self::DuplicateEntity { .. } | Self::InheritanceCycle { .. } => None,
        }
    }
}

/// Result type for single-error operations such as parsing one document
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_aliases() {
        assert_eq!(PrimitiveKind::from_schema_name("integer"), Some(PrimitiveKind::U32));
        assert_eq!(PrimitiveKind::from_schema_name("uint32"), Some(PrimitiveKind::U32));
        assert_eq!(PrimitiveKind::from_schema_name("int32"), Some(PrimitiveKind::I32));
        assert_eq!(PrimitiveKind::from_schema_name("float"), Some(PrimitiveKind::F32));
        assert_eq!(PrimitiveKind::from_schema_name("double"), Some(PrimitiveKind::F64));
        assert_eq!(PrimitiveKind::from_schema_name("bool"), Some(PrimitiveKind::Boolean));
        assert_eq!(PrimitiveKind::from_schema_name("Hat"), None);

        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_schema_name(kind.schema_name()), Some(kind));
        }
    }

    #[test]
    fn test_literal_compatibility() {
        assert!(PrimitiveKind::String.accepts(&"John".into()));
        assert!(PrimitiveKind::Boolean.accepts(&true.into()));
        assert!(PrimitiveKind::U32.accepts(&Literal::Integer(4_000_000_000)));
        assert!(!PrimitiveKind::U32.accepts(&Literal::Integer(-1)));
        assert!(!PrimitiveKind::I32.accepts(&Literal::Integer(4_000_000_000)));
        assert!(PrimitiveKind::F32.accepts(&Literal::Integer(2)));
        assert!(PrimitiveKind::F64.accepts(&Literal::Float(1.5)));
        assert!(!PrimitiveKind::Boolean.accepts(&"true".into()));
        assert!(!PrimitiveKind::String.accepts(&Literal::Boolean(true)));
    }

    #[test]
    fn test_error_accessors() {
        let err = SchemaError::unresolved("Animal", Some("hat"), "Hat");
        assert_eq!(err.kind(), ErrorKind::UnresolvedReferenceError);
        assert_eq!(err.entity(), Some("Animal"));
        assert_eq!(err.field(), Some("hat"));
        assert_eq!(
            err.to_string(),
            "Entity 'Animal', field 'hat' references unknown entity 'Hat'"
        );

        let cycle = SchemaError::InheritanceCycle {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(cycle.entity(), Some("A"));
        assert_eq!(cycle.field(), None);
        assert_eq!(cycle.to_string(), "Inheritance cycle: A -> B -> A");
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::from("John").to_string(), "\"John\"");
        assert_eq!(Literal::Boolean(true).to_string(), "true");
        assert_eq!(Literal::Float(1.0).to_string(), "1.0");
    }
}
