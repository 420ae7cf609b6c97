//! Structured diagnostics and non-fatal schema lints

use super::model::Model;
use crate::entity::types::{ErrorKind, SchemaError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifiers reserved in at least one target language
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "async", "await", "auto", "bool", "boolean", "break", "byte", "case",
    "catch", "char", "class", "const", "continue", "crate", "default", "delete", "do", "double",
    "dyn", "else", "enum", "event", "explicit", "extends", "extern", "false", "final", "float",
    "fn", "for", "friend", "goto", "if", "impl", "implements", "import", "in", "int", "interface",
    "let", "long", "loop", "match", "mod", "move", "mut", "namespace", "new", "null", "object",
    "operator", "override", "package", "private", "protected", "pub", "public", "ref", "return",
    "self", "short", "signed", "sizeof", "static", "string", "struct", "super", "switch",
    "template", "this", "throw", "trait", "true", "try", "type", "typedef", "typename", "union",
    "unsafe", "unsigned", "use", "using", "virtual", "void", "volatile", "where", "while",
];

/// Check whether a name is reserved in C++, C#, Java or Rust
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Presentation-neutral view of one error, for CLIs and tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl From<&SchemaError> for Diagnostic {
    fn from(error: &SchemaError) -> Self {
        Self {
            kind: error.kind(),
            entity: error.entity().map(str::to_string),
            field: error.field().map(str::to_string),
            message: error.to_string(),
        }
    }
}

/// Every error found during a load or resolution run
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Schema resolution failed with {} error(s)", .errors.len())]
pub struct Diagnostics {
    errors: Vec<SchemaError>,
}

impl Diagnostics {
    pub fn new(errors: Vec<SchemaError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[SchemaError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SchemaError> {
        self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check whether any error has the given kind
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &SchemaError> {
        self.errors.iter().filter(move |e| e.kind() == kind)
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(Diagnostic::from).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Style checks over a resolved model; findings never fail resolution
pub struct SchemaValidator {
    /// Validation warnings collected during the last run
    warnings: Vec<String>,
}

impl SchemaValidator {
    /// Create a new schema validator
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Lint every declaration of a resolved model
    pub fn lint(&mut self, model: &Model) -> Vec<String> {
        self.warnings.clear();

        for entity in model.iter() {
            if !entity.name.starts_with(|c: char| c.is_ascii_uppercase()) {
                self.warnings.push(format!(
                    "Entity name '{}' should start with an uppercase letter",
                    entity.name
                ));
            }

            // Inherited fields are linted on the declaring entity
            for field in entity.own_fields() {
                if field.name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    self.warnings.push(format!(
                        "Field name '{}' in entity '{}' should start with a lowercase letter",
                        field.name, entity.name
                    ));
                }

                if is_reserved_word(&field.name) {
                    self.warnings.push(format!(
                        "Field name '{}' in entity '{}' is a reserved word in a target language and will be escaped",
                        field.name, entity.name
                    ));
                }
            }
        }

        self.warnings.clone()
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::schema::parser::SchemaParser;
    use crate::entity::schema::registry::TypeRegistry;
    use crate::entity::schema::resolver::{ResolverOptions, TypeResolver};

    fn resolve(documents: &[(&str, &str)]) -> Model {
        let registry = TypeRegistry::load(&SchemaParser::new(), documents.iter().copied()).unwrap();
        TypeResolver::new(ResolverOptions::default())
            .resolve(&registry.freeze())
            .unwrap()
    }

    #[test]
    fn test_diagnostic_from_error() {
        let error = SchemaError::default_mismatch(
            "Animal",
            "happy",
            "boolean",
            crate::entity::types::LiteralKind::String,
        );
        let diagnostic = Diagnostic::from(&error);

        assert_eq!(diagnostic.kind, ErrorKind::DefaultTypeMismatchError);
        assert_eq!(diagnostic.entity.as_deref(), Some("Animal"));
        assert_eq!(diagnostic.field.as_deref(), Some("happy"));

        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "DefaultTypeMismatchError");
    }

    #[test]
    fn test_diagnostics_queries() {
        let diagnostics = Diagnostics::new(vec![
            SchemaError::duplicate_entity("Hat"),
            SchemaError::unresolved("Animal", Some("hat"), "Cap"),
        ]);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_kind(ErrorKind::DuplicateEntityError));
        assert!(!diagnostics.has_kind(ErrorKind::ValueCycleError));
        assert_eq!(diagnostics.of_kind(ErrorKind::UnresolvedReferenceError).count(), 1);
        assert_eq!(
            diagnostics.to_string(),
            "Schema resolution failed with 2 error(s)"
        );
    }

    #[test]
    fn test_lint_naming() {
        let model = resolve(&[
            ("hat.json", r#"{ "name": "hat", "fields": [{ "name": "Size", "type": "u32" }] }"#),
            ("Node.json", r#"{ "name": "Node", "fields": [{ "name": "self", "type": "collection<Node>" }] }"#),
        ]);

        let warnings = SchemaValidator::new().lint(&model);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("'hat' should start with an uppercase")));
        assert!(warnings.iter().any(|w| w.contains("'Size'")));
        assert!(warnings.iter().any(|w| w.contains("'self'") && w.contains("reserved")));
    }

    #[test]
    fn test_lint_clean_model() {
        let model = resolve(&[(
            "Hat.json",
            r#"{ "name": "Hat", "fields": [{ "name": "size", "type": "u32" }] }"#,
        )]);

        assert!(SchemaValidator::new().lint(&model).is_empty());
    }
}
