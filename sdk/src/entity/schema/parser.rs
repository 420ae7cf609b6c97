//! JSON schema document parser for entity declarations

use super::types::{DeclKind, EntityDecl, FieldDecl, FieldType};
use crate::entity::types::{Literal, PrimitiveKind, SchemaError, SchemaResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path};

const COLLECTION_PREFIXES: [&str; 2] = ["collection<", "list<"];

/// Raw document layout
///
/// Documents written for the original generator use `parent`, `members`,
/// `comment` and `package`, and spell their defaults as source text.
#[derive(Debug, Deserialize)]
struct RawDocument {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    base: Option<String>,
    parent: Option<String>,
    fields: Option<Vec<RawField>>,
    members: Option<Vec<RawField>>,
    values: Option<Vec<String>>,
    #[serde(alias = "comment")]
    description: Option<String>,
    namespace: Option<String>,
    package: Option<String>,
    implements: Option<String>,
    subdir: Option<String>,
}

impl RawDocument {
    /// `members` marks the original layout
    fn defaults_are_source_text(&self) -> bool {
        self.members.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    type_expr: Option<String>,
    default: Option<Value>,
}

/// Parser for single-entity schema documents
pub struct SchemaParser {
    /// Primitive spellings accepted in type expressions
    primitives: HashMap<String, PrimitiveKind>,
}

impl SchemaParser {
    /// Create a new schema parser
    pub fn new() -> Self {
        let mut primitives = HashMap::new();

        for alias in [
            "string",
            "integer-unsigned-32",
            "u32",
            "uint32",
            "integer",
            "integer-signed-32",
            "i32",
            "int32",
            "float32",
            "f32",
            "float",
            "float64",
            "f64",
            "double",
            "boolean",
            "bool",
        ] {
            if let Some(kind) = PrimitiveKind::from_schema_name(alias) {
                primitives.insert(alias.to_string(), kind);
            }
        }

        Self { primitives }
    }

    /// Register an extra spelling for a primitive kind
    pub fn register_alias<S: Into<String>>(&mut self, alias: S, kind: PrimitiveKind) {
        self.primitives.insert(alias.into(), kind);
    }

    /// Parse one schema document into exactly one declaration
    ///
    /// `document` names the source (usually a file name) and is used for
    /// diagnostics and as the entity name when the document has none.
    pub fn parse_document(&self, document: &str, content: &str) -> SchemaResult<EntityDecl> {
        let raw: RawDocument = serde_json::from_str(content)
            .map_err(|e| SchemaError::syntax(document, None, format!("invalid JSON: {}", e)))?;

        self.process_document(document, raw)
    }

    /// Parse a document that has already been decoded into JSON
    pub fn parse_value(&self, document: &str, value: Value) -> SchemaResult<EntityDecl> {
        let raw: RawDocument = serde_json::from_value(value)
            .map_err(|e| SchemaError::syntax(document, None, format!("invalid document: {}", e)))?;

        self.process_document(document, raw)
    }

    fn process_document(&self, document: &str, raw: RawDocument) -> SchemaResult<EntityDecl> {
        let source_text = raw.defaults_are_source_text();
        let name = match raw.name {
            Some(name) => name,
            None => Path::new(document)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
                .ok_or_else(|| SchemaError::syntax(document, None, "document has no entity name"))?,
        };

        if !is_identifier(&name) {
            return Err(SchemaError::syntax(
                document,
                None,
                format!("'{}' is not a valid entity name", name),
            ));
        }

        let kind = match raw.kind.as_deref() {
            None | Some("class") => DeclKind::Class,
            Some("enum") => DeclKind::Enum {
                values: raw.values.clone().unwrap_or_default(),
            },
            Some(other) => {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("unknown declaration type '{}', expected 'class' or 'enum'", other),
                ));
            }
        };

        let base = pick_one(document, ("base", raw.base), ("parent", raw.parent))?;
        let fields = pick_one(document, ("fields", raw.fields), ("members", raw.members))?.unwrap_or_default();

        let mut entity = EntityDecl::new(name);
        entity.description = raw.description;
        entity.namespace = raw.namespace;

        if let Some(base) = base {
            if !is_identifier(&base) {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("'{}' is not a valid base entity name", base),
                ));
            }
            entity.base = Some(base);
        }

        if let Some(package) = raw.package {
            if !is_qualified_name(&package) {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("'{}' is not a valid package name", package),
                ));
            }
            entity.package = Some(package);
        }

        if let Some(interface) = raw.implements {
            if !is_qualified_name(&interface) {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("'{}' is not a valid interface name", interface),
                ));
            }
            entity.implements = Some(interface);
        }

        if let Some(subdir) = raw.subdir {
            let relative = !subdir.is_empty()
                && Path::new(&subdir)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !relative {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("subdir '{}' must be a relative path without '..'", subdir),
                ));
            }
            entity.subdir = Some(subdir);
        }

        let mut seen = HashSet::new();
        for (index, field) in fields.into_iter().enumerate() {
            let field_decl = self.parse_field(document, index, field, source_text)?;
            if !seen.insert(field_decl.name.clone()) {
                return Err(SchemaError::syntax(
                    document,
                    Some(&field_decl.name),
                    "field is declared more than once",
                ));
            }
            entity.fields.push(field_decl);
        }

        if let DeclKind::Enum { values } = &kind {
            Self::validate_enum(document, &entity, values)?;
        } else if raw.values.is_some() {
            return Err(SchemaError::syntax(
                document,
                None,
                "'values' is only allowed on enum declarations",
            ));
        }
        entity.kind = kind;

        Ok(entity)
    }

    /// Parse a single field entry
    fn parse_field(&self, document: &str, index: usize, field: RawField, source_text: bool) -> SchemaResult<FieldDecl> {
        let name = field.name.ok_or_else(|| {
            SchemaError::syntax(document, None, format!("field #{} has no name", index + 1))
        })?;

        if !is_identifier(&name) {
            return Err(SchemaError::syntax(
                document,
                Some(&name),
                "field name is not a valid identifier",
            ));
        }

        let type_expr = field
            .type_expr
            .ok_or_else(|| SchemaError::syntax(document, Some(&name), "field has no type"))?;

        let field_type = self
            .parse_type_expr(&type_expr)
            .map_err(|message| SchemaError::syntax(document, Some(&name), message))?;

        let default = field
            .default
            .map(|value| match value {
                Value::String(text) if source_text => decode_source_literal(&text),
                value => parse_literal(&value),
            })
            .transpose()
            .map_err(|message| SchemaError::syntax(document, Some(&name), message))?;

        Ok(FieldDecl {
            name,
            field_type,
            default,
        })
    }

    /// Parse a type expression: primitive name, entity name or `collection<T>`
    pub fn parse_type_expr(&self, expr: &str) -> Result<FieldType, String> {
        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        self.parse_compact_type(&compact)
            .map_err(|message| format!("{} in type expression '{}'", message, expr))
    }

    fn parse_compact_type(&self, expr: &str) -> Result<FieldType, String> {
        if expr.is_empty() {
            return Err("missing type".to_string());
        }

        for prefix in COLLECTION_PREFIXES {
            if let Some(rest) = expr.strip_prefix(prefix) {
                let inner = rest
                    .strip_suffix('>')
                    .ok_or_else(|| format!("unterminated '{}'", prefix))?;
                return Ok(FieldType::collection(self.parse_compact_type(inner)?));
            }
        }

        if let Some(kind) = self.primitives.get(expr) {
            return Ok(FieldType::Primitive(*kind));
        }

        if is_identifier(expr) {
            Ok(FieldType::Reference(expr.to_string()))
        } else {
            Err(format!("'{}' is not a type name", expr))
        }
    }

    fn validate_enum(document: &str, entity: &EntityDecl, values: &[String]) -> SchemaResult<()> {
        if entity.base.is_some() {
            return Err(SchemaError::syntax(document, None, "enum declarations cannot have a base"));
        }
        if let Some(field) = entity.fields.first() {
            return Err(SchemaError::syntax(
                document,
                Some(&field.name),
                "enum declarations cannot have fields",
            ));
        }
        if entity.implements.is_some() {
            return Err(SchemaError::syntax(document, None, "enum declarations cannot implement an interface"));
        }
        if values.is_empty() {
            return Err(SchemaError::syntax(document, None, "enum declaration has no values"));
        }

        let mut seen = HashSet::new();
        for value in values {
            if !is_identifier(value) {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("enum value '{}' is not a valid identifier", value),
                ));
            }
            if !seen.insert(value.as_str()) {
                return Err(SchemaError::syntax(
                    document,
                    None,
                    format!("enum value '{}' is declared more than once", value),
                ));
            }
        }

        Ok(())
    }
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a JSON default value into a literal
fn parse_literal(value: &Value) -> Result<Literal, String> {
    match value {
        Value::String(s) => Ok(Literal::String(s.clone())),
        Value::Bool(b) => Ok(Literal::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Literal::Integer(i))
            } else if let Some(f) = n.as_f64() {
                if n.is_u64() {
                    Err(format!("integer default {} is out of range", n))
                } else {
                    Ok(Literal::Float(f))
                }
            } else {
                Err(format!("unsupported numeric default {}", n))
            }
        }
        Value::Array(_) | Value::Object(_) | Value::Null => Err(format!(
            "unsupported default value {}, expected a string, number or boolean",
            value
        )),
    }
}

/// Take a value that may be spelled under either of two keys
fn pick_one<T>(document: &str, first: (&str, Option<T>), second: (&str, Option<T>)) -> SchemaResult<Option<T>> {
    match (first.1, second.1) {
        (Some(_), Some(_)) => Err(SchemaError::syntax(
            document,
            None,
            format!("'{}' and '{}' cannot both be given", first.0, second.0),
        )),
        (value, None) | (None, value) => Ok(value),
    }
}

/// Decode a default written as source text: `true`, `42`, `1.5f`,
/// `"John"` or an enumerator, optionally qualified as `Color::Blue`
fn decode_source_literal(text: &str) -> Result<Literal, String> {
    let text = text.trim();

    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return unescape_source_string(inner).map(Literal::String);
    }
    match text {
        "true" => return Ok(Literal::Boolean(true)),
        "false" => return Ok(Literal::Boolean(false)),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Literal::Integer(i));
    }

    let number = text
        .strip_suffix('f')
        .or_else(|| text.strip_suffix('F'))
        .unwrap_or(text);
    let numeric = number.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        && number.bytes().all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b));
    if numeric {
        if let Ok(f) = number.parse::<f64>() {
            return Ok(Literal::Float(f));
        }
    }

    let enumerator = text.rsplit(|c: char| c == ':' || c == '.').next().unwrap_or(text);
    if is_identifier(enumerator) {
        return Ok(Literal::String(enumerator.to_string()));
    }

    Err(format!("cannot read default '{}'", text))
}

fn unescape_source_string(inner: &str) -> Result<String, String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => return Err("string default ends with a lone backslash".to_string()),
        }
    }
    Ok(out)
}

/// Dot-separated identifiers, e.g. `com.acme.models`
fn is_qualified_name(name: &str) -> bool {
    name.split('.').all(is_identifier)
}

/// ASCII identifier: a letter or underscore, then letters, digits or underscores
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_entity() {
        let schema = r#"
            {
                "name": "Animal",
                "base": "Entity",
                "fields": [
                    { "name": "age", "type": "integer-unsigned-32" },
                    { "name": "height", "type": "float32" },
                    { "name": "friends", "type": "collection<Entity>" },
                    { "name": "owner", "type": "string", "default": "John" },
                    { "name": "happy", "type": "boolean", "default": true },
                    { "name": "color", "type": "Color" },
                    { "name": "hat", "type": "Hat" }
                ]
            }
        "#;

        let parser = SchemaParser::new();
        let animal = parser.parse_document("Animal.json", schema).unwrap();

        assert_eq!(animal.name, "Animal");
        assert_eq!(animal.base.as_deref(), Some("Entity"));
        let names: Vec<&str> = animal.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["age", "height", "friends", "owner", "happy", "color", "hat"]);

        let friends = animal.get_field("friends").unwrap();
        assert_eq!(friends.field_type, FieldType::collection(FieldType::reference("Entity")));
        assert_eq!(animal.get_field("owner").unwrap().default, Some(Literal::from("John")));
        assert_eq!(animal.get_field("happy").unwrap().default, Some(Literal::Boolean(true)));
        assert_eq!(animal.get_field("hat").unwrap().field_type, FieldType::reference("Hat"));
    }

    #[test]
    fn test_parse_original_layout() {
        let schema = r#"
            {
                "type": "class",
                "parent": "Entity",
                "comment": "Represents an animal with a hat.",
                "namespace": "models",
                "members": [
                    { "name": "age", "type": "integer" },
                    { "name": "friends", "type": "list<Entity>" }
                ]
            }
        "#;

        let parser = SchemaParser::new();
        let animal = parser.parse_document("schemas/Animal.json", schema).unwrap();

        assert_eq!(animal.name, "Animal");
        assert_eq!(animal.base.as_deref(), Some("Entity"));
        assert_eq!(animal.description.as_deref(), Some("Represents an animal with a hat."));
        assert_eq!(animal.namespace.as_deref(), Some("models"));
        assert_eq!(animal.fields[0].field_type, FieldType::Primitive(PrimitiveKind::U32));
        assert!(animal.fields[1].field_type.is_collection());
    }

    #[test]
    fn test_namespace_and_package_are_separate() {
        let schema = r#"
            {
                "type": "class",
                "namespace": "models",
                "package": "com.acme.models",
                "implements": "java.io.Serializable",
                "subdir": "zoo/animals",
                "members": []
            }
        "#;

        let sheep = SchemaParser::new().parse_document("Sheep.json", schema).unwrap();
        assert_eq!(sheep.namespace.as_deref(), Some("models"));
        assert_eq!(sheep.package.as_deref(), Some("com.acme.models"));
        assert_eq!(sheep.implements.as_deref(), Some("java.io.Serializable"));
        assert_eq!(sheep.subdir.as_deref(), Some("zoo/animals"));
    }

    #[test]
    fn test_original_layout_defaults_are_source_text() {
        let schema = r#"
            {
                "type": "class",
                "members": [
                    { "name": "owner", "type": "string", "default": "\"John\"" },
                    { "name": "happy", "type": "boolean", "default": "true" },
                    { "name": "age", "type": "integer", "default": "3" },
                    { "name": "height", "type": "float", "default": "1.5f" },
                    { "name": "color", "type": "Color", "default": "Color::Blue" },
                    { "name": "typed", "type": "boolean", "default": false }
                ]
            }
        "#;

        let animal = SchemaParser::new().parse_document("Animal.json", schema).unwrap();
        let default = |name: &str| animal.get_field(name).unwrap().default.clone();
        assert_eq!(default("owner"), Some(Literal::from("John")));
        assert_eq!(default("happy"), Some(Literal::Boolean(true)));
        assert_eq!(default("age"), Some(Literal::Integer(3)));
        assert_eq!(default("height"), Some(Literal::Float(1.5)));
        assert_eq!(default("color"), Some(Literal::from("Blue")));
        assert_eq!(default("typed"), Some(Literal::Boolean(false)));
    }

    #[test]
    fn test_string_defaults_kept_verbatim_in_fields_layout() {
        let schema = r#"{ "name": "Note", "fields": [{ "name": "text", "type": "string", "default": "true" }] }"#;

        let note = SchemaParser::new().parse_document("Note.json", schema).unwrap();
        assert_eq!(note.fields[0].default, Some(Literal::from("true")));
    }

    #[test]
    fn test_decode_source_literal() {
        assert_eq!(decode_source_literal("\"a\\\"b\\n\""), Ok(Literal::from("a\"b\n")));
        assert_eq!(decode_source_literal("-7"), Ok(Literal::Integer(-7)));
        assert_eq!(decode_source_literal("2.5e3"), Ok(Literal::Float(2500.0)));
        assert_eq!(decode_source_literal("Color.Red"), Ok(Literal::from("Red")));
        assert!(decode_source_literal("{ 1, 2 }").is_err());
    }

    #[test]
    fn test_conflicting_keys_rejected() {
        let parser = SchemaParser::new();
        let err = parser
            .parse_document("A.json", r#"{ "name": "A", "base": "B", "parent": "C", "fields": [] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("'base' and 'parent'"));

        assert!(parser
            .parse_document("A.json", r#"{ "name": "A", "fields": [], "members": [] }"#)
            .is_err());
    }

    #[test]
    fn test_invalid_subdir_and_interface_rejected() {
        let parser = SchemaParser::new();
        assert!(parser
            .parse_document("A.json", r#"{ "name": "A", "subdir": "../outside", "fields": [] }"#)
            .is_err());
        assert!(parser
            .parse_document("A.json", r#"{ "name": "A", "subdir": "/abs", "fields": [] }"#)
            .is_err());
        assert!(parser
            .parse_document("A.json", r#"{ "name": "A", "implements": "not an interface", "fields": [] }"#)
            .is_err());
        assert!(parser
            .parse_document("E.json", r#"{ "name": "E", "type": "enum", "implements": "Tagged", "values": ["A"] }"#)
            .is_err());
    }

    #[test]
    fn test_parse_enum() {
        let schema = r#"{ "name": "Color", "type": "enum", "values": ["Red", "Green", "Blue"] }"#;

        let color = SchemaParser::new().parse_document("Color.json", schema).unwrap();
        assert!(color.is_enum());
        assert_eq!(color.enum_values(), ["Red", "Green", "Blue"]);
    }

    #[test]
    fn test_parse_nested_collection() {
        let parser = SchemaParser::new();
        let ty = parser.parse_type_expr("collection< collection<double> >").unwrap();
        assert_eq!(
            ty,
            FieldType::collection(FieldType::collection(FieldType::Primitive(PrimitiveKind::F64)))
        );
    }

    #[test]
    fn test_invalid_type_expression() {
        let parser = SchemaParser::new();
        assert!(parser.parse_type_expr("collection<Hat").is_err());
        assert!(parser.parse_type_expr("collection<>").is_err());
        assert!(parser.parse_type_expr("map<string,Hat>").is_err());
        assert!(parser.parse_type_expr("").is_err());
    }

    #[test]
    fn test_registered_alias() {
        let mut parser = SchemaParser::new();
        parser.register_alias("text", PrimitiveKind::String);
        assert_eq!(
            parser.parse_type_expr("text").unwrap(),
            FieldType::Primitive(PrimitiveKind::String)
        );
    }

    #[test]
    fn test_syntax_error_names_document_and_field() {
        let schema = r#"{ "name": "Animal", "fields": [{ "name": "hat", "type": "collection<Hat" }] }"#;

        let err = SchemaParser::new().parse_document("Animal.json", schema).unwrap_err();
        match err {
            SchemaError::Syntax { document, field, .. } => {
                assert_eq!(document, "Animal.json");
                assert_eq!(field.as_deref(), Some("hat"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = r#"{ "name": "A", "fields": [{ "name": "x", "type": "string" }, { "name": "x", "type": "bool" }] }"#;

        let err = SchemaParser::new().parse_document("A.json", schema).unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
        assert_eq!(err.field(), Some("x"));
    }

    #[test]
    fn test_unsupported_default_rejected() {
        let schema = r#"{ "name": "A", "fields": [{ "name": "tags", "type": "collection<string>", "default": [] }] }"#;

        let err = SchemaParser::new().parse_document("A.json", schema).unwrap_err();
        assert!(err.to_string().contains("unsupported default value"));
    }

    #[test]
    fn test_invalid_enum_rejected() {
        let parser = SchemaParser::new();
        assert!(parser
            .parse_document("E.json", r#"{ "name": "E", "type": "enum", "values": [] }"#)
            .is_err());
        assert!(parser
            .parse_document("E.json", r#"{ "name": "E", "type": "enum", "values": ["A", "A"] }"#)
            .is_err());
        assert!(parser
            .parse_document("E.json", r#"{ "name": "E", "type": "enum", "base": "B", "values": ["A"] }"#)
            .is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = SchemaParser::new().parse_document("broken.json", "{ not json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_parse_value() {
        let value = serde_json::json!({ "name": "Hat", "fields": [] });
        let hat = SchemaParser::new().parse_value("inline", value).unwrap();
        assert_eq!(hat.name, "Hat");
        assert!(hat.fields.is_empty());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("Animal"));
        assert!(is_identifier("_private1"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("has-dash"));
        assert!(!is_identifier(""));
    }
}
