//! Target type mapper: spells resolved field types and default literals
//! in each output language

use crate::entity::schema::FieldType;
use crate::entity::types::{Literal, PrimitiveKind};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages an emitter can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    Cpp,
    CSharp,
    Java,
    Rust,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 4] = [
        TargetLanguage::Cpp,
        TargetLanguage::CSharp,
        TargetLanguage::Java,
        TargetLanguage::Rust,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TargetLanguage::Cpp => "cpp",
            TargetLanguage::CSharp => "csharp",
            TargetLanguage::Java => "java",
            TargetLanguage::Rust => "rust",
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            TargetLanguage::Cpp => "h",
            TargetLanguage::CSharp => "cs",
            TargetLanguage::Java => "java",
            TargetLanguage::Rust => "rs",
        }
    }

    pub fn mapper(&self) -> Box<dyn TargetTypeMapper> {
        match self {
            TargetLanguage::Cpp => Box::new(CppMapper),
            TargetLanguage::CSharp => Box::new(CsMapper),
            TargetLanguage::Java => Box::new(JavaMapper),
            TargetLanguage::Rust => Box::new(RustMapper),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpp" | "c++" => Ok(TargetLanguage::Cpp),
            "cs" | "csharp" | "c#" => Ok(TargetLanguage::CSharp),
            "java" => Ok(TargetLanguage::Java),
            "rust" | "rs" => Ok(TargetLanguage::Rust),
            other => Err(format!("Unknown target language: {}", other)),
        }
    }
}

const CPP_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "continue", "default",
    "delete", "do", "double", "else", "enum", "explicit", "extern", "false", "float", "for",
    "friend", "goto", "if", "int", "long", "namespace", "new", "operator", "private", "protected",
    "public", "return", "short", "signed", "sizeof", "static", "struct", "switch", "template",
    "this", "throw", "true", "try", "typedef", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "while",
];

const CS_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "delegate", "do", "double", "else", "enum", "event", "explicit",
    "extern", "false", "finally", "float", "for", "foreach", "goto", "if", "in", "int",
    "interface", "internal", "is", "lock", "long", "namespace", "new", "null", "object",
    "operator", "out", "override", "private", "protected", "public", "readonly", "ref",
    "return", "sealed", "short", "sizeof", "static", "string", "struct", "switch", "this",
    "throw", "true", "try", "typeof", "uint", "using", "virtual", "void", "volatile", "while",
];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "super", "switch", "synchronized", "this", "throw", "throws",
    "true", "try", "void", "volatile", "while",
];

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

fn suffix_keyword(name: &str, keywords: &[&str]) -> String {
    if keywords.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Quote a string for C++, C# or Java; `control` spells ASCII control characters
fn quote_c_string(value: &str, control: impl Fn(char) -> String) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&control(c)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Per-language spelling of field types and default literals
///
/// Implementors supply the per-kind hooks; [`type_spelling`] and
/// [`default_spelling`] combine them and match every `FieldType` variant.
///
/// [`type_spelling`]: TargetTypeMapper::type_spelling
/// [`default_spelling`]: TargetTypeMapper::default_spelling
pub trait TargetTypeMapper: Send + Sync {
    fn language(&self) -> TargetLanguage;

    fn primitive_spelling(&self, kind: PrimitiveKind) -> &'static str;

    fn reference_spelling(&self, name: &str) -> String {
        name.to_string()
    }

    /// Spelling of a collection whose elements are spelled `element`
    fn collection_spelling(&self, element: &str) -> String;

    /// Spelling of a type used as a collection element
    fn element_spelling(&self, element: &FieldType) -> String {
        self.type_spelling(element)
    }

    fn type_spelling(&self, field_type: &FieldType) -> String {
        match field_type {
            FieldType::Primitive(kind) => self.primitive_spelling(*kind).to_string(),
            FieldType::Reference(name) => self.reference_spelling(name),
            FieldType::Collection(inner) => self.collection_spelling(&self.element_spelling(inner)),
        }
    }

    /// Member identifier for a schema field name
    fn member_name(&self, name: &str) -> String;

    /// Declared name of an enumerator; defaults refer to it the same way
    fn enumerator_name(&self, value: &str) -> String;

    fn string_literal(&self, value: &str) -> String {
        quote_c_string(value, |c| format!("\\{:03o}", c as u32))
    }

    fn integer_literal(&self, _kind: PrimitiveKind, value: i64) -> String {
        value.to_string()
    }

    fn float_literal(&self, kind: PrimitiveKind, value: f64) -> String {
        match kind {
            PrimitiveKind::F32 => format!("{:?}f", value),
            _ => format!("{:?}", value),
        }
    }

    fn enum_value_spelling(&self, enum_name: &str, value: &str) -> String {
        format!("{}.{}", enum_name, self.enumerator_name(value))
    }

    /// Spell a default literal for a field of the given type
    ///
    /// The resolver has already checked that the literal fits the type, so a
    /// string on a reference is an enumerator.
    fn default_spelling(&self, field_type: &FieldType, literal: &Literal) -> String {
        match (field_type, literal) {
            (FieldType::Reference(name), Literal::String(value)) => self.enum_value_spelling(name, value),
            (FieldType::Primitive(kind), Literal::Integer(i))
                if matches!(kind, PrimitiveKind::F32 | PrimitiveKind::F64) =>
            {
                self.float_literal(*kind, *i as f64)
            }
            (FieldType::Primitive(kind), Literal::Integer(i)) => self.integer_literal(*kind, *i),
            (FieldType::Primitive(kind), Literal::Float(v)) => self.float_literal(*kind, *v),
            (_, Literal::String(value)) => self.string_literal(value),
            (_, Literal::Boolean(b)) => b.to_string(),
            (_, Literal::Integer(i)) => i.to_string(),
            (_, Literal::Float(v)) => format!("{:?}", v),
        }
    }
}

/// C++ headers
pub struct CppMapper;

impl TargetTypeMapper for CppMapper {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Cpp
    }

    fn primitive_spelling(&self, kind: PrimitiveKind) -> &'static str {
        match kind {
            PrimitiveKind::String => "std::string",
            PrimitiveKind::U32 => "uint32_t",
            PrimitiveKind::I32 => "int32_t",
            PrimitiveKind::F32 => "float",
            PrimitiveKind::F64 => "double",
            PrimitiveKind::Boolean => "bool",
        }
    }

    fn collection_spelling(&self, element: &str) -> String {
        format!("std::vector<{}>", element)
    }

    // The prefix keeps members clear of keywords
    fn member_name(&self, name: &str) -> String {
        format!("m_{}", name)
    }

    fn enumerator_name(&self, value: &str) -> String {
        suffix_keyword(value, CPP_KEYWORDS)
    }

    fn enum_value_spelling(&self, enum_name: &str, value: &str) -> String {
        format!("{}::{}", enum_name, self.enumerator_name(value))
    }
}

/// C# classes
pub struct CsMapper;

impl CsMapper {
    fn verbatim(name: &str) -> String {
        if CS_KEYWORDS.contains(&name) {
            format!("@{}", name)
        } else {
            name.to_string()
        }
    }
}

impl TargetTypeMapper for CsMapper {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::CSharp
    }

    fn primitive_spelling(&self, kind: PrimitiveKind) -> &'static str {
        match kind {
            PrimitiveKind::String => "string",
            PrimitiveKind::U32 => "uint",
            PrimitiveKind::I32 => "int",
            PrimitiveKind::F32 => "float",
            PrimitiveKind::F64 => "double",
            PrimitiveKind::Boolean => "bool",
        }
    }

    fn collection_spelling(&self, element: &str) -> String {
        format!("List<{}>", element)
    }

    fn member_name(&self, name: &str) -> String {
        Self::verbatim(name)
    }

    fn enumerator_name(&self, value: &str) -> String {
        Self::verbatim(value)
    }

    // C# has no octal escapes
    fn string_literal(&self, value: &str) -> String {
        quote_c_string(value, |c| format!("\\u{:04x}", c as u32))
    }
}

/// Java classes; Java has no unsigned integers, so u32 widens to long
pub struct JavaMapper;

impl JavaMapper {
    fn boxed(kind: PrimitiveKind) -> &'static str {
        match kind {
            PrimitiveKind::String => "String",
            PrimitiveKind::U32 => "Long",
            PrimitiveKind::I32 => "Integer",
            PrimitiveKind::F32 => "Float",
            PrimitiveKind::F64 => "Double",
            PrimitiveKind::Boolean => "Boolean",
        }
    }
}

impl TargetTypeMapper for JavaMapper {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Java
    }

    fn primitive_spelling(&self, kind: PrimitiveKind) -> &'static str {
        match kind {
            PrimitiveKind::String => "String",
            PrimitiveKind::U32 => "long",
            PrimitiveKind::I32 => "int",
            PrimitiveKind::F32 => "float",
            PrimitiveKind::F64 => "double",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    fn collection_spelling(&self, element: &str) -> String {
        format!("ArrayList<{}>", element)
    }

    // Generics take reference types only
    fn element_spelling(&self, element: &FieldType) -> String {
        match element {
            FieldType::Primitive(kind) => Self::boxed(*kind).to_string(),
            other => self.type_spelling(other),
        }
    }

    fn member_name(&self, name: &str) -> String {
        suffix_keyword(name, JAVA_KEYWORDS)
    }

    fn enumerator_name(&self, value: &str) -> String {
        suffix_keyword(value, JAVA_KEYWORDS)
    }

    fn integer_literal(&self, kind: PrimitiveKind, value: i64) -> String {
        match kind {
            PrimitiveKind::U32 => format!("{}L", value),
            _ => value.to_string(),
        }
    }
}

/// Rust structs
pub struct RustMapper;

impl TargetTypeMapper for RustMapper {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Rust
    }

    fn primitive_spelling(&self, kind: PrimitiveKind) -> &'static str {
        match kind {
            PrimitiveKind::String => "String",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Boolean => "bool",
        }
    }

    fn collection_spelling(&self, element: &str) -> String {
        format!("Vec<{}>", element)
    }

    fn member_name(&self, name: &str) -> String {
        rust_field_name(name)
    }

    fn enumerator_name(&self, value: &str) -> String {
        suffix_keyword(&value.to_case(Case::Pascal), RUST_KEYWORDS)
    }

    fn string_literal(&self, value: &str) -> String {
        format!("{:?}.to_string()", value)
    }

    // Field type drives inference, no suffix needed
    fn float_literal(&self, _kind: PrimitiveKind, value: f64) -> String {
        format!("{:?}", value)
    }

    fn enum_value_spelling(&self, enum_name: &str, value: &str) -> String {
        format!("{}::{}", enum_name, self.enumerator_name(value))
    }
}

/// Rust field name: snake_case, keyword-safe
pub fn rust_field_name(name: &str) -> String {
    suffix_keyword(&name.to_case(Case::Snake), RUST_KEYWORDS)
}

/// Rust module (and file stem) for a declaration
pub fn rust_module_name(name: &str) -> String {
    suffix_keyword(&name.to_case(Case::Snake), RUST_KEYWORDS)
}
