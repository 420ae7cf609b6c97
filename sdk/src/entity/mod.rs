//! Schema-driven model framework
//!
//! This module loads JSON entity schemas, resolves inheritance and
//! cross-references into an ordered model, and renders that model as
//! C++, C#, Java or Rust source.

pub mod codegen;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use types::{ErrorKind, Literal, LiteralKind, PrimitiveKind, SchemaError, SchemaResult};

// Re-export schema types
pub use schema::{
    DeclKind, Diagnostic, Diagnostics, EntityDecl, FieldDecl, FieldType, FrozenRegistry, Model, ResolvedEntity,
    ResolvedField, ResolverOptions, SchemaParser, SchemaValidator, TypeRegistry, TypeResolver,
};
