pub mod codegen;
pub mod entity;

// Re-export entity framework components
pub use entity::{
    Diagnostic, Diagnostics, EntityDecl, ErrorKind, FieldDecl, FieldType, Literal, Model, PrimitiveKind,
    ResolvedEntity, ResolvedField, ResolverOptions, SchemaError, SchemaParser, SchemaResult, TypeRegistry,
    TypeResolver,
};

// Re-export emitters
pub use entity::codegen::{EmitOptions, EntityCodeGenerator, EntityGenerator, TargetLanguage, TargetTypeMapper};

// Re-export codegen components for build scripts
pub use codegen::{CodeGenerator, Codegen, CodegenResult, codegen};
