//! Schema loading, registration and resolution

pub mod model;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod validation;

pub use model::{Model, ResolvedEntity, ResolvedField};
pub use parser::SchemaParser;
pub use registry::{FrozenRegistry, TypeRegistry};
pub use resolver::{DependencyGraph, Edge, EdgeVia, ResolverOptions, TypeResolver};
pub use types::{DeclKind, EntityDecl, FieldDecl, FieldType};
pub use validation::{Diagnostic, Diagnostics, SchemaValidator, is_reserved_word};

/// Load and resolve a batch of `(document name, content)` pairs in one go
///
/// Load errors stop the run before resolution, matching the load/resolve
/// phase split.
pub fn resolve_documents<I, D, C>(documents: I, options: &ResolverOptions) -> Result<Model, Diagnostics>
where
    I: IntoIterator<Item = (D, C)>,
    D: AsRef<str>,
    C: AsRef<str>,
{
    let registry = TypeRegistry::load(&SchemaParser::new(), documents)?;
    TypeResolver::new(options.clone()).resolve(&registry.freeze())
}
