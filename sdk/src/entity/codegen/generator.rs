//! Schema front end: discovers documents, loads and resolves them

use crate::entity::schema::{Diagnostics, Model, ResolverOptions, SchemaParser, SchemaValidator, TypeRegistry, TypeResolver};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Expand files and directories into the schema documents to load
///
/// Directories contribute their `*.json` files, sorted by path so that the
/// first-seen order does not depend on the file system.
pub fn discover_schema_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(path)
                .with_context(|| format!("Failed to read schema directory: {}", path.display()))?
            {
                let entry_path = entry?.path();
                if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "json") {
                    found.push(entry_path);
                }
            }
            found.sort();
            debug!("Found {} schema files in {}", found.len(), path.display());
            files.extend(found);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            bail!("Schema path does not exist: {}", path.display());
        }
    }

    Ok(files)
}

/// Loads schema documents into a resolved [`Model`]
pub struct EntityGenerator {
    /// Schema parser
    parser: SchemaParser,
    /// Schema validator
    validator: SchemaValidator,
    resolver: TypeResolver,
}

impl EntityGenerator {
    /// Create a new generator with default resolver options
    pub fn new() -> Self {
        Self::with_resolver_options(ResolverOptions::default())
    }

    pub fn with_resolver_options(options: ResolverOptions) -> Self {
        Self {
            parser: SchemaParser::new(),
            validator: SchemaValidator::new(),
            resolver: TypeResolver::new(options),
        }
    }

    /// Read every schema document under the given paths as `(document, content)` pairs
    pub fn read_sources<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<(String, String)>> {
        let mut sources = Vec::new();
        for file in discover_schema_files(paths)? {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read schema file: {}", file.display()))?;
            sources.push((file.display().to_string(), content));
        }
        Ok(sources)
    }

    /// Load and resolve in-memory documents
    pub fn resolve_sources<I, D, C>(&self, sources: I) -> Result<Model, Diagnostics>
    where
        I: IntoIterator<Item = (D, C)>,
        D: AsRef<str>,
        C: AsRef<str>,
    {
        let registry = TypeRegistry::load(&self.parser, sources)?;
        info!("Loaded {} schema declarations", registry.len());
        self.resolver.resolve(&registry.freeze())
    }

    /// Load and resolve the schema documents under the given paths
    ///
    /// Schema problems surface as a [`Diagnostics`] error that callers can
    /// downcast to list every finding.
    pub fn resolve_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Model> {
        let sources = self.read_sources(paths)?;
        if sources.is_empty() {
            bail!("No schema documents found");
        }
        for (document, _) in &sources {
            info!("Processing schema: {}", document);
        }

        Ok(self.resolve_sources(sources)?)
    }

    /// Collect lint warnings for a resolved model
    pub fn lint(&mut self, model: &Model) -> Vec<String> {
        self.validator.lint(model)
    }
}

impl Default for EntityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::ErrorKind;
    use tempfile::TempDir;

    const ENTITY: &str = r#"{ "name": "Entity", "fields": [{ "name": "id", "type": "u32" }] }"#;
    const ANIMAL: &str = r#"{
        "name": "Animal",
        "base": "Entity",
        "fields": [
            { "name": "age", "type": "integer-unsigned-32" },
            { "name": "friends", "type": "collection<Entity>" }
        ]
    }"#;

    #[test]
    fn test_discover_sorts_directory_entries() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("a.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let files = discover_schema_files(&[temp_dir.path()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.json", "b.json"]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(discover_schema_files(&[missing]).is_err());
    }

    #[test]
    fn test_resolve_sources_in_emission_order() {
        let generator = EntityGenerator::new();

        let model = generator
            .resolve_sources([("Animal.json", ANIMAL), ("Entity.json", ENTITY)])
            .unwrap();

        assert_eq!(model.emission_order(), ["Entity", "Animal"]);
        let animal = model.get("Animal").unwrap();
        assert_eq!(animal.field_names(), ["id", "age", "friends"]);
    }

    #[test]
    fn test_resolve_paths_reports_diagnostics() {
        let schema_dir = TempDir::new().unwrap();
        fs::write(schema_dir.path().join("Animal.json"), ANIMAL).unwrap();

        let generator = EntityGenerator::new();
        let err = generator.resolve_paths(&[schema_dir.path()]).unwrap_err();

        let diagnostics = err.downcast_ref::<Diagnostics>().expect("diagnostics error");
        assert!(diagnostics.has_kind(ErrorKind::UnresolvedReferenceError));
    }

    #[test]
    fn test_resolve_paths_reads_directories() {
        let schema_dir = TempDir::new().unwrap();
        fs::write(schema_dir.path().join("Animal.json"), ANIMAL).unwrap();
        fs::write(schema_dir.path().join("Entity.json"), ENTITY).unwrap();

        let mut generator = EntityGenerator::new();
        let model = generator.resolve_paths(&[schema_dir.path()]).unwrap();

        assert_eq!(model.len(), 2);
        assert!(generator.lint(&model).is_empty());
    }

    #[test]
    fn test_resolve_paths_needs_documents() {
        let schema_dir = TempDir::new().unwrap();
        let err = EntityGenerator::new().resolve_paths(&[schema_dir.path()]).unwrap_err();
        assert!(err.to_string().contains("No schema documents found"));
    }
}
