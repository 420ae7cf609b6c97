//! Unified code generation interface
//!
//! This module provides a simple, synchronous API for all model emitters.
//! It handles schema discovery, resolution, and generation coordination.

use crate::entity::codegen::{EmitOptions, EntityCodeGenerator, EntityGenerator, TargetLanguage};
use crate::entity::schema::{Model, ResolverOptions};
use anyhow::Result;
use derive_builder::Builder;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of a code generation operation
#[derive(Debug, Clone, Builder)]
pub struct CodegenResult {
    pub generator_name: String,
    pub files_generated: Vec<PathBuf>,
    pub success: bool,
    pub message: String,
}

/// Trait for all code generators
pub trait CodeGenerator {
    /// Name of this generator (e.g. "cpp", "rust")
    fn generator_name(&self) -> &str;

    /// Check if this generator has anything to emit for the model
    fn should_generate(&self, model: &Model) -> bool;

    /// Emit the model into the destination directory
    fn generate(&self, model: &Model, dst_dir: &Path) -> Result<CodegenResult>;
}

struct Target {
    generator: Box<dyn CodeGenerator>,
    dst_dir: PathBuf,
}

/// Unified code generation runner
#[derive(Default)]
pub struct Codegen {
    targets: Vec<Target>,
}

impl Codegen {
    /// Create a runner with no targets
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner emitting each `(language, directory)` pair
    pub fn for_languages(targets: &[(TargetLanguage, PathBuf)], options: &EmitOptions) -> Self {
        let mut codegen = Self::new();
        for (language, dst_dir) in targets {
            codegen.register_generator(
                Box::new(EntityCodeGenerator::with_options(*language, options.clone())),
                dst_dir.clone(),
            );
        }
        codegen
    }

    /// Register a custom generator
    pub fn register_generator(&mut self, generator: Box<dyn CodeGenerator>, dst_dir: PathBuf) {
        self.targets.push(Target { generator, dst_dir });
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Run all applicable generators over a resolved model
    ///
    /// A failing generator is reported in its result and does not stop the
    /// others.
    pub fn generate_all(&self, model: &Model) -> Vec<CodegenResult> {
        let mut results = Vec::new();

        for target in &self.targets {
            let generator = &target.generator;
            if !generator.should_generate(model) {
                continue;
            }

            match generator.generate(model, &target.dst_dir) {
                Ok(result) => {
                    info!("{}: {}", result.generator_name, result.message);
                    results.push(result);
                }
                Err(e) => {
                    warn!("{} generation failed: {:#}", generator.generator_name(), e);
                    results.push(CodegenResult {
                        generator_name: generator.generator_name().to_string(),
                        files_generated: vec![],
                        success: false,
                        message: format!("Generation failed: {:#}", e),
                    });
                }
            }
        }

        results
    }
}

/// Simple synchronous codegen function: load, resolve and emit in one call
pub fn codegen<P: AsRef<Path>>(
    sources: &[P],
    targets: &[(TargetLanguage, PathBuf)],
    resolver: ResolverOptions,
    emit: &EmitOptions,
) -> Result<Vec<CodegenResult>> {
    let generator = EntityGenerator::with_resolver_options(resolver);
    let model = generator.resolve_paths(sources)?;
    Ok(Codegen::for_languages(targets, emit).generate_all(&model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::schema::{EntityDecl, TypeRegistry, TypeResolver};
    use tempfile::TempDir;

    struct FailingGenerator;

    impl CodeGenerator for FailingGenerator {
        fn generator_name(&self) -> &str {
            "failing"
        }

        fn should_generate(&self, _model: &Model) -> bool {
            true
        }

        fn generate(&self, _model: &Model, _dst_dir: &Path) -> Result<CodegenResult> {
            anyhow::bail!("disk full")
        }
    }

    fn hat_model() -> Model {
        let mut registry = TypeRegistry::new();
        registry.register(EntityDecl::new("Hat")).unwrap();
        TypeResolver::default().resolve(&registry.freeze()).unwrap()
    }

    #[test]
    fn test_generate_all_languages() {
        let temp_dir = TempDir::new().unwrap();
        let targets: Vec<(TargetLanguage, PathBuf)> = TargetLanguage::ALL
            .iter()
            .map(|l| (*l, temp_dir.path().join(l.name())))
            .collect();

        let codegen = Codegen::for_languages(&targets, &EmitOptions::default());
        let results = codegen.generate_all(&hat_model());

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.success));
        assert!(temp_dir.path().join("cpp/Hat.h").exists());
        assert!(temp_dir.path().join("csharp/Hat.cs").exists());
        assert!(temp_dir.path().join("java/Hat.java").exists());
        assert!(temp_dir.path().join("rust/hat.rs").exists());
        assert!(temp_dir.path().join("rust/mod.rs").exists());
    }

    #[test]
    fn test_failure_is_reported_per_generator() {
        let temp_dir = TempDir::new().unwrap();
        let mut codegen = Codegen::new();
        codegen.register_generator(Box::new(FailingGenerator), temp_dir.path().to_path_buf());
        codegen.register_generator(
            Box::new(EntityCodeGenerator::new(TargetLanguage::Cpp)),
            temp_dir.path().to_path_buf(),
        );

        let results = codegen.generate_all(&hat_model());
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].message.contains("disk full"));
        assert!(results[1].success);
    }

    #[test]
    fn test_empty_model_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let codegen = Codegen::for_languages(&[(TargetLanguage::Rust, temp_dir.path().to_path_buf())], &EmitOptions::default());

        assert!(codegen.generate_all(&Model::default()).is_empty());
    }
}
