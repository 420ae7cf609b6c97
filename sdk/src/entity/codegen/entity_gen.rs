//! Per-entity source generator; Rust output goes through the rust-codegen crate

use super::cfamily;
use super::mapper::{TargetLanguage, TargetTypeMapper, rust_module_name};
use crate::codegen::{CodeGenerator, CodegenResult, CodegenResultBuilder};
use crate::entity::schema::{Model, ResolvedEntity};
use anyhow::{Context, Result};
use chrono::Utc;
use rust_codegen::{Field, Function, Impl, Scope, Struct, Type};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header label in front of a file's fingerprint
pub const FINGERPRINT_LABEL: &str = "Fingerprint: ";

/// Emitter settings shared by every language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitOptions {
    /// Stamp the generation time into each file header
    #[serde(default = "default_timestamp")]
    pub timestamp: bool,
    /// Namespace (C++, C#) or package (Java) for declarations that name none
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
}

fn default_timestamp() -> bool {
    true
}

fn default_namespace() -> String {
    "models".to_string()
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            timestamp: default_timestamp(),
            default_namespace: default_namespace(),
        }
    }
}

impl EmitOptions {
    pub fn creation_date(&self) -> Option<String> {
        self.timestamp
            .then(|| Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }

    pub fn namespace_for(&self, entity: &ResolvedEntity) -> String {
        entity
            .namespace
            .clone()
            .unwrap_or_else(|| self.default_namespace.clone())
    }

    /// Java package: the declared package, then the namespace
    pub fn package_for(&self, entity: &ResolvedEntity) -> String {
        entity
            .package
            .clone()
            .unwrap_or_else(|| self.namespace_for(entity))
    }
}

/// Files touched by one [`EntityCodeGenerator::write_model`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFiles {
    pub written: Vec<PathBuf>,
    /// Existing files already carrying the current fingerprint
    pub unchanged: Vec<PathBuf>,
}

fn has_fingerprint(path: &Path, fingerprint: &str) -> bool {
    let marker = format!("{}{}", FINGERPRINT_LABEL, fingerprint);
    fs::read_to_string(path)
        .map(|existing| existing.contains(&marker))
        .unwrap_or(false)
}

/// Renders resolved entities in one target language
pub struct EntityCodeGenerator {
    mapper: Box<dyn TargetTypeMapper>,
    options: EmitOptions,
}

impl EntityCodeGenerator {
    pub fn new(language: TargetLanguage) -> Self {
        Self::with_options(language, EmitOptions::default())
    }

    pub fn with_options(language: TargetLanguage, options: EmitOptions) -> Self {
        Self {
            mapper: language.mapper(),
            options,
        }
    }

    pub fn language(&self) -> TargetLanguage {
        self.mapper.language()
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Output file name for one declaration
    pub fn file_name(&self, entity: &ResolvedEntity) -> String {
        match self.language() {
            TargetLanguage::Rust => format!("{}.rs", rust_module_name(&entity.name)),
            language => format!("{}.{}", entity.name, language.extension()),
        }
    }

    /// Where one declaration lands under `dst_dir`; Rust modules stay flat next to `mod.rs`
    pub fn output_path(&self, entity: &ResolvedEntity, dst_dir: &Path) -> PathBuf {
        let dir = match &entity.subdir {
            Some(subdir) if self.language() != TargetLanguage::Rust => dst_dir.join(subdir),
            _ => dst_dir.to_path_buf(),
        };
        dir.join(self.file_name(entity))
    }

    /// Render the source file for one declaration
    pub fn generate_entity(&self, entity: &ResolvedEntity, model: &Model) -> String {
        let fingerprint = self.fingerprint(entity, model);
        self.render(entity, model, &self.options, Some(&fingerprint))
    }

    /// SHA-256 of the file rendered without creation date or fingerprint
    pub fn fingerprint(&self, entity: &ResolvedEntity, model: &Model) -> String {
        let stable = EmitOptions {
            timestamp: false,
            ..self.options.clone()
        };
        let source = self.render(entity, model, &stable, None);
        hex::encode(Sha256::digest(source.as_bytes()))
    }

    fn render(&self, entity: &ResolvedEntity, model: &Model, options: &EmitOptions, fingerprint: Option<&str>) -> String {
        let mapper = self.mapper.as_ref();
        match self.language() {
            TargetLanguage::Cpp => cfamily::render_cpp(entity, model, mapper, options, fingerprint),
            TargetLanguage::CSharp => cfamily::render_cs(entity, model, mapper, options, fingerprint),
            TargetLanguage::Java => cfamily::render_java(entity, model, mapper, options, fingerprint),
            TargetLanguage::Rust if entity.is_enum() => self.generate_rust_enum(entity, options, fingerprint),
            TargetLanguage::Rust => self.generate_rust_struct(entity, options, fingerprint),
        }
    }

    fn rust_header(&self, entity: &ResolvedEntity, options: &EmitOptions, fingerprint: Option<&str>) -> Scope {
        let mut header = Scope::new();
        header.raw(&format!("//! Generated model: {}", entity.name));
        header.raw("// This file is auto-generated. Do not edit manually.");
        if let Some(created) = options.creation_date() {
            header.raw(&format!("// Creation date: {}", created));
        }
        if let Some(fingerprint) = fingerprint {
            header.raw(&format!("// {}{}", FINGERPRINT_LABEL, fingerprint));
        }
        header.raw("");
        header
    }

    /// Rust has no inheritance, so the struct carries the flattened field list
    fn generate_rust_struct(&self, entity: &ResolvedEntity, options: &EmitOptions, fingerprint: Option<&str>) -> String {
        let header = self.rust_header(entity, options, fingerprint);
        let mut scope = Scope::new();

        scope.import("serde", "{Serialize, Deserialize}");
        let mut imported: Vec<&str> = Vec::new();
        for field in &entity.fields {
            if let Some(name) = field.field_type.referenced_name() {
                if name != entity.name && !imported.contains(&name) {
                    scope.import("super", name);
                    imported.push(name);
                }
            }
        }
        scope.raw("");

        let mut model_struct = Struct::new(&entity.name);
        model_struct.vis("pub");

        let mut docs = entity
            .description
            .clone()
            .unwrap_or_else(|| format!("Model: {}", entity.name));
        if !entity.ancestors.is_empty() {
            docs.push_str(&format!("\n\nFlattened from: {}", entity.ancestors.join(" -> ")));
        }
        model_struct.doc(&docs);
        model_struct
            .derive("Debug")
            .derive("Clone")
            .derive("PartialEq")
            .derive("Serialize")
            .derive("Deserialize");

        let mut default_fn = Function::new("default");
        default_fn.ret("Self").line("Self {");

        for field in &entity.fields {
            let rust_name = self.mapper.member_name(&field.name);

            // Only add serde rename annotation if the field name actually changed
            let annotation = if rust_name != field.name {
                vec![format!("#[serde(rename = \"{}\")]", field.name)]
            } else {
                vec![]
            };
            let documentation = if field.declared_in != entity.name {
                vec![format!("Inherited from {}", field.declared_in)]
            } else {
                vec![]
            };

            model_struct.push_field(Field {
                name: format!("pub {}", rust_name),
                ty: Type::new(&self.mapper.type_spelling(&field.field_type)),
                documentation,
                annotation,
            });

            let value = match &field.default {
                Some(literal) => self.mapper.default_spelling(&field.field_type, literal),
                None => "Default::default()".to_string(),
            };
            default_fn.line(&format!("    {}: {},", rust_name, value));
        }
        default_fn.line("}");

        scope.push_struct(model_struct);
        scope.raw("");

        let mut default_impl = Impl::new(&entity.name);
        default_impl.impl_trait("Default");
        default_impl.push_fn(default_fn);
        scope.push_impl(default_impl);

        format!("{}{}", header.to_string(), scope.to_string())
    }

    fn generate_rust_enum(&self, entity: &ResolvedEntity, options: &EmitOptions, fingerprint: Option<&str>) -> String {
        let header = self.rust_header(entity, options, fingerprint);
        let mut scope = Scope::new();
        scope.import("serde", "{Serialize, Deserialize}");
        scope.raw("");

        let mut code = String::new();
        let docs = entity
            .description
            .clone()
            .unwrap_or_else(|| format!("Enumeration: {}", entity.name));
        for line in docs.lines() {
            code.push_str(&format!("/// {}\n", line));
        }
        code.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]\n");
        code.push_str(&format!("pub enum {} {{\n", entity.name));
        for (i, value) in entity.enum_values().iter().enumerate() {
            if i == 0 {
                code.push_str("    #[default]\n");
            }
            let variant = self.mapper.enumerator_name(value);
            if variant != *value {
                code.push_str(&format!("    #[serde(rename = \"{}\")]\n", value));
            }
            code.push_str(&format!("    {},\n", variant));
        }
        code.push('}');
        scope.raw(&code);

        format!("{}{}", header.to_string(), scope.to_string())
    }

    /// `mod.rs` re-exporting every generated Rust model
    pub fn generate_module_file(&self, model: &Model) -> Option<String> {
        if self.language() != TargetLanguage::Rust {
            return None;
        }

        let mut content = String::new();
        content.push_str("//! Generated models module\n");
        content.push_str("//!\n");
        content.push_str("// This file is auto-generated. Do not edit manually.\n\n");

        for entity in model {
            content.push_str(&format!("pub mod {};\n", rust_module_name(&entity.name)));
        }
        content.push('\n');

        for entity in model {
            content.push_str(&format!("pub use {}::{};\n", rust_module_name(&entity.name), entity.name));
        }

        Some(content)
    }

    /// Write one file per declaration in emission order, plus `mod.rs` for Rust.
    /// Files whose header already carries the current fingerprint are left alone.
    pub fn write_model(&self, model: &Model, dst_dir: &Path) -> Result<WrittenFiles> {
        if !dst_dir.exists() {
            fs::create_dir_all(dst_dir)
                .with_context(|| format!("Failed to create output directory: {}", dst_dir.display()))?;
        }

        let mut files = WrittenFiles::default();
        for entity in model {
            let path = self.output_path(entity, dst_dir);
            let fingerprint = self.fingerprint(entity, model);
            if has_fingerprint(&path, &fingerprint) {
                debug!("Unchanged model file: {}", path.display());
                files.unchanged.push(path);
                continue;
            }

            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            }
            let code = self.render(entity, model, &self.options, Some(&fingerprint));
            fs::write(&path, code)
                .with_context(|| format!("Failed to write model file: {}", path.display()))?;
            info!("Generated {} for {}", path.display(), entity.name);
            files.written.push(path);
        }

        if let Some(module) = self.generate_module_file(model) {
            let path = dst_dir.join("mod.rs");
            if fs::read_to_string(&path).is_ok_and(|existing| existing == module) {
                debug!("Unchanged module file: {}", path.display());
                files.unchanged.push(path);
            } else {
                fs::write(&path, module)
                    .with_context(|| format!("Failed to write module file: {}", path.display()))?;
                files.written.push(path);
            }
        }

        Ok(files)
    }
}

impl CodeGenerator for EntityCodeGenerator {
    fn generator_name(&self) -> &str {
        self.language().name()
    }

    fn should_generate(&self, model: &Model) -> bool {
        !model.is_empty()
    }

    fn generate(&self, model: &Model, dst_dir: &Path) -> Result<CodegenResult> {
        let files = self.write_model(model, dst_dir)?;

        let mut message = format!("Generated {} {} models", model.len(), self.language());
        if !files.unchanged.is_empty() {
            message.push_str(&format!(" ({} files unchanged)", files.unchanged.len()));
        }
        let result = CodegenResultBuilder::default()
            .generator_name(self.generator_name().to_string())
            .message(message)
            .files_generated(files.written)
            .success(true)
            .build()?;
        Ok(result)
    }
}
