use super::{Command, load_config, report_diagnostics};
use crate::utils::config::{ModelgenConfig, OutputConfig};
use anyhow::{Result, bail};
use modelgen_sdk::entity::codegen::{EmitOptions, EntityGenerator};
use modelgen_sdk::{Codegen, CodegenResult, ResolverOptions, TargetLanguage};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct GenCommand {
    /// Schema files or directories; the configured schemas when empty
    pub paths: Vec<PathBuf>,
    /// Output directories given on the command line
    pub outputs: OutputConfig,
    pub allow_shadowing: bool,
    pub namespace: Option<String>,
    pub no_timestamp: bool,
    pub config: Option<PathBuf>,
}

impl GenCommand {
    /// Command line flags override the file and environment settings
    fn apply_flags(&self, config: &mut ModelgenConfig) {
        if !self.paths.is_empty() {
            config.schemas = self.paths.clone();
        }
        for language in TargetLanguage::ALL {
            if let Some(dir) = self.outputs.get(language) {
                config.outputs.set(language, dir.clone());
            }
        }
        if self.allow_shadowing {
            config.allow_shadowing = true;
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }
        if self.no_timestamp {
            config.timestamp = false;
        }
    }

    /// Resolve the schemas and emit every configured language
    pub fn run(&self) -> Result<Vec<CodegenResult>> {
        let mut config = load_config(self.config.as_deref())?;
        self.apply_flags(&mut config);
        config.validate()?;
        debug!("Effective configuration: {:?}", config);

        if config.schemas.is_empty() {
            bail!("No schema files given; pass paths or set 'schemas' in modelgen.yaml");
        }
        let targets = config.outputs.targets();
        if targets.is_empty() {
            bail!("No output directory given; use --cpp-path, --cs-path, --java-path or --rust-path");
        }
        for (language, dir) in &targets {
            debug!("Target {} -> {}", language, dir.display());
        }

        let mut emit = EmitOptions {
            timestamp: config.timestamp,
            ..EmitOptions::default()
        };
        if let Some(namespace) = &config.namespace {
            emit.default_namespace = namespace.clone();
        }

        let mut generator = EntityGenerator::with_resolver_options(ResolverOptions {
            allow_shadowing: config.allow_shadowing,
        });
        let model = generator.resolve_paths(&config.schemas)?;
        info!("Resolved {} declarations", model.len());
        for warning in generator.lint(&model) {
            warn!("{}", warning);
            println!("⚠ {}", warning);
        }

        let results = Codegen::for_languages(&targets, &emit).generate_all(&model);
        for result in &results {
            info!(
                "{}: {} file(s) written, success: {}",
                result.generator_name,
                result.files_generated.len(),
                result.success
            );
        }
        Ok(results)
    }
}

impl Command for GenCommand {
    fn execute(&self) -> Result<()> {
        println!("Generating models...");

        let results = self.run().inspect_err(report_diagnostics)?;

        let mut failed = 0;
        for result in &results {
            if result.success {
                println!(
                    "✓ {}: {} ({} files)",
                    result.generator_name,
                    result.message,
                    result.files_generated.len()
                );
            } else {
                failed += 1;
                println!("✗ {}: {}", result.generator_name, result.message);
            }
        }

        if failed > 0 {
            bail!("{} generator(s) failed", failed);
        }
        Ok(())
    }
}
