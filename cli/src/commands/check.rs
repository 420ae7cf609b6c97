use super::{Command, load_config};
use anyhow::{Result, bail};
use modelgen_sdk::entity::codegen::EntityGenerator;
use modelgen_sdk::{Diagnostic, Diagnostics, ResolverOptions};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

pub struct CheckCommand {
    /// Schema files or directories; the configured schemas when empty
    pub paths: Vec<PathBuf>,
    /// Print the report as JSON
    pub json: bool,
    pub allow_shadowing: bool,
    pub config: Option<PathBuf>,
}

/// Outcome of resolving a schema set without emitting anything
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<String>,
    /// Declarations in emission order, empty on failure
    pub emission_order: Vec<String>,
}

impl CheckCommand {
    /// Resolve the schemas; schema errors are part of the report, not an `Err`
    pub fn run(&self) -> Result<CheckReport> {
        let mut config = load_config(self.config.as_deref())?;
        if !self.paths.is_empty() {
            config.schemas = self.paths.clone();
        }
        if config.schemas.is_empty() {
            bail!("No schema files given; pass paths or set 'schemas' in modelgen.yaml");
        }
        debug!("Checking schemas: {:?}", config.schemas);

        let mut generator = EntityGenerator::with_resolver_options(ResolverOptions {
            allow_shadowing: config.allow_shadowing || self.allow_shadowing,
        });

        match generator.resolve_paths(&config.schemas) {
            Ok(model) => {
                info!("Resolved {} declarations", model.len());
                Ok(CheckReport {
                    ok: true,
                    diagnostics: vec![],
                    warnings: generator.lint(&model),
                    emission_order: model.emission_order().into_iter().map(str::to_string).collect(),
                })
            }
            Err(e) => match e.downcast_ref::<Diagnostics>() {
                Some(diagnostics) => {
                    info!("Schema check found {} error(s)", diagnostics.len());
                    Ok(CheckReport {
                        ok: false,
                        diagnostics: diagnostics.to_diagnostics(),
                        warnings: vec![],
                        emission_order: vec![],
                    })
                }
                None => Err(e),
            },
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self) -> Result<()> {
        let report = self.run()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            for diagnostic in &report.diagnostics {
                println!("✗ [{}] {}", diagnostic.kind, diagnostic.message);
            }
            for warning in &report.warnings {
                println!("⚠ {}", warning);
            }
            if report.ok {
                println!("✓ {} declarations resolved", report.emission_order.len());
                println!("  Emission order: {}", report.emission_order.join(", "));
            }
        }

        if !report.ok {
            bail!("Schema check failed with {} error(s)", report.diagnostics.len());
        }
        Ok(())
    }
}
