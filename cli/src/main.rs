use anyhow::Result;
use clap::{Parser, Subcommand};
use modelgen_cli::utils::init_logging;
use modelgen_cli::{CheckCommand, Command, GenCommand, OutputConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modelgen")]
#[command(about = "Generate C++, C#, Java and Rust data models from JSON entity schemas")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve schemas and write model sources
    Generate {
        /// Schema files or directories of *.json files
        paths: Vec<PathBuf>,

        /// Output directory for C++ headers
        #[arg(long)]
        cpp_path: Option<PathBuf>,

        /// Output directory for C# sources
        #[arg(long)]
        cs_path: Option<PathBuf>,

        /// Output directory for Java sources
        #[arg(long)]
        java_path: Option<PathBuf>,

        /// Output directory for Rust sources
        #[arg(long)]
        rust_path: Option<PathBuf>,

        /// Let derived entities redeclare inherited fields
        #[arg(long)]
        allow_shadowing: bool,

        /// Namespace or package for declarations that name none
        #[arg(long)]
        namespace: Option<String>,

        /// Leave the creation date out of generated headers
        #[arg(long)]
        no_timestamp: bool,

        /// Path to modelgen.yaml or its directory
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Resolve schemas and report errors without writing anything
    Check {
        /// Schema files or directories of *.json files
        paths: Vec<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Let derived entities redeclare inherited fields
        #[arg(long)]
        allow_shadowing: bool,

        /// Path to modelgen.yaml or its directory
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Generate {
            paths,
            cpp_path,
            cs_path,
            java_path,
            rust_path,
            allow_shadowing,
            namespace,
            no_timestamp,
            config,
        } => GenCommand {
            paths,
            outputs: OutputConfig {
                cpp: cpp_path,
                csharp: cs_path,
                java: java_path,
                rust: rust_path,
            },
            allow_shadowing,
            namespace,
            no_timestamp,
            config,
        }
        .execute(),
        Commands::Check {
            paths,
            json,
            allow_shadowing,
            config,
        } => CheckCommand {
            paths,
            json,
            allow_shadowing,
            config,
        }
        .execute(),
    }
}
