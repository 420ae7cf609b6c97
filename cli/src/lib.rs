//! modelgen CLI library
//!
//! This library provides programmatic access to the CLI commands and the
//! project configuration, for build scripts and tests.

pub mod commands;
pub mod utils;

// Re-export command types for advanced usage
pub use commands::{
    Command,
    check::{CheckCommand, CheckReport},
    generate::GenCommand,
};
pub use utils::config::{ConfigManager, ModelgenConfig, OutputConfig};
