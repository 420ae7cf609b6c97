pub mod check;
pub mod generate;

use crate::utils::config::{CONFIG_FILE_NAME, ConfigManager, ModelgenConfig};
use anyhow::Result;
use modelgen_sdk::Diagnostics;
use std::env;
use std::path::Path;

pub trait Command {
    fn execute(&self) -> Result<()>;
}

/// Resolve the effective project configuration
///
/// An explicit `--config` path may name the file or its directory. Without
/// one, the project root is searched upwards from the working directory and
/// a missing file means defaults.
pub fn load_config(config_path: Option<&Path>) -> Result<ModelgenConfig> {
    let manager = match config_path {
        Some(path) if path.is_dir() => ConfigManager::from_file(path.join(CONFIG_FILE_NAME))?,
        Some(path) => ConfigManager::from_file(path)?,
        None => {
            let cwd = env::current_dir()?;
            let root = ConfigManager::find_project_root(&cwd).unwrap_or(cwd);
            let mut manager = ConfigManager::new(root);
            manager.load()?;
            manager
        }
    };

    manager.get_effective_config()
}

/// Print every schema error carried by a failed run
pub fn report_diagnostics(error: &anyhow::Error) {
    if let Some(diagnostics) = error.downcast_ref::<Diagnostics>() {
        for diagnostic in diagnostics.iter() {
            eprintln!("✗ [{}] {}", diagnostic.kind(), diagnostic);
        }
    }
}
