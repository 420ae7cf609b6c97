pub mod config;
pub mod logging;

pub use config::{CONFIG_FILE_NAME, ConfigManager, ModelgenConfig, OutputConfig};
pub use logging::init_logging;
