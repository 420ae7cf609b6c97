use anyhow::{Context, Result, anyhow};
use modelgen_sdk::TargetLanguage;
use modelgen_sdk::entity::schema::parser::is_identifier;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "modelgen.yaml";

/// Main configuration structure for modelgen projects
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelgenConfig {
    /// Schema files or directories, relative to the project root
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    #[serde(default)]
    pub outputs: OutputConfig,
    #[serde(default)]
    pub allow_shadowing: bool,
    #[serde(default = "default_timestamp")]
    pub timestamp: bool,
    /// Namespace or package for declarations that name none
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Output directory per target language
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutputConfig {
    pub cpp: Option<PathBuf>,
    pub csharp: Option<PathBuf>,
    pub java: Option<PathBuf>,
    pub rust: Option<PathBuf>,
}

fn default_timestamp() -> bool {
    true
}

impl Default for ModelgenConfig {
    fn default() -> Self {
        Self {
            schemas: vec![],
            outputs: OutputConfig::default(),
            allow_shadowing: false,
            timestamp: default_timestamp(),
            namespace: None,
        }
    }
}

impl OutputConfig {
    pub fn get(&self, language: TargetLanguage) -> Option<&PathBuf> {
        match language {
            TargetLanguage::Cpp => self.cpp.as_ref(),
            TargetLanguage::CSharp => self.csharp.as_ref(),
            TargetLanguage::Java => self.java.as_ref(),
            TargetLanguage::Rust => self.rust.as_ref(),
        }
    }

    pub fn set(&mut self, language: TargetLanguage, dir: PathBuf) {
        let slot = match language {
            TargetLanguage::Cpp => &mut self.cpp,
            TargetLanguage::CSharp => &mut self.csharp,
            TargetLanguage::Java => &mut self.java,
            TargetLanguage::Rust => &mut self.rust,
        };
        *slot = Some(dir);
    }

    /// Configured `(language, directory)` pairs in a fixed language order
    pub fn targets(&self) -> Vec<(TargetLanguage, PathBuf)> {
        TargetLanguage::ALL
            .iter()
            .filter_map(|language| self.get(*language).map(|dir| (*language, dir.clone())))
            .collect()
    }
}

impl ModelgenConfig {
    /// Load configuration from a project directory
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_from_file(path.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(anyhow!(
                "Configuration file not found at: {}",
                config_path.display()
            ));
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: ModelgenConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Save configuration to a project directory
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref().join(CONFIG_FILE_NAME);

        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Make relative schema and output paths relative to `root`
    pub fn rebase<P: AsRef<Path>>(&mut self, root: P) {
        let root = root.as_ref();
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };

        self.schemas.iter_mut().for_each(rebase);
        for dir in [
            &mut self.outputs.cpp,
            &mut self.outputs.csharp,
            &mut self.outputs.java,
            &mut self.outputs.rust,
        ]
        .into_iter()
        .flatten()
        {
            rebase(dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(namespace) = &self.namespace {
            if namespace.is_empty() || !namespace.split('.').all(is_identifier) {
                return Err(anyhow!("Invalid namespace: '{}'", namespace));
            }
        }

        for (language, dir) in self.outputs.targets() {
            if dir.as_os_str().is_empty() {
                return Err(anyhow!("Output directory for {} cannot be empty", language));
            }
        }

        Ok(())
    }
}

/// Configuration manager that handles loading project configurations
pub struct ConfigManager {
    project_config: Option<ModelgenConfig>,
    project_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager for a project
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_config: None,
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Create a manager from an explicit configuration file
    ///
    /// The file's directory becomes the project root.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let project_path = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut config = ModelgenConfig::load_from_file(config_path)?;
        config.rebase(&project_path);

        Ok(Self {
            project_config: Some(config),
            project_path,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Load project configuration if the project has one
    pub fn load(&mut self) -> Result<()> {
        if self.project_path.join(CONFIG_FILE_NAME).exists() {
            let mut config = ModelgenConfig::load_from_path(&self.project_path)?;
            config.rebase(&self.project_path);
            self.project_config = Some(config);
        }

        Ok(())
    }

    /// Get the effective configuration with environment variable overrides
    pub fn get_effective_config(&self) -> Result<ModelgenConfig> {
        self.get_effective_config_with(|key| env::var(key).ok())
    }

    /// Same as [`ConfigManager::get_effective_config`], reading variables through `lookup`
    pub fn get_effective_config_with<F>(&self, lookup: F) -> Result<ModelgenConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.project_config.clone().unwrap_or_default();

        // Apply environment variable overrides
        if let Some(value) = lookup("MODELGEN_ALLOW_SHADOWING") {
            config.allow_shadowing = parse_flag(&value)
                .ok_or_else(|| anyhow!("Invalid MODELGEN_ALLOW_SHADOWING value: '{}'", value))?;
        }

        if let Some(namespace) = lookup("MODELGEN_NAMESPACE") {
            config.namespace = Some(namespace);
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the project configuration
    pub fn get_project_config(&self) -> Option<&ModelgenConfig> {
        self.project_config.as_ref()
    }

    /// Check if we're in a modelgen project directory
    pub fn is_modelgen_project(&self) -> bool {
        self.project_path.join(CONFIG_FILE_NAME).exists()
    }

    /// Find the project root by looking for modelgen.yaml
    pub fn find_project_root<P: AsRef<Path>>(start_path: P) -> Option<PathBuf> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            if current.join(CONFIG_FILE_NAME).exists() {
                return Some(current);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
