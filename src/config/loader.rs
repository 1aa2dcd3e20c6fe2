use super::types::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use secrecy::SecretString;

/// Configuration loader with builder pattern
///
/// Sources are layered in order: built-in defaults, configuration file,
/// `SURVEIL__SECTION__KEY` environment variables, then explicit overrides.
pub struct ConfigLoader {
    config_file: Option<String>,
    load_env: bool,
    bind_override: Option<String>,
    log_level_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
            bind_override: None,
            log_level_override: None,
        }
    }

    /// Load configuration from file
    pub fn load_from_file(mut self, path: Option<&str>) -> Self {
        self.config_file = path.map(String::from);
        self
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Override the listen address
    pub fn with_bind_addr(mut self, addr: Option<String>) -> Self {
        self.bind_override = addr;
        self
    }

    /// Override the log level
    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        self.log_level_override = level;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(config_path) = &self.config_file {
            builder = builder.add_source(File::with_name(config_path).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("surveil-rs").required(false))
                .add_source(File::with_name("config/surveil-rs").required(false));
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix("SURVEIL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let mut config: AppConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // 後方互換: GEMINI_API_KEY を直接参照
        if self.load_env && config.llm.api_key.is_none() {
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    config.llm.api_key = Some(SecretString::new(key.into_boxed_str()));
                }
            }
        }

        if let Some(addr) = self.bind_override {
            config.server.bind_addr = addr;
        }
        if let Some(level) = self.log_level_override {
            config.logging.level = level;
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
