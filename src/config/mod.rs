//! Configuration for the dashboard server
//!
//! Layered loading (defaults, TOML file, environment, CLI) lives in
//! [`ConfigLoader`]; the structs themselves are in [`types`].

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, AuthConfig, LoggingConfig, ModelConfig, ServerConfig, UserCredential};

use anyhow::{Context, Result};
use std::path::Path;

impl AppConfig {
    /// Render an annotated sample configuration file
    pub fn sample_toml() -> Result<String> {
        let sample = AppConfig::default();
        let toml_content =
            toml::to_string_pretty(&sample).context("Failed to render sample configuration")?;

        Ok(format!(
            r#"# surveil-rs configuration file
#
# Save as surveil-rs.toml (or config/surveil-rs.toml), or pass --config.
# Every key can be overridden from the environment, e.g.
#   SURVEIL__SERVER__BIND_ADDR=0.0.0.0:5000
#   SURVEIL__LLM__API_KEY=...        (or GEMINI_API_KEY)
#   SURVEIL__AUTH__COOKIE_SECRET=... (64+ bytes)

{}
# Accounts:
#
# [[auth.users]]
# username = "admin"
# password_hash = "<output of `surveil-rs hash-password <password>`>"
#
# With no users configured the server seeds a development account
# (admin / password123) and logs a warning at startup.
"#,
            toml_content
        ))
    }

    /// Write the sample configuration to `path`
    pub fn write_sample(path: &Path) -> Result<()> {
        let content = Self::sample_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
