use crate::llm::LlmConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Login and session configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Model artifact locations
    #[serde(default)]
    pub models: ModelConfig,

    /// Chat provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory holding login.html, dashboard.html and the other pages
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory holding built front-end bundles served under /dist
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
            dist_dir: default_dist_dir(),
        }
    }
}

/// Login and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session cookie name
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Secure attribute on the session cookie
    #[serde(default)]
    pub cookie_secure: bool,

    /// Cookie signing secret, at least 64 bytes. A random key is generated
    /// when unset, which invalidates every session on restart.
    #[serde(default, skip_serializing)]
    pub cookie_secret: Option<SecretString>,

    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Expired-session purge interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Accounts allowed to log in
    #[serde(default)]
    pub users: Vec<UserCredential>,
}

fn default_cookie_name() -> String {
    "surveil_session".to_string()
}

fn default_session_ttl() -> u64 {
    1800 // 30分
}

fn default_cleanup_interval() -> u64 {
    300 // 5分
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            cookie_secret: None,
            session_ttl_secs: default_session_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
            users: Vec::new(),
        }
    }
}

/// A configured account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredential {
    pub username: String,
    /// Argon2 PHC string, see `surveil-rs hash-password`
    pub password_hash: String,
}

/// Model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// ONNX export of the frame reconstruction network
    #[serde(default = "default_frame_model")]
    pub frame_model: PathBuf,

    /// JSON-serialized random forest for flow classification
    #[serde(default = "default_flow_model")]
    pub flow_model: PathBuf,
}

fn default_frame_model() -> PathBuf {
    PathBuf::from("models/border_anomaly_detector.onnx")
}

fn default_flow_model() -> PathBuf {
    PathBuf::from("models/threat_forest.json")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            frame_model: default_frame_model(),
            flow_model: default_flow_model(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write a rolling log file in addition to the console
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for rolling log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Rotation: "daily", "hourly" or "never"
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: false,
            log_dir: default_log_dir(),
            rotation: default_rotation(),
            json: false,
        }
    }
}
