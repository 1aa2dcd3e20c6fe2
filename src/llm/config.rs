//! LLM統合の設定

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-pro";

/// LLMプロバイダー
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini (generateContent)
    #[default]
    Gemini,
}

/// LLM設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// プロバイダー
    #[serde(default)]
    pub provider: LlmProvider,
    /// APIキー（セキュア）
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,
    /// APIエンドポイント
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// デフォルトモデル
    #[serde(default = "default_model")]
    pub default_model: String,
    /// リクエストタイムアウト（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    GEMINI_ENDPOINT.to_string()
}

fn default_model() -> String {
    GEMINI_DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl LlmConfig {
    /// Gemini設定を作成
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            endpoint: default_endpoint(),
            default_model: model.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// エンドポイントを変更
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// タイムアウトを取得
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// APIキーを取得（露出）
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .filter(|k| !k.trim().is_empty())
    }

    /// Whether a provider can be built from this configuration
    pub fn is_configured(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// 設定を検証
    pub fn validate(&self) -> LlmResult<()> {
        match self.provider {
            LlmProvider::Gemini => {
                if self.get_api_key().is_none() {
                    return Err(LlmError::ConfigError(
                        "API key is required for Gemini".to_string(),
                    ));
                }
            }
        }

        if self.endpoint.trim().is_empty() {
            return Err(LlmError::ConfigError("Endpoint must not be empty".to_string()));
        }

        if self.default_model.trim().is_empty() {
            return Err(LlmError::ConfigError("Model must not be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(LlmError::ConfigError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            endpoint: default_endpoint(),
            default_model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}
