//! LLMクライアント
//!
//! Thin handle over the configured provider, cheap to clone into handler
//! state.

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    providers::{create_provider, LlmProvider},
    types::{LlmRequest, LlmResponse},
};
use std::sync::Arc;
use tracing::debug;

/// LLMクライアント
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LlmProvider>,
    config: LlmConfig,
}

impl LlmClient {
    /// 新しいクライアントを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;
        let provider = create_provider(&config)?;

        Ok(Self {
            provider: Arc::from(provider),
            config,
        })
    }

    /// 任意のプロバイダーでクライアントを作成
    pub fn with_provider(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// 設定を取得
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// 完了リクエストを送信
    pub async fn complete(&self, request: LlmRequest) -> LlmResult<LlmResponse> {
        self.provider.complete(&request).await
    }

    /// Send one user prompt and return the reply text
    pub async fn complete_text(&self, prompt: impl Into<String>) -> LlmResult<String> {
        let response = self.complete(LlmRequest::new(prompt)).await?;
        debug!(
            model = %response.model,
            finish_reason = response.finish_reason.as_deref().unwrap_or("-"),
            "Reply received"
        );
        Ok(response.content)
    }

    /// プロバイダー名を取得
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
