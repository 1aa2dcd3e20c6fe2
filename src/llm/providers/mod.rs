//! LLMプロバイダー実装

pub mod gemini;

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    types::{LlmRequest, LlmResponse},
};
use async_trait::async_trait;

pub use gemini::GeminiProvider;

/// LLMプロバイダートレイト
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// 通常の完了リクエスト
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;

    /// プロバイダー名を取得
    fn name(&self) -> &str;
}

/// プロバイダーファクトリー
pub fn create_provider(config: &LlmConfig) -> LlmResult<Box<dyn LlmProvider>> {
    use crate::llm::config::LlmProvider as ProviderType;

    match config.provider {
        ProviderType::Gemini => Ok(Box::new(GeminiProvider::new(config.clone())?)),
    }
}
