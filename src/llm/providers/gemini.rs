//! Geminiプロバイダー実装
//!
//! `POST {endpoint}/models/{model}:generateContent?key=...`

use crate::llm::{
    config::LlmConfig,
    error::{LlmError, LlmResult},
    providers::LlmProvider as LlmProviderTrait,
    types::{LlmRequest, LlmResponse},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Geminiプロバイダー
pub struct GeminiProvider {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

/// role 省略時は "user" 扱い
#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiProvider {
    /// 新しいGeminiプロバイダーを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            model
        )
    }

    /// 単一のユーザーターン
    fn build_body(prompt: &str) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }

    /// `candidates[0].content.parts[0].text`
    fn extract_reply(response: GenerateContentResponse, model: &str) -> LlmResult<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

        let content = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("Candidate has no text part".to_string()))?;

        Ok(LlmResponse {
            content,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
            finish_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProviderTrait for GeminiProvider {
    #[instrument(skip_all, fields(model = tracing::field::Empty))]
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("Empty prompt".to_string()));
        }

        let api_key = self
            .config
            .get_api_key()
            .ok_or_else(|| LlmError::ConfigError("API key is required".to_string()))?;

        let model = self.config.default_model.as_str();
        tracing::Span::current().record("model", model);

        let response = self
            .client
            .post(self.endpoint_url(model))
            .query(&[("key", api_key)])
            .json(&Self::build_body(&request.prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)?;
        debug!(candidates = parsed.candidates.len(), "Gemini response received");

        Self::extract_reply(parsed, model)
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}
