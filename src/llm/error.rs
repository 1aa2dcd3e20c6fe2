//! LLM統合のエラー型定義

use thiserror::Error;

/// LLM統合システムのエラー型
#[derive(Error, Debug)]
pub enum LlmError {
    /// 非成功ステータス
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// 無効なリクエスト
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 応答に期待した内容が含まれない
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// ネットワークエラー
    #[error("Network error: {0}")]
    NetworkError(String),

    /// タイムアウト
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// JSONパースエラー
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// LLM統合システムの結果型
pub type LlmResult<T> = Result<T, LlmError>;
