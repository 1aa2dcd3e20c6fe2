//! LLM統合システム
//!
//! ダッシュボードのチャット欄から受け取ったメッセージを外部の生成AI
//! (Gemini generateContent) に中継します。

pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use client::LlmClient;
pub use config::{LlmConfig, LlmProvider};
pub use error::{LlmError, LlmResult};
pub use types::{LlmRequest, LlmResponse};
