//! HTTP handlers
//!
//! - `auth`: ログイン / ログアウト
//! - `pages`: HTML pages served from the static directory
//! - `analysis`: frame and flow inference endpoints
//! - `telemetry`: dashboard counters, alerts, host status, settings
//! - `chat`: chat relay to the configured LLM provider

pub mod analysis;
pub mod auth;
pub mod chat;
pub mod pages;
pub mod telemetry;
