//! # surveil-rs
//!
//! Session-gated surveillance dashboard server.
//!
//! - フレーム異常検知: an autoencoder scores uploaded frames by
//!   reconstruction error
//! - Network-flow classification from three flow statistics
//! - Dashboard telemetry, settings and a chat relay to Gemini
//!
//! The binary wires these together through [`http_server::build_router`].

pub mod config;
pub mod detection;
pub mod error;
pub mod handlers;
pub mod http_server;
pub mod llm;
pub mod logging;
pub mod monitoring;
pub mod security;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, Error, Result};
pub use http_server::{build_router, serve, AppState};
pub use session::{Session, SessionId, SessionManager};
