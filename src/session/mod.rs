//! Session tracking for the dashboard
//!
//! サーバー側で保持するセッションと、署名付きクッキーによるゲート。
//!
//! # Features
//!
//! - **Memory Storage**: `SessionStorage` trait with an in-memory backend
//! - **Idle Timeout**: expiry enforced on read, deadline pushed out on use
//! - **Auto Cleanup**: 期限切れセッションの自動削除
//! - **Gate Middleware**: unauthenticated requests are redirected to `/login`

pub mod manager;
pub mod middleware;
pub mod storage;
pub mod types;

// 公開API
pub use crate::error::SessionError;
pub use manager::{SessionManager, SessionManagerConfig, MAX_SESSION_TTL_SECS};
pub use middleware::{require_session, CurrentUser, SessionGate, LOGIN_PATH};
pub use storage::{MemorySessionStorage, SessionStorage};
pub use types::{Session, SessionId};
