use crate::config::AuthConfig;
use crate::error::SessionError;
use crate::session::storage::{MemorySessionStorage, SessionStorage};
use crate::session::types::{Session, SessionId};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// `auth.session_ttl_secs` の上限 (365日)
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// セッションマネージャー設定
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Idle timeout
    pub ttl: Duration,
    /// 期限切れセッションの削除間隔
    pub cleanup_interval: std::time::Duration,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
            cleanup_interval: std::time::Duration::from_secs(300),
        }
    }
}

impl SessionManagerConfig {
    /// Build from `[auth]`, rejecting a TTL of zero or above [`MAX_SESSION_TTL_SECS`]
    pub fn from_auth_config(auth: &AuthConfig) -> Result<Self, SessionError> {
        let secs = auth.session_ttl_secs;
        let ttl = Some(secs)
            .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .ok_or(SessionError::InvalidTtl(secs))?;

        Ok(Self {
            ttl,
            cleanup_interval: std::time::Duration::from_secs(auth.cleanup_interval_secs.max(1)),
        })
    }
}

#[derive(Debug)]
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    config: SessionManagerConfig,
}

impl SessionManager {
    pub fn new(config: SessionManagerConfig) -> Self {
        Self::with_storage(Arc::new(MemorySessionStorage::new()), config)
    }

    pub fn with_storage(storage: Arc<dyn SessionStorage>, config: SessionManagerConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &SessionManagerConfig {
        &self.config
    }

    /// ログイン成功時にセッションを作成
    pub async fn create_session(&self, username: &str) -> Result<Session, SessionError> {
        let session = self.storage.create(Session::new(username, self.config.ttl)).await?;
        info!(session_id = %session.id, username, "Session created");
        Ok(session)
    }

    pub async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        self.storage.get(id).await
    }

    /// Look up a session for an incoming request.
    ///
    /// Returns `None` for unknown or expired sessions. Expired sessions are
    /// removed on the spot; a live one has its deadline pushed out.
    pub async fn validate(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let Some(mut session) = self.storage.get(id).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            debug!(session_id = %id, "Session expired");
            self.storage.delete(id).await?;
            return Ok(None);
        }

        session.touch(self.config.ttl);
        let session = self.storage.update(session).await?;
        Ok(Some(session))
    }

    pub async fn delete_session(&self, id: &SessionId) -> Result<bool, SessionError> {
        let removed = self.storage.delete(id).await?;
        if removed {
            info!(session_id = %id, "Session destroyed");
        }
        Ok(removed)
    }

    pub async fn purge_expired(&self) -> Result<usize, SessionError> {
        self.storage.purge_expired(Utc::now()).await
    }

    /// 期限切れセッションの定期削除タスクを開始
    pub fn start_cleanup_task(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let period = manager.config.cleanup_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // 初回の即時tickを消費
            interval.tick().await;

            loop {
                interval.tick().await;
                match manager.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => debug!(purged, "Expired sessions purged"),
                    Err(e) => warn!(error = %e, "Session cleanup failed"),
                }
            }
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionManagerConfig::default())
    }
}
