use crate::error::SessionError;
use crate::session::types::{Session, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    async fn create(&self, session: Session) -> Result<Session, SessionError>;
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionError>;
    async fn update(&self, session: Session) -> Result<Session, SessionError>;
    async fn delete(&self, id: &SessionId) -> Result<bool, SessionError>;
    /// Remove every session whose deadline is at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionError>;
}

#[derive(Debug)]
pub struct MemorySessionStorage {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn create(&self, session: Session) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn update(&self, session: Session) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(SessionError::NotFound(session.id.to_string()));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(id).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before - sessions.len())
    }
}
