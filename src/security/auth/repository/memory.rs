use super::UserRepository;
use crate::config::AuthConfig;
use crate::security::auth::types::{AuthError, AuthUser, PasswordHasher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// 開発用アカウント (ユーザー未設定時のみ)
pub const DEV_USERNAME: &str = "admin";
pub const DEV_PASSWORD: &str = "password123";

/// In-memoryユーザーリポジトリ
///
/// 設定ファイルから読み込んだアカウントを保持する。
/// サーバー再起動時に追加されたユーザーは失われます。
#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, StoredUser>>>,
    password_hasher: PasswordHasher,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: AuthUser,
    password_hash: String,
}

impl InMemoryUserRepository {
    /// 新しいIn-memoryリポジトリを作成
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Seed from `[[auth.users]]`.
    ///
    /// Every configured hash must be a PHC string. With no users configured
    /// the development account is hashed and inserted, with a warning.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new();
        let mut users = HashMap::new();

        for credential in &config.users {
            if !PasswordHasher::is_valid_hash(&credential.password_hash) {
                return Err(AuthError::InvalidHash(credential.username.clone()));
            }
            if users.contains_key(&credential.username) {
                return Err(AuthError::UserAlreadyExists(credential.username.clone()));
            }
            users.insert(
                credential.username.clone(),
                StoredUser {
                    user: AuthUser::new(credential.username.clone()),
                    password_hash: credential.password_hash.clone(),
                },
            );
        }

        if users.is_empty() {
            warn!(
                username = DEV_USERNAME,
                "No users configured; seeding the development account. Do not run this in production"
            );
            users.insert(
                DEV_USERNAME.to_string(),
                StoredUser {
                    user: AuthUser::new(DEV_USERNAME),
                    password_hash: hasher.hash(DEV_PASSWORD)?,
                },
            );
        }

        Ok(Self {
            users: Arc::new(RwLock::new(users)),
            password_hasher: hasher,
        })
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &AuthUser, password_hash: String) -> Result<(), AuthError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(AuthError::UserAlreadyExists(user.username.clone()));
        }

        users.insert(
            user.username.clone(),
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.read().await;
        Ok(users.get(username).map(|stored| stored.user.clone()))
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.read().await;

        match users.get(username) {
            Some(stored) if self.password_hasher.verify(password, &stored.password_hash)? => {
                Ok(Some(stored.user.clone()))
            }
            _ => Ok(None),
        }
    }
}
