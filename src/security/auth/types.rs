// Authentication Types and Core Structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 認証エラー型
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Invalid password hash for {0}")]
    InvalidHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::UserNotFound(_) => (StatusCode::NOT_FOUND, "User not found"),
            AuthError::UserAlreadyExists(_) => (StatusCode::CONFLICT, "User already exists"),
            AuthError::EmptyPassword => (StatusCode::BAD_REQUEST, "Password must not be empty"),
            AuthError::InvalidHash(_) | AuthError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// 認証結果型
pub type AuthResult<T> = Result<T, AuthError>;

/// 認証済みユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// ユーザー名
    pub username: String,
}

impl AuthUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// ログインフォームの入力
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Trimmed username and password, or `None` if either is blank
    pub fn normalized(&self) -> Option<(&str, &str)> {
        let username = self.username.trim();
        let password = self.password.trim();
        if username.is_empty() || password.is_empty() {
            None
        } else {
            Some((username, password))
        }
    }
}

/// パスワードハッシャー (Argon2id, PHC文字列)
#[derive(Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// パスワードをハッシュ化
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        use argon2::{
            password_hash::{PasswordHasher as _, SaltString},
            Argon2,
        };

        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// パスワードを検証
    pub fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        use argon2::{
            password_hash::{PasswordHash, PasswordVerifier},
            Argon2,
        };

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Whether `hash` parses as a PHC string
    pub fn is_valid_hash(hash: &str) -> bool {
        argon2::password_hash::PasswordHash::new(hash).is_ok()
    }
}
