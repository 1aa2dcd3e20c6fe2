// Authentication Module
//
// ログインフォーム用の資格情報ストア
// - Argon2 パスワードハッシュ
// - ユーザーリポジトリ (In-memory)

pub mod repository;
pub mod types;

pub use repository::{
    memory::{InMemoryUserRepository, DEV_PASSWORD, DEV_USERNAME},
    UserRepository,
};
pub use types::{AuthError, AuthResult, AuthUser, Credentials, PasswordHasher};
