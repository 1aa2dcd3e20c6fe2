use crate::security::auth::types::{AuthError, AuthUser};
use async_trait::async_trait;

/// ユーザーリポジトリのトレイト
///
/// ログインフォームが参照する資格情報ストアの抽象化。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 新しいユーザーを作成
    ///
    /// # Arguments
    /// * `user` - 作成するユーザー情報
    /// * `password_hash` - Argon2 PHC文字列
    ///
    /// # Errors
    /// * ユーザー名が既に存在する場合
    async fn create_user(&self, user: &AuthUser, password_hash: String) -> Result<(), AuthError>;

    /// ユーザー名でユーザーを検索
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;

    /// パスワードを検証してユーザーを取得
    ///
    /// # Returns
    /// 認証成功時は`Some(AuthUser)`、失敗時は`None`
    ///
    /// # Security
    /// パスワードハッシュはArgon2で検証されます
    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AuthUser>, AuthError>;
}

/// In-memoryユーザーリポジトリ
pub mod memory;
