//! Registration and login.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
use crate::auth::{hash_password, verify_password, TokenKeys};
use crate::domain::aggregates::{User, UserType};
use crate::store::MarketStore;
use crate::{MarketError, Result};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A signed token and the user it was issued to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn MarketStore>,
    tokens: TokenKeys,
}

impl Accounts {
    pub fn new(store: Arc<dyn MarketStore>, tokens: TokenKeys) -> Self { Self { store, tokens } }

    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        req.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        if self.store.user_by_email(&req.email).await?.is_some() { return Err(MarketError::UserExists); }
        let user = User::register(&req.username, &req.email, hash_password(&req.password)?, req.user_type);
        if !self.store.insert_user(&user).await? { return Err(MarketError::UserExists); }
        tracing::info!(user_id = %user.id, user_type = ?user.user_type, "User registered");
        Ok(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<Session> {
        req.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        let user = self.store.user_by_email(&req.email).await?.ok_or(MarketError::InvalidCredentials)?;
        if !verify_password(&req.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "Login rejected");
            return Err(MarketError::InvalidCredentials);
        }
        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Session { token, user })
    }

    /// Creates the admin account unless the email is already registered.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<()> {
        if self.store.user_by_email(email).await?.is_some() { return Ok(()); }
        let admin = User::admin("admin", email, hash_password(password)?);
        if self.store.insert_user(&admin).await? {
            tracing::info!(user_id = %admin.id, "Admin account created");
        }
        Ok(())
    }

    pub fn tokens(&self) -> &TokenKeys { &self.tokens }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Role;
    use crate::store::MemoryStore;

    fn accounts() -> Accounts { Accounts::new(Arc::new(MemoryStore::new()), TokenKeys::new("secret", 60)) }

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest { username: "ana".into(), email: email.into(), password: "hunter22".into(), user_type: Some(UserType::Seller) }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let accounts = accounts();
        let user = accounts.register(register("ana@example.com")).await.unwrap();
        assert!(user.is_seller());

        let session = accounts.login(LoginRequest { email: "ANA@example.com".into(), password: "hunter22".into() }).await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(accounts.tokens().verify(&session.token).unwrap().sub, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_and_bad_credentials() {
        let accounts = accounts();
        accounts.register(register("ana@example.com")).await.unwrap();
        assert!(matches!(accounts.register(register("ana@example.com")).await, Err(MarketError::UserExists)));

        let wrong = LoginRequest { email: "ana@example.com".into(), password: "nope-nope".into() };
        assert!(matches!(accounts.login(wrong).await, Err(MarketError::InvalidCredentials)));
        let unknown = LoginRequest { email: "bo@example.com".into(), password: "hunter22".into() };
        assert!(matches!(accounts.login(unknown).await, Err(MarketError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_invalid_fields_rejected() {
        let mut req = register("not-an-email");
        assert!(matches!(accounts().register(req.clone()).await, Err(MarketError::Validation(_))));
        req.email = "ana@example.com".into();
        req.password = "123".into();
        assert!(matches!(accounts().register(req).await, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let accounts = accounts();
        accounts.ensure_admin("root@example.com", "rootpass").await.unwrap();
        accounts.ensure_admin("root@example.com", "rootpass").await.unwrap();
        let session = accounts.login(LoginRequest { email: "root@example.com".into(), password: "rootpass".into() }).await.unwrap();
        assert_eq!(session.user.role, Role::Admin);
    }
}
