//! User Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { Admin, #[default] User }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType { #[default] Buyer, Seller }

impl Role {
    pub fn as_str(&self) -> &'static str { match self { Self::Admin => "admin", Self::User => "user" } }
    pub fn parse(s: &str) -> Option<Self> { match s { "admin" => Some(Self::Admin), "user" => Some(Self::User), _ => None } }
}

impl UserType {
    pub fn as_str(&self) -> &'static str { match self { Self::Buyer => "buyer", Self::Seller => "seller" } }
    pub fn parse(s: &str) -> Option<Self> { match s { "buyer" => Some(Self::Buyer), "seller" => Some(Self::Seller), _ => None } }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    /// Only regular users carry a buyer/seller type.
    pub user_type: Option<UserType>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn register(username: &str, email: &str, password_hash: String, user_type: Option<UserType>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role: Role::User,
            user_type: Some(user_type.unwrap_or_default()),
            created_at: Utc::now(),
        }
    }

    pub fn admin(username: &str, email: &str, password_hash: String) -> Self {
        Self { role: Role::Admin, user_type: None, ..Self::register(username, email, password_hash, None) }
    }

    /// Applies a username and/or email change with the same normalization as registration.
    pub fn update_profile(&mut self, username: Option<&str>, email: Option<&str>) {
        if let Some(v) = username { self.username = v.trim().to_string(); }
        if let Some(v) = email { self.email = v.trim().to_lowercase(); }
    }

    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
    pub fn is_seller(&self) -> bool { self.user_type == Some(UserType::Seller) }
}
