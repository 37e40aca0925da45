//! User profiles and favorites.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
use crate::auth::{hash_password, verify_password};
use crate::domain::aggregates::{Artwork, User};
use crate::service::load_catalog;
use crate::store::{MarketStore, UserWrite};
use crate::{MarketError, Result};

/// The caller's own account with favorite artwork ids.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub favorites: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current: String,
    #[serde(rename = "new")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Clone)]
pub struct Profiles { store: Arc<dyn MarketStore> }

impl Profiles {
    pub fn new(store: Arc<dyn MarketStore>) -> Self { Self { store } }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.store.user(id).await?.ok_or(MarketError::UserNotFound(id))
    }

    pub async fn me(&self, id: Uuid) -> Result<Profile> {
        let user = self.get(id).await?;
        let favorites = self.store.favorites(id).await?;
        Ok(Profile { user, favorites })
    }

    pub async fn update(&self, id: Uuid, update: ProfileUpdate) -> Result<User> {
        update.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        let mut user = self.get(id).await?;
        user.update_profile(update.username.as_deref(), update.email.as_deref());
        self.save(&user).await?;
        tracing::info!(user_id = %id, "Profile updated");
        Ok(user)
    }

    pub async fn change_password(&self, id: Uuid, change: PasswordChange) -> Result<()> {
        change.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        let mut user = self.get(id).await?;
        if !verify_password(&change.current, &user.password_hash) {
            tracing::info!(user_id = %id, "Password change rejected");
            return Err(MarketError::Validation("Current password incorrect".into()));
        }
        user.password_hash = hash_password(&change.new_password)?;
        self.save(&user).await?;
        tracing::info!(user_id = %id, "Password updated");
        Ok(())
    }

    /// Orders stay on record; favorites go with the account.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_user(id).await? { return Err(MarketError::UserNotFound(id)); }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Returns whether the artwork is a favorite afterwards. Only listed
    /// artworks can be added; a removed artwork can still be unfavorited.
    pub async fn toggle_favorite(&self, user_id: Uuid, artwork_id: Uuid) -> Result<bool> {
        self.get(user_id).await?;
        let current = self.store.favorites(user_id).await?;
        if !current.contains(&artwork_id) && self.store.artwork(artwork_id).await?.is_none() {
            return Err(MarketError::ArtworkNotFound(artwork_id));
        }
        let favorited = self.store.toggle_favorite(user_id, artwork_id).await?;
        tracing::info!(user_id = %user_id, artwork_id = %artwork_id, favorited, "Favorite toggled");
        Ok(favorited)
    }

    /// Favorite artworks still in the catalog, in the order they were added.
    pub async fn favorites(&self, user_id: Uuid) -> Result<Vec<Artwork>> {
        let ids = self.store.favorites(user_id).await?;
        let mut catalog = load_catalog(&*self.store, &ids).await?;
        Ok(ids.iter().filter_map(|id| catalog.remove(id)).collect())
    }

    async fn save(&self, user: &User) -> Result<()> {
        match self.store.update_user(user).await? {
            UserWrite::Saved => Ok(()),
            UserWrite::Missing => Err(MarketError::UserNotFound(user.id)),
            UserWrite::Conflict => Err(MarketError::UserExists),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::artwork::sample;
    use crate::store::{CatalogStore, MemoryStore, UserStore};

    async fn profiles_with(password: &str) -> (Profiles, Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let user = User::register("ana", "ana@example.com", hash_password(password).unwrap(), None);
        store.insert_user(&user).await.unwrap();
        (Profiles::new(store.clone()), store, user)
    }

    #[tokio::test]
    async fn test_update_and_conflict() {
        let (profiles, store, ana) = profiles_with("hunter22").await;
        store.insert_user(&User::register("bo", "bo@example.com", "h".into(), None)).await.unwrap();

        let renamed = profiles.update(ana.id, ProfileUpdate { username: Some("ana_r".into()), email: None }).await.unwrap();
        assert_eq!(renamed.username, "ana_r");
        assert_eq!(renamed.email, "ana@example.com");

        let taken = ProfileUpdate { username: None, email: Some("BO@example.com".into()) };
        assert!(matches!(profiles.update(ana.id, taken).await, Err(MarketError::UserExists)));
        let bad = ProfileUpdate { username: None, email: Some("nope".into()) };
        assert!(matches!(profiles.update(ana.id, bad).await, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn test_password_change_requires_current() {
        let (profiles, store, ana) = profiles_with("hunter22").await;
        let wrong = PasswordChange { current: "guess-guess".into(), new_password: "newpass1".into() };
        assert!(matches!(profiles.change_password(ana.id, wrong).await, Err(MarketError::Validation(_))));

        let right = PasswordChange { current: "hunter22".into(), new_password: "newpass1".into() };
        profiles.change_password(ana.id, right).await.unwrap();
        let stored = store.user(ana.id).await.unwrap().unwrap();
        assert!(verify_password("newpass1", &stored.password_hash));
        assert!(!verify_password("hunter22", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_favorites_toggle_and_skip_removed() {
        let (profiles, store, ana) = profiles_with("hunter22").await;
        let kept = sample(100, 1);
        let gone = sample(50, 1);
        store.insert_artwork(&kept).await.unwrap();
        store.insert_artwork(&gone).await.unwrap();

        assert!(profiles.toggle_favorite(ana.id, gone.id).await.unwrap());
        assert!(profiles.toggle_favorite(ana.id, kept.id).await.unwrap());
        store.delete_artwork(gone.id).await.unwrap();

        assert_eq!(profiles.favorites(ana.id).await.unwrap(), vec![kept.clone()]);
        assert_eq!(profiles.me(ana.id).await.unwrap().favorites, vec![gone.id, kept.id]);
        assert!(!profiles.toggle_favorite(ana.id, gone.id).await.unwrap());
        assert!(matches!(profiles.toggle_favorite(ana.id, gone.id).await, Err(MarketError::ArtworkNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_account() {
        let (profiles, _store, ana) = profiles_with("hunter22").await;
        profiles.delete(ana.id).await.unwrap();
        assert!(matches!(profiles.get(ana.id).await, Err(MarketError::UserNotFound(_))));
        assert!(matches!(profiles.delete(ana.id).await, Err(MarketError::UserNotFound(_))));
    }
}
