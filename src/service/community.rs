//! Community event board. Anyone may read it; only admins edit it.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
use crate::auth::Claims;
use crate::domain::aggregates::{CommunityEvent, CommunityEventUpdate, NewCommunityEvent};
use crate::store::MarketStore;
use crate::{MarketError, Result};

#[derive(Clone)]
pub struct Community { store: Arc<dyn MarketStore> }

impl Community {
    pub fn new(store: Arc<dyn MarketStore>) -> Self { Self { store } }

    /// Soonest first.
    pub async fn list(&self) -> Result<Vec<CommunityEvent>> {
        self.store.community_events().await
    }

    pub async fn get(&self, id: Uuid) -> Result<CommunityEvent> {
        self.store.community_event(id).await?.ok_or(MarketError::CommunityEventNotFound(id))
    }

    pub async fn create(&self, caller: &Claims, new: NewCommunityEvent) -> Result<CommunityEvent> {
        ensure_admin(caller)?;
        new.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        let event = CommunityEvent::schedule(new);
        self.store.insert_community_event(&event).await?;
        tracing::info!(event_id = %event.id, date = %event.date, by = %caller.sub, "Community event created");
        Ok(event)
    }

    pub async fn update(&self, caller: &Claims, id: Uuid, update: CommunityEventUpdate) -> Result<CommunityEvent> {
        ensure_admin(caller)?;
        update.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        let mut event = self.get(id).await?;
        event.apply(update);
        if !self.store.update_community_event(&event).await? { return Err(MarketError::CommunityEventNotFound(id)); }
        tracing::info!(event_id = %id, by = %caller.sub, "Community event updated");
        Ok(event)
    }

    pub async fn delete(&self, caller: &Claims, id: Uuid) -> Result<()> {
        ensure_admin(caller)?;
        if !self.store.delete_community_event(id).await? { return Err(MarketError::CommunityEventNotFound(id)); }
        tracing::info!(event_id = %id, by = %caller.sub, "Community event deleted");
        Ok(())
    }
}

fn ensure_admin(caller: &Claims) -> Result<()> {
    if caller.is_admin() { Ok(()) } else { Err(MarketError::Forbidden("Only admins manage events".into())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Role, UserType};
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn claims(role: Role) -> Claims {
        Claims { sub: Uuid::new_v4(), username: "u".into(), role, user_type: Some(UserType::Buyer), exp: 0, iat: 0 }
    }

    fn event(title: &str, in_days: i64) -> NewCommunityEvent {
        NewCommunityEvent {
            title: title.into(),
            location: "Old Mill".into(),
            date: Utc::now() + Duration::days(in_days),
            description: "Prints and posters".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_listed_soonest_first() {
        let board = Community::new(Arc::new(MemoryStore::new()));
        let admin = claims(Role::Admin);
        board.create(&admin, event("Later", 30)).await.unwrap();
        board.create(&admin, event("Sooner", 2)).await.unwrap();

        let titles: Vec<String> = board.list().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn test_only_admins_edit() {
        let board = Community::new(Arc::new(MemoryStore::new()));
        let admin = claims(Role::Admin);
        let user = claims(Role::User);
        assert!(matches!(board.create(&user, event("Fair", 1)).await, Err(MarketError::Forbidden(_))));

        let created = board.create(&admin, event("Fair", 1)).await.unwrap();
        let rename = CommunityEventUpdate { title: Some("Print Fair".into()), ..Default::default() };
        assert!(matches!(board.update(&user, created.id, rename.clone()).await, Err(MarketError::Forbidden(_))));
        assert_eq!(board.update(&admin, created.id, rename).await.unwrap().title, "Print Fair");

        board.delete(&admin, created.id).await.unwrap();
        assert!(matches!(board.get(created.id).await, Err(MarketError::CommunityEventNotFound(_))));
        assert!(matches!(board.delete(&admin, created.id).await, Err(MarketError::CommunityEventNotFound(_))));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let board = Community::new(Arc::new(MemoryStore::new()));
        let mut bad = event("Fair", 1);
        bad.location = String::new();
        assert!(matches!(board.create(&claims(Role::Admin), bad).await, Err(MarketError::Validation(_))));
    }
}
