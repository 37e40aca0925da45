//! In-process store used for tests and database-less runs.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use crate::domain::aggregates::{Artwork, Cart, CommunityEvent, Order, User};
use crate::store::{ArtworkFilter, CartStore, CatalogStore, CommunityStore, OrderStore, Settled, UserStore, UserWrite};
use crate::{MarketError, Result};

#[derive(Default)]
struct Inner {
    artworks: Vec<Artwork>,
    carts: HashMap<Uuid, Cart>,
    orders: Vec<Order>,
    users: Vec<User>,
    favorites: HashMap<Uuid, Vec<Uuid>>,
    community_events: Vec<CommunityEvent>,
}

/// All collections sit behind one lock, so settlement is atomic.
#[derive(Default)]
pub struct MemoryStore { inner: Mutex<Inner> }

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| MarketError::StorageError("memory store poisoned".into()))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn artwork(&self, id: Uuid) -> Result<Option<Artwork>> {
        Ok(self.lock()?.artworks.iter().find(|a| a.id == id).cloned())
    }

    async fn artworks(&self, ids: &[Uuid]) -> Result<Vec<Artwork>> {
        Ok(self.lock()?.artworks.iter().filter(|a| ids.contains(&a.id)).cloned().collect())
    }

    async fn list_artworks(&self, filter: &ArtworkFilter) -> Result<Vec<Artwork>> {
        let mut found: Vec<Artwork> = self.lock()?.artworks.iter().filter(|a| filter.matches(a)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn insert_artwork(&self, artwork: &Artwork) -> Result<()> {
        self.lock()?.artworks.push(artwork.clone());
        Ok(())
    }

    async fn update_artwork(&self, artwork: &Artwork) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.artworks.iter_mut().find(|a| a.id == artwork.id) {
            Some(slot) => { *slot = artwork.clone(); Ok(true) }
            None => Ok(false),
        }
    }

    async fn delete_artwork(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.artworks.len();
        inner.artworks.retain(|a| a.id != id);
        Ok(inner.artworks.len() < before)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
        Ok(self.lock()?.carts.get(&user_id).map(|c| {
            Cart::restore(c.id(), c.user_id(), c.items().to_vec(), c.created_at(), c.updated_at())
        }))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        let stored = Cart::restore(cart.id(), cart.user_id(), cart.items().to_vec(), cart.created_at(), cart.updated_at());
        self.lock()?.carts.insert(cart.user_id(), stored);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let mut found: Vec<Order> = self.lock()?.orders.iter().filter(|o| o.user_id() == user_id).cloned().collect();
        found.sort_by(|a, b| b.date().cmp(&a.date()));
        Ok(found)
    }

    async fn order_by_payment(&self, reference: &str) -> Result<Option<Order>> {
        Ok(self.lock()?.orders.iter().find(|o| o.payment_reference() == Some(reference)).cloned())
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.lock()?.orders.push(order.clone());
        Ok(())
    }

    async fn settle(&self, order: &Order, consumed: &[Uuid]) -> Result<Settled> {
        let mut inner = self.lock()?;
        if let Some(reference) = order.payment_reference() {
            if let Some(existing) = inner.orders.iter().find(|o| o.payment_reference() == Some(reference)) {
                return Ok(Settled::Duplicate(existing.clone()));
            }
        }

        let mut oversold = Vec::new();
        for line in order.artworks() {
            if let Some(artwork) = inner.artworks.iter_mut().find(|a| a.id == line.artwork_id) {
                if artwork.take_stock(line.quantity) > 0 { oversold.push(artwork.id); }
            }
        }
        if let Some(cart) = inner.carts.get_mut(&order.user_id()) {
            cart.remove_settled(consumed);
        }
        inner.orders.push(order.clone());
        Ok(Settled::Placed { oversold })
    }

    async fn revenue(&self) -> Result<(Decimal, i64)> {
        let inner = self.lock()?;
        let total = inner.orders.iter().map(Order::total).sum();
        Ok((total, inner.orders.len() as i64))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<bool> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == user.email || u.username == user.username) { return Ok(false); }
        inner.users.push(user.clone());
        Ok(true)
    }

    async fn update_user(&self, user: &User) -> Result<UserWrite> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.id != user.id && (u.email == user.email || u.username == user.username)) {
            return Ok(UserWrite::Conflict);
        }
        match inner.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => { *slot = user.clone(); Ok(UserWrite::Saved) }
            None => Ok(UserWrite::Missing),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        inner.favorites.remove(&id);
        Ok(inner.users.len() < before)
    }

    async fn toggle_favorite(&self, user_id: Uuid, artwork_id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        let favorites = inner.favorites.entry(user_id).or_default();
        match favorites.iter().position(|id| *id == artwork_id) {
            Some(at) => { favorites.remove(at); Ok(false) }
            None => { favorites.push(artwork_id); Ok(true) }
        }
    }

    async fn favorites(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self.lock()?.favorites.get(&user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CommunityStore for MemoryStore {
    async fn community_events(&self) -> Result<Vec<CommunityEvent>> {
        let mut events = self.lock()?.community_events.clone();
        events.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(events)
    }

    async fn community_event(&self, id: Uuid) -> Result<Option<CommunityEvent>> {
        Ok(self.lock()?.community_events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_community_event(&self, event: &CommunityEvent) -> Result<()> {
        self.lock()?.community_events.push(event.clone());
        Ok(())
    }

    async fn update_community_event(&self, event: &CommunityEvent) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.community_events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => { *slot = event.clone(); Ok(true) }
            None => Ok(false),
        }
    }

    async fn delete_community_event(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.community_events.len();
        inner.community_events.retain(|e| e.id != id);
        Ok(inner.community_events.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::artwork::sample;
    use crate::domain::value_objects::Quantity;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_settle_is_idempotent_per_payment_reference() {
        let store = MemoryStore::new();
        let a = sample(100, 5);
        store.insert_artwork(&a).await.unwrap();
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, Quantity::new(2).unwrap()).unwrap();
        store.save_cart(&cart).await.unwrap();

        let order = Order::settle(&cart.resolve(&HashMap::from([(a.id, a.clone())])), Some("cs_9".into()));
        assert_eq!(store.settle(&order, &[a.id]).await.unwrap(), Settled::Placed { oversold: vec![] });
        assert!(matches!(store.settle(&order, &[a.id]).await.unwrap(), Settled::Duplicate(o) if o.id() == order.id()));

        assert_eq!(store.artwork(a.id).await.unwrap().unwrap().stock, 3);
        assert!(store.cart(cart.user_id()).await.unwrap().unwrap().is_empty());
        assert_eq!(store.revenue().await.unwrap(), (Decimal::from(200), 1));
    }

    #[tokio::test]
    async fn test_settle_keeps_lines_added_after_snapshot() {
        let store = MemoryStore::new();
        let a = sample(100, 5);
        let b = sample(40, 5);
        store.insert_artwork(&a).await.unwrap();
        store.insert_artwork(&b).await.unwrap();
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, Quantity::one()).unwrap();
        let order = Order::settle(&cart.resolve(&HashMap::from([(a.id, a.clone())])), None);

        cart.add_item(&b, Quantity::one()).unwrap();
        store.save_cart(&cart).await.unwrap();
        store.settle(&order, &[a.id]).await.unwrap();

        let left = store.cart(cart.user_id()).await.unwrap().unwrap();
        assert_eq!(left.items().len(), 1);
        assert_eq!(left.items()[0].artwork_id, b.id);
        assert_eq!(store.artwork(b.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_duplicate_users_rejected() {
        let store = MemoryStore::new();
        assert!(store.insert_user(&User::register("ana", "ana@example.com", "h".into(), None)).await.unwrap());
        assert!(!store.insert_user(&User::register("ana2", "ANA@example.com", "h".into(), None)).await.unwrap());
        assert!(store.user_by_email("Ana@Example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_user_update_conflicts_and_favorites() {
        let store = MemoryStore::new();
        let ana = User::register("ana", "ana@example.com", "h".into(), None);
        let mut bo = User::register("bo", "bo@example.com", "h".into(), None);
        store.insert_user(&ana).await.unwrap();
        store.insert_user(&bo).await.unwrap();

        bo.email = "ana@example.com".into();
        assert_eq!(store.update_user(&bo).await.unwrap(), UserWrite::Conflict);
        bo.email = "bo@studio.example".into();
        assert_eq!(store.update_user(&bo).await.unwrap(), UserWrite::Saved);

        let artwork = Uuid::new_v4();
        assert!(store.toggle_favorite(bo.id, artwork).await.unwrap());
        assert_eq!(store.favorites(bo.id).await.unwrap(), vec![artwork]);
        assert!(!store.toggle_favorite(bo.id, artwork).await.unwrap());
        assert!(store.favorites(bo.id).await.unwrap().is_empty());

        store.toggle_favorite(bo.id, artwork).await.unwrap();
        assert!(store.delete_user(bo.id).await.unwrap());
        assert!(store.favorites(bo.id).await.unwrap().is_empty());
        assert_eq!(store.update_user(&bo).await.unwrap(), UserWrite::Missing);
    }
}
