//! Cart engine.

use std::sync::Arc;
use uuid::Uuid;
use crate::domain::aggregates::{Cart, ResolvedCart};
use crate::domain::value_objects::Quantity;
use crate::publisher::{publish_all, EventPublisher};
use crate::service::resolve_cart;
use crate::store::MarketStore;
use crate::{MarketError, Result};

#[derive(Clone)]
pub struct CartEngine {
    store: Arc<dyn MarketStore>,
    events: Arc<dyn EventPublisher>,
}

impl CartEngine {
    pub fn new(store: Arc<dyn MarketStore>, events: Arc<dyn EventPublisher>) -> Self { Self { store, events } }

    /// Adds to the user's cart, creating it on first use.
    pub async fn add_item(&self, user_id: Uuid, artwork_id: Uuid, quantity: Quantity) -> Result<ResolvedCart> {
        let artwork = self.store.artwork(artwork_id).await?.ok_or(MarketError::ArtworkNotFound(artwork_id))?;
        let mut cart = match self.store.cart(user_id).await? {
            Some(cart) => cart,
            None => Cart::for_user(user_id),
        };
        cart.add_item(&artwork, quantity).inspect_err(|e| {
            tracing::info!(user_id = %user_id, artwork_id = %artwork_id, quantity = %quantity, error = %e, "Add to cart rejected");
        })?;
        tracing::info!(user_id = %user_id, artwork_id = %artwork_id, quantity = %quantity, "Item added to cart");
        self.commit(cart).await
    }

    /// Replaces an item's quantity. The artwork must still be listed.
    pub async fn set_quantity(&self, user_id: Uuid, artwork_id: Uuid, quantity: Quantity) -> Result<ResolvedCart> {
        let mut cart = self.load(user_id).await?;
        if cart.item(artwork_id).is_none() { return Err(MarketError::ItemNotInCart(artwork_id)); }
        let artwork = self.store.artwork(artwork_id).await?.ok_or(MarketError::ArtworkNotFound(artwork_id))?;
        cart.set_quantity(&artwork, quantity)?;
        tracing::info!(user_id = %user_id, artwork_id = %artwork_id, quantity = %quantity, "Cart quantity set");
        self.commit(cart).await
    }

    /// Removing an artwork that is not in the cart leaves it unchanged.
    pub async fn remove_item(&self, user_id: Uuid, artwork_id: Uuid) -> Result<ResolvedCart> {
        let mut cart = self.load(user_id).await?;
        if !cart.remove_item(artwork_id) {
            return resolve_cart(&*self.store, &cart).await;
        }
        tracing::info!(user_id = %user_id, artwork_id = %artwork_id, "Item removed from cart");
        self.commit(cart).await
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<()> {
        let mut cart = self.load(user_id).await?;
        cart.clear();
        self.store.save_cart(&cart).await?;
        publish_all(&*self.events, cart.take_events()).await;
        tracing::info!(user_id = %user_id, "Cart cleared");
        Ok(())
    }

    pub async fn get(&self, user_id: Uuid) -> Result<ResolvedCart> {
        let cart = self.load(user_id).await?;
        resolve_cart(&*self.store, &cart).await
    }

    async fn load(&self, user_id: Uuid) -> Result<Cart> {
        self.store.cart(user_id).await?.ok_or(MarketError::CartNotFound(user_id))
    }

    async fn commit(&self, mut cart: Cart) -> Result<ResolvedCart> {
        self.store.save_cart(&cart).await?;
        publish_all(&*self.events, cart.take_events()).await;
        resolve_cart(&*self.store, &cart).await
    }
}
