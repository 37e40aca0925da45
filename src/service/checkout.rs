//! Checkout bridge: turns the stored cart into a hosted payment session.

use std::sync::Arc;
use uuid::Uuid;
use crate::payment::{CheckoutSession, LineItem, PaymentProvider};
use crate::service::resolve_cart;
use crate::store::MarketStore;
use crate::{MarketError, Result};

#[derive(Clone)]
pub struct CheckoutBridge {
    store: Arc<dyn MarketStore>,
    payments: Arc<dyn PaymentProvider>,
}

impl CheckoutBridge {
    pub fn new(store: Arc<dyn MarketStore>, payments: Arc<dyn PaymentProvider>) -> Self { Self { store, payments } }

    /// Line items come from the stored cart only. Dangling lines are dropped.
    /// The cart itself is not touched.
    pub async fn start(&self, user_id: Uuid) -> Result<CheckoutSession> {
        let cart = self.store.cart(user_id).await?.ok_or(MarketError::CartNotFound(user_id))?;
        let resolved = resolve_cart(&*self.store, &cart).await?;
        let items: Vec<LineItem> = resolved
            .resolved()
            .map(|(artwork, price, quantity)| LineItem { title: artwork.title.clone(), price, quantity: quantity.value() })
            .collect();
        if items.is_empty() { return Err(MarketError::EmptyCart); }

        let session = self.payments
            .create_checkout_session(&items, &user_id.to_string())
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Checkout session failed");
                MarketError::from(e)
            })?;
        tracing::info!(
            user_id = %user_id,
            session_id = %session.session_id,
            lines = items.len(),
            dropped = resolved.dangling_count(),
            subtotal = %resolved.subtotal,
            "Checkout started"
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::artwork::sample;
    use crate::domain::aggregates::Cart;
    use crate::domain::value_objects::Quantity;
    use crate::payment::MockPaymentProvider;
    use crate::store::{CartStore, CatalogStore, MemoryStore};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_line_items_use_snapshot_prices_and_skip_dangling() {
        let store = Arc::new(MemoryStore::new());
        let mock = Arc::new(MockPaymentProvider::new());
        let mut kept = sample(100, 5);
        let gone = sample(40, 5);
        store.insert_artwork(&kept).await.unwrap();
        let user = Uuid::new_v4();
        let mut cart = Cart::for_user(user);
        cart.add_item(&kept, Quantity::new(2).unwrap()).unwrap();
        cart.add_item(&gone, Quantity::new(1).unwrap()).unwrap();
        store.save_cart(&cart).await.unwrap();

        kept.price = Decimal::from(999);
        store.update_artwork(&kept).await.unwrap();

        let session = CheckoutBridge::new(store.clone(), mock.clone()).start(user).await.unwrap();
        let items = mock.items(&session.session_id).unwrap();
        assert_eq!(items, vec![LineItem { title: kept.title.clone(), price: Decimal::from(100), quantity: 2 }]);
        assert_eq!(store.cart(user).await.unwrap().unwrap().items().len(), 2);
    }

    #[tokio::test]
    async fn test_all_dangling_is_empty_cart() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mut cart = Cart::for_user(user);
        cart.add_item(&sample(10, 1), Quantity::one()).unwrap();
        store.save_cart(&cart).await.unwrap();

        let bridge = CheckoutBridge::new(store, Arc::new(MockPaymentProvider::new()));
        assert!(matches!(bridge.start(user).await, Err(MarketError::EmptyCart)));
        assert!(matches!(bridge.start(Uuid::new_v4()).await, Err(MarketError::CartNotFound(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let store = Arc::new(MemoryStore::new());
        let a = sample(10, 1);
        store.insert_artwork(&a).await.unwrap();
        let user = Uuid::new_v4();
        let mut cart = Cart::for_user(user);
        cart.add_item(&a, Quantity::one()).unwrap();
        store.save_cart(&cart).await.unwrap();

        let bridge = CheckoutBridge::new(store, Arc::new(MockPaymentProvider::failing()));
        assert!(matches!(bridge.start(user).await, Err(MarketError::PaymentProvider(_))));
    }
}
