//! Order settlement, order records and history.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use crate::domain::aggregates::{Order, OrderLine, OrderView};
use crate::payment::{amount_due, PaymentProvider, PaymentStatus};
use crate::publisher::{publish_all, EventPublisher};
use crate::service::{load_catalog, resolve_cart};
use crate::store::{MarketStore, Settled};
use crate::{MarketError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub total_revenue: Decimal,
    pub order_count: i64,
}

#[derive(Clone)]
pub struct Settlement {
    store: Arc<dyn MarketStore>,
    payments: Arc<dyn PaymentProvider>,
    events: Arc<dyn EventPublisher>,
}

impl Settlement {
    pub fn new(store: Arc<dyn MarketStore>, payments: Arc<dyn PaymentProvider>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, payments, events }
    }

    /// Settles the user's cart once the provider reports `session_id` as paid
    /// for exactly the cart's total. Repeating a confirmed session returns the
    /// existing order.
    pub async fn confirm(&self, user_id: Uuid, session_id: &str) -> Result<OrderView> {
        let session = self.payments.retrieve_session(session_id).await?;
        if session.status != PaymentStatus::Paid {
            tracing::info!(user_id = %user_id, session_id = %session_id, status = ?session.status, "Payment not confirmed");
            return Err(MarketError::PaymentNotConfirmed(format!("session {session_id} is not paid")));
        }
        if session.client_reference.as_deref() != Some(user_id.to_string().as_str()) {
            tracing::warn!(user_id = %user_id, session_id = %session_id, "Session belongs to another user");
            return Err(MarketError::Forbidden("Checkout session belongs to another user".into()));
        }
        if let Some(existing) = self.store.order_by_payment(&session.id).await? {
            tracing::info!(order_id = %existing.id(), session_id = %session_id, "Payment already settled");
            return self.view(&existing).await;
        }
        let paid = session
            .amount_total
            .ok_or_else(|| MarketError::PaymentNotConfirmed(format!("session {session_id} reports no amount")))?;
        self.place(user_id, Some(session.id), Some(paid)).await
    }

    /// Turns the live cart into an order without a payment check.
    pub async fn settle(&self, user_id: Uuid, payment_reference: Option<String>) -> Result<OrderView> {
        self.place(user_id, payment_reference, None).await
    }

    /// Dangling lines are excluded. The order insert, cart line removal and
    /// stock decrement happen as one store operation.
    async fn place(&self, user_id: Uuid, payment_reference: Option<String>, paid: Option<i64>) -> Result<OrderView> {
        let cart = self.store.cart(user_id).await?.ok_or(MarketError::CartNotFound(user_id))?;
        let resolved = resolve_cart(&*self.store, &cart).await?;
        let mut order = Order::settle(&resolved, payment_reference);

        if let Some(paid) = paid {
            let due = amount_due(order.artworks().iter().map(|l| (l.price_at_time, l.quantity.value())))?;
            if due != paid {
                tracing::warn!(user_id = %user_id, paid, due, "Paid amount does not match the cart");
                return Err(MarketError::PaymentNotConfirmed(format!(
                    "paid amount does not match the cart total {}", order.total()
                )));
            }
        }

        let consumed: Vec<Uuid> = cart.items().iter().map(|i| i.artwork_id).collect();
        match self.store.settle(&order, &consumed).await? {
            Settled::Duplicate(existing) => {
                tracing::info!(order_id = %existing.id(), user_id = %user_id, "Settlement raced an earlier confirmation");
                return self.view(&existing).await;
            }
            Settled::Placed { oversold } => {
                for artwork_id in oversold {
                    tracing::warn!(order_id = %order.id(), artwork_id = %artwork_id, "Artwork sold beyond stock");
                }
            }
        }

        tracing::info!(
            order_id = %order.id(),
            user_id = %user_id,
            total = %order.total(),
            lines = order.artworks().len(),
            dropped = resolved.dangling_count(),
            "Order placed"
        );
        publish_all(&*self.events, order.take_events()).await;
        self.view(&order).await
    }

    /// Stores an order from explicit lines after checking the stated total.
    pub async fn record(&self, user_id: Uuid, artworks: Vec<OrderLine>, total: Decimal) -> Result<Order> {
        let mut order = Order::record(user_id, artworks, total)?;
        self.store.insert_order(&order).await?;
        tracing::info!(order_id = %order.id(), user_id = %user_id, total = %order.total(), "Order recorded");
        publish_all(&*self.events, order.take_events()).await;
        Ok(order)
    }

    /// Newest first.
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<OrderView>> {
        let orders = self.store.orders_for_user(user_id).await?;
        let ids: Vec<Uuid> = orders.iter().flat_map(|o| o.artworks().iter().map(|l| l.artwork_id)).collect();
        let catalog = load_catalog(&*self.store, &ids).await?;
        Ok(orders.iter().map(|o| o.view(&catalog)).collect())
    }

    pub async fn revenue(&self) -> Result<Revenue> {
        let (total_revenue, order_count) = self.store.revenue().await?;
        Ok(Revenue { total_revenue, order_count })
    }

    async fn view(&self, order: &Order) -> Result<OrderView> {
        let ids: Vec<Uuid> = order.artworks().iter().map(|l| l.artwork_id).collect();
        Ok(order.view(&load_catalog(&*self.store, &ids).await?))
    }
}
