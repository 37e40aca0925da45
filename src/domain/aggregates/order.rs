//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::aggregates::artwork::Artwork;
use crate::domain::aggregates::cart::ResolvedCart;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Quantity;

/// Immutable record of a purchase. Created once, never updated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: Uuid,
    user_id: Uuid,
    artworks: Vec<OrderLine>,
    total: Decimal,
    date: DateTime<Utc>,
    payment_reference: Option<String>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine { pub artwork_id: Uuid, pub quantity: Quantity, pub price_at_time: Decimal }

impl OrderLine {
    pub fn total(&self) -> Decimal { self.quantity.times(self.price_at_time) }
}

impl Order {
    /// Snapshots the resolved lines of `cart`. Dangling lines are not carried over.
    pub fn settle(cart: &ResolvedCart, payment_reference: Option<String>) -> Self {
        let artworks: Vec<OrderLine> = cart
            .resolved()
            .map(|(artwork, price_at_time, quantity)| OrderLine { artwork_id: artwork.id, quantity, price_at_time })
            .collect();
        let total = total_of(&artworks);
        let mut order = Self::new(cart.user_id, artworks, total, payment_reference.clone());
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: order.id, user_id: order.user_id, total, payment_reference }));
        order
    }

    /// Records an order from explicit lines. `stated_total` must match the lines.
    pub fn record(user_id: Uuid, artworks: Vec<OrderLine>, stated_total: Decimal) -> Result<Self, OrderError> {
        if artworks.is_empty() { return Err(OrderError::NoItems); }
        if artworks.iter().any(|l| l.price_at_time < Decimal::ZERO) { return Err(OrderError::NegativePrice); }
        let computed = total_of(&artworks);
        if computed != stated_total { return Err(OrderError::TotalMismatch { stated: stated_total, computed }); }
        let mut order = Self::new(user_id, artworks, computed, None);
        order.raise_event(DomainEvent::Order(OrderEvent::Recorded { order_id: order.id, user_id, total: computed }));
        Ok(order)
    }

    /// Rebuilds an order loaded from storage.
    pub fn restore(id: Uuid, user_id: Uuid, artworks: Vec<OrderLine>, total: Decimal, date: DateTime<Utc>, payment_reference: Option<String>) -> Self {
        Self { id, user_id, artworks, total, date, payment_reference, events: vec![] }
    }

    fn new(user_id: Uuid, artworks: Vec<OrderLine>, total: Decimal, payment_reference: Option<String>) -> Self {
        Self { id: Uuid::now_v7(), user_id, artworks, total, date: Utc::now(), payment_reference, events: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn artworks(&self) -> &[OrderLine] { &self.artworks }
    pub fn total(&self) -> Decimal { self.total }
    pub fn date(&self) -> DateTime<Utc> { self.date }
    pub fn payment_reference(&self) -> Option<&str> { self.payment_reference.as_deref() }

    /// Joins each line with the current catalog for display.
    pub fn view(&self, catalog: &HashMap<Uuid, Artwork>) -> OrderView {
        let artworks = self.artworks.iter().map(|line| match catalog.get(&line.artwork_id) {
            Some(artwork) => OrderLineView::Resolved { artwork: artwork.clone(), quantity: line.quantity, price_at_time: line.price_at_time },
            None => OrderLineView::Dangling { artwork_id: line.artwork_id, quantity: line.quantity, price_at_time: line.price_at_time },
        }).collect();
        OrderView { id: self.id, user_id: self.user_id, artworks, total: self.total, date: self.date, payment_reference: self.payment_reference.clone() }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

fn total_of(lines: &[OrderLine]) -> Decimal { lines.iter().map(OrderLine::total).sum() }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OrderLineView {
    #[serde(rename_all = "camelCase")]
    Resolved { artwork: Artwork, quantity: Quantity, price_at_time: Decimal },
    #[serde(rename_all = "camelCase")]
    Dangling { artwork_id: Uuid, quantity: Quantity, price_at_time: Decimal },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub artworks: Vec<OrderLineView>,
    pub total: Decimal,
    pub date: DateTime<Utc>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems, NegativePrice, TotalMismatch { stated: Decimal, computed: Decimal } }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoItems => write!(f, "No items"),
            Self::NegativePrice => write!(f, "Negative price"),
            Self::TotalMismatch { stated, computed } => write!(f, "Total {stated} does not match {computed}"),
        }
    }
}

impl From<OrderError> for crate::MarketError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NoItems => Self::NoItems,
            OrderError::NegativePrice => Self::Validation(err.to_string()),
            OrderError::TotalMismatch { stated, computed } => Self::TotalMismatch { stated, computed },
        }
    }
}
