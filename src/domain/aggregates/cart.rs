//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::aggregates::artwork::{Artwork, ArtworkError};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::Quantity;

/// A user's cart. At most one item per artwork.
#[derive(Clone, Debug)]
pub struct Cart {
    id: Uuid,
    user_id: Uuid,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub artwork_id: Uuid,
    /// Catalog price when the item was first added.
    pub price_at_time: Decimal,
    pub quantity: Quantity,
}

impl Cart {
    pub fn for_user(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(), user_id, items: vec![], created_at: now, updated_at: now,
            events: vec![DomainEvent::Cart(CartEvent::Created { user_id })],
        }
    }

    /// Rebuilds a cart loaded from storage.
    pub fn restore(id: Uuid, user_id: Uuid, items: Vec<CartItem>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { id, user_id, items, created_at, updated_at, events: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn item(&self, artwork_id: Uuid) -> Option<&CartItem> { self.items.iter().find(|i| i.artwork_id == artwork_id) }

    /// Adds `quantity` of `artwork`, merging with an existing line.
    /// The merged quantity is checked against live stock.
    pub fn add_item(&mut self, artwork: &Artwork, quantity: Quantity) -> Result<(), CartError> {
        if !artwork.has_stock() { return Err(ArtworkError::OutOfStock(artwork.id).into()); }
        let merged = match self.item(artwork.id) {
            Some(existing) => existing.quantity.checked_add(quantity).ok_or(CartError::QuantityOverflow)?,
            None => quantity,
        };
        artwork.ensure_available(merged)?;

        let price_at_time = match self.items.iter_mut().find(|i| i.artwork_id == artwork.id) {
            Some(existing) => { existing.quantity = merged; existing.price_at_time }
            None => {
                self.items.push(CartItem { artwork_id: artwork.id, price_at_time: artwork.price, quantity });
                artwork.price
            }
        };
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { user_id: self.user_id, artwork_id: artwork.id, quantity, price_at_time }));
        self.touch();
        Ok(())
    }

    /// Replaces the quantity of an existing line.
    pub fn set_quantity(&mut self, artwork: &Artwork, quantity: Quantity) -> Result<(), CartError> {
        if self.item(artwork.id).is_none() { return Err(CartError::ItemNotFound(artwork.id)); }
        artwork.ensure_available(quantity)?;
        if let Some(item) = self.items.iter_mut().find(|i| i.artwork_id == artwork.id) { item.quantity = quantity; }
        self.raise_event(DomainEvent::Cart(CartEvent::QuantitySet { user_id: self.user_id, artwork_id: artwork.id, quantity }));
        self.touch();
        Ok(())
    }

    /// Removes the line for `artwork_id`. Returns whether anything was removed.
    pub fn remove_item(&mut self, artwork_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.artwork_id != artwork_id);
        let removed = self.items.len() < before;
        if removed {
            self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { user_id: self.user_id, artwork_id }));
            self.touch();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared { user_id: self.user_id }));
        self.touch();
    }

    /// Drops the lines a settled order consumed. Lines added since the
    /// order's snapshot stay in the cart.
    pub fn remove_settled(&mut self, artwork_ids: &[Uuid]) {
        self.items.retain(|i| !artwork_ids.contains(&i.artwork_id));
        self.touch();
    }

    /// Joins each item with its catalog record. Items whose artwork is missing
    /// from `catalog` are kept as dangling lines.
    pub fn resolve(&self, catalog: &HashMap<Uuid, Artwork>) -> ResolvedCart {
        let items: Vec<CartLine> = self.items.iter().map(|item| match catalog.get(&item.artwork_id) {
            Some(artwork) => CartLine::Resolved { artwork: artwork.clone(), price_at_time: item.price_at_time, quantity: item.quantity },
            None => CartLine::Dangling { artwork_id: item.artwork_id, price_at_time: item.price_at_time, quantity: item.quantity },
        }).collect();
        let subtotal = items.iter().filter_map(CartLine::line_total).sum();
        ResolvedCart { id: self.id, user_id: self.user_id, items, subtotal, created_at: self.created_at, updated_at: self.updated_at }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// A cart line joined with the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CartLine {
    #[serde(rename_all = "camelCase")]
    Resolved { artwork: Artwork, price_at_time: Decimal, quantity: Quantity },
    #[serde(rename_all = "camelCase")]
    Dangling { artwork_id: Uuid, price_at_time: Decimal, quantity: Quantity },
}

impl CartLine {
    pub fn artwork_id(&self) -> Uuid {
        match self { Self::Resolved { artwork, .. } => artwork.id, Self::Dangling { artwork_id, .. } => *artwork_id }
    }
    pub fn quantity(&self) -> Quantity {
        match self { Self::Resolved { quantity, .. } | Self::Dangling { quantity, .. } => *quantity }
    }
    /// Priced total, or `None` for a dangling line.
    pub fn line_total(&self) -> Option<Decimal> {
        match self {
            Self::Resolved { price_at_time, quantity, .. } => Some(quantity.times(*price_at_time)),
            Self::Dangling { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    /// Sum over resolved lines only.
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResolvedCart {
    pub fn resolved(&self) -> impl Iterator<Item = (&Artwork, Decimal, Quantity)> + '_ {
        self.items.iter().filter_map(|line| match line {
            CartLine::Resolved { artwork, price_at_time, quantity } => Some((artwork, *price_at_time, *quantity)),
            CartLine::Dangling { .. } => None,
        })
    }
    pub fn dangling_count(&self) -> usize { self.items.iter().filter(|l| matches!(l, CartLine::Dangling { .. })).count() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound(Uuid), QuantityOverflow, Stock(ArtworkError) }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(_) => write!(f, "Item not found in cart"),
            Self::QuantityOverflow => write!(f, "Quantity overflow"),
            Self::Stock(e) => write!(f, "{e}"),
        }
    }
}

impl From<ArtworkError> for CartError { fn from(e: ArtworkError) -> Self { Self::Stock(e) } }

impl From<CartError> for crate::MarketError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ItemNotFound(id) => Self::ItemNotInCart(id),
            CartError::QuantityOverflow => Self::InvalidQuantity(i64::from(u32::MAX)),
            CartError::Stock(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::artwork::sample;

    fn qty(n: i64) -> Quantity { Quantity::new(n).unwrap() }

    fn catalog(artworks: &[&Artwork]) -> HashMap<Uuid, Artwork> {
        artworks.iter().map(|a| (a.id, (*a).clone())).collect()
    }

    #[test]
    fn test_add_merges_within_stock() {
        let a = sample(100, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(2)).unwrap();
        cart.add_item(&a, qty(3)).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, qty(5));
    }

    #[test]
    fn test_merge_beyond_stock_rejected() {
        let a = sample(100, 3);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(2)).unwrap();
        let err = cart.add_item(&a, qty(2)).unwrap_err();
        assert_eq!(err, CartError::Stock(ArtworkError::InsufficientStock { artwork_id: a.id, requested: 4, available: 3 }));
        assert_eq!(cart.items()[0].quantity, qty(2));
    }

    #[test]
    fn test_out_of_stock_leaves_cart_untouched() {
        let a = sample(100, 0);
        let mut cart = Cart::for_user(Uuid::new_v4());
        assert_eq!(cart.add_item(&a, qty(1)), Err(CartError::Stock(ArtworkError::OutOfStock(a.id))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut a = sample(100, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(1)).unwrap();
        a.price = Decimal::from(250);
        cart.add_item(&a, qty(1)).unwrap();
        assert_eq!(cart.items()[0].price_at_time, Decimal::from(100));
        assert_eq!(cart.resolve(&catalog(&[&a])).subtotal, Decimal::from(200));
    }

    #[test]
    fn test_set_quantity_replaces() {
        let a = sample(100, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(2)).unwrap();
        cart.set_quantity(&a, qty(4)).unwrap();
        assert_eq!(cart.items()[0].quantity, qty(4));
        assert!(cart.set_quantity(&a, qty(6)).is_err());
        let other = sample(10, 5);
        assert_eq!(cart.set_quantity(&other, qty(1)), Err(CartError::ItemNotFound(other.id)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let a = sample(100, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(1)).unwrap();
        assert!(!cart.remove_item(Uuid::new_v4()));
        assert_eq!(cart.items().len(), 1);
        assert!(cart.remove_item(a.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_dangling_lines_excluded_from_subtotal() {
        let a = sample(100, 5);
        let b = sample(40, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(1)).unwrap();
        cart.add_item(&b, qty(2)).unwrap();
        let resolved = cart.resolve(&catalog(&[&b]));
        assert_eq!(resolved.items.len(), 2);
        assert_eq!(resolved.dangling_count(), 1);
        assert_eq!(resolved.subtotal, Decimal::from(80));
        assert_eq!(resolved.items[0], CartLine::Dangling { artwork_id: a.id, price_at_time: Decimal::from(100), quantity: qty(1) });
    }

    #[test]
    fn test_remove_settled_keeps_later_lines() {
        let a = sample(100, 5);
        let b = sample(40, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(1)).unwrap();
        cart.add_item(&b, qty(2)).unwrap();
        cart.remove_settled(&[a.id]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].artwork_id, b.id);
    }

    #[test]
    fn test_events_raised() {
        let a = sample(100, 5);
        let mut cart = Cart::for_user(Uuid::new_v4());
        cart.add_item(&a, qty(1)).unwrap();
        cart.clear();
        let events = cart.take_events();
        assert_eq!(events.len(), 3);
        assert!(cart.take_events().is_empty());
    }
}
