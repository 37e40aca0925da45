//! Persistence seams.
//!
//! Each store trait covers one aggregate. [`OrderStore::settle`] is the only
//! operation that writes several aggregates and must do so atomically.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use crate::domain::aggregates::{Artwork, Cart, CommunityEvent, Order, User};
use crate::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkFilter {
    pub category: Option<String>,
    pub artist: Option<String>,
    pub in_stock: Option<bool>,
    pub created_by: Option<Uuid>,
}

impl ArtworkFilter {
    pub fn seller(seller: Uuid) -> Self { Self { created_by: Some(seller), ..Default::default() } }

    pub fn matches(&self, artwork: &Artwork) -> bool {
        self.category.as_deref().map_or(true, |c| artwork.category.eq_ignore_ascii_case(c))
            && self.artist.as_deref().map_or(true, |a| artwork.artist.eq_ignore_ascii_case(a))
            && self.in_stock.map_or(true, |s| artwork.in_stock == s)
            && self.created_by.map_or(true, |s| artwork.created_by == s)
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn artwork(&self, id: Uuid) -> Result<Option<Artwork>>;
    /// Artworks for the given ids. Missing ids are skipped.
    async fn artworks(&self, ids: &[Uuid]) -> Result<Vec<Artwork>>;
    async fn list_artworks(&self, filter: &ArtworkFilter) -> Result<Vec<Artwork>>;
    async fn insert_artwork(&self, artwork: &Artwork) -> Result<()>;
    async fn update_artwork(&self, artwork: &Artwork) -> Result<bool>;
    async fn delete_artwork(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn cart(&self, user_id: Uuid) -> Result<Option<Cart>>;
    /// Inserts or replaces the user's cart document.
    async fn save_cart(&self, cart: &Cart) -> Result<()>;
}

/// Result of [`OrderStore::settle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// Order stored, consumed cart lines removed, stock taken. Lists artworks sold beyond stock.
    Placed { oversold: Vec<Uuid> },
    /// An order already exists for this payment reference; nothing was written.
    Duplicate(Order),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Newest first.
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
    async fn order_by_payment(&self, reference: &str) -> Result<Option<Order>>;
    async fn insert_order(&self, order: &Order) -> Result<()>;
    /// Stores `order`, removes the `consumed` artwork lines from the owner's cart
    /// and decrements stock in one unit.
    async fn settle(&self, order: &Order, consumed: &[Uuid]) -> Result<Settled>;
    /// Sum of all order totals and the number of orders.
    async fn revenue(&self) -> Result<(Decimal, i64)>;
}

/// Outcome of [`UserStore::update_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserWrite { Saved, Missing, Conflict }

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user(&self, id: Uuid) -> Result<Option<User>>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Returns `false` when the username or email is taken.
    async fn insert_user(&self, user: &User) -> Result<bool>;
    /// Replaces the stored user, including its password hash.
    async fn update_user(&self, user: &User) -> Result<UserWrite>;
    /// Also drops the user's favorites.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
    /// Adds or removes `artwork_id`. Returns whether it is now a favorite.
    async fn toggle_favorite(&self, user_id: Uuid, artwork_id: Uuid) -> Result<bool>;
    /// In the order they were added.
    async fn favorites(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// Soonest first.
    async fn community_events(&self) -> Result<Vec<CommunityEvent>>;
    async fn community_event(&self, id: Uuid) -> Result<Option<CommunityEvent>>;
    async fn insert_community_event(&self, event: &CommunityEvent) -> Result<()>;
    async fn update_community_event(&self, event: &CommunityEvent) -> Result<bool>;
    async fn delete_community_event(&self, id: Uuid) -> Result<bool>;
}

/// Everything the service needs from one backing store.
pub trait MarketStore: CatalogStore + CartStore + OrderStore + UserStore + CommunityStore {}
impl<T: CatalogStore + CartStore + OrderStore + UserStore + CommunityStore> MarketStore for T {}
