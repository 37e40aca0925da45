//! Application services. Each one is a single read-modify-write against the store.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod community;
pub mod profile;
pub mod promo;
pub mod settlement;

pub use accounts::{Accounts, LoginRequest, RegisterRequest, Session};
pub use cart::CartEngine;
pub use catalog::Catalog;
pub use checkout::CheckoutBridge;
pub use community::Community;
pub use profile::{PasswordChange, Profile, ProfileUpdate, Profiles};
pub use promo::{PromoState, PromoSummary, PROMO_CODE};
pub use settlement::{Revenue, Settlement};

use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::aggregates::{Artwork, Cart, ResolvedCart};
use crate::store::CatalogStore;
use crate::Result;

/// Current catalog records for `ids`, keyed by id. Missing artworks are absent.
pub(crate) async fn load_catalog<S: CatalogStore + ?Sized>(store: &S, ids: &[Uuid]) -> Result<HashMap<Uuid, Artwork>> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    Ok(store.artworks(&unique).await?.into_iter().map(|a| (a.id, a)).collect())
}

pub(crate) async fn resolve_cart<S: CatalogStore + ?Sized>(store: &S, cart: &Cart) -> Result<ResolvedCart> {
    let ids: Vec<Uuid> = cart.items().iter().map(|i| i.artwork_id).collect();
    let catalog = load_catalog(store, &ids).await?;
    Ok(cart.resolve(&catalog))
}
