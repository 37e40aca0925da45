//! Artwork listings.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
use crate::auth::Claims;
use crate::domain::aggregates::{Artwork, ArtworkUpdate, NewArtwork};
use crate::store::{ArtworkFilter, MarketStore};
use crate::{MarketError, Result};

#[derive(Clone)]
pub struct Catalog { store: Arc<dyn MarketStore> }

impl Catalog {
    pub fn new(store: Arc<dyn MarketStore>) -> Self { Self { store } }

    /// Newest first.
    pub async fn list(&self, filter: &ArtworkFilter) -> Result<Vec<Artwork>> {
        self.store.list_artworks(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Artwork> {
        self.store.artwork(id).await?.ok_or(MarketError::ArtworkNotFound(id))
    }

    pub async fn seller_listings(&self, seller: &Claims) -> Result<Vec<Artwork>> {
        self.store.list_artworks(&ArtworkFilter::seller(seller.sub)).await
    }

    pub async fn create(&self, seller: &Claims, new: NewArtwork) -> Result<Artwork> {
        if !seller.is_seller() && !seller.is_admin() {
            return Err(MarketError::Forbidden("Only sellers can list artworks".into()));
        }
        new.validate().map_err(|e| MarketError::Validation(e.to_string()))?;
        let artwork = Artwork::list(new, seller.sub)?;
        self.store.insert_artwork(&artwork).await?;
        tracing::info!(artwork_id = %artwork.id, seller = %seller.sub, price = %artwork.price, "Artwork listed");
        Ok(artwork)
    }

    pub async fn update(&self, caller: &Claims, id: Uuid, update: ArtworkUpdate) -> Result<Artwork> {
        let mut artwork = self.owned(caller, id).await?;
        artwork.apply(update)?;
        if !self.store.update_artwork(&artwork).await? { return Err(MarketError::ArtworkNotFound(id)); }
        tracing::info!(artwork_id = %id, by = %caller.sub, "Artwork updated");
        Ok(artwork)
    }

    /// Carts and orders that reference the artwork keep their lines; they resolve as dangling.
    pub async fn delete(&self, caller: &Claims, id: Uuid) -> Result<()> {
        self.owned(caller, id).await?;
        if !self.store.delete_artwork(id).await? { return Err(MarketError::ArtworkNotFound(id)); }
        tracing::info!(artwork_id = %id, by = %caller.sub, "Artwork deleted");
        Ok(())
    }

    async fn owned(&self, caller: &Claims, id: Uuid) -> Result<Artwork> {
        let artwork = self.get(id).await?;
        if artwork.created_by != caller.sub && !caller.is_admin() {
            return Err(MarketError::Forbidden("Artwork belongs to another seller".into()));
        }
        Ok(artwork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Role, UserType};
    use crate::domain::value_objects::Percent;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn claims(role: Role, user_type: Option<UserType>) -> Claims {
        Claims { sub: Uuid::new_v4(), username: "u".into(), role, user_type, exp: 0, iat: 0 }
    }

    fn listing(price: i64, discount: i64) -> NewArtwork {
        NewArtwork {
            title: "Dawn".into(), category: "Painting".into(), description: "Oil".into(), artist: "Ana".into(),
            price: Decimal::from(price), stock: 2, rating: Decimal::ZERO, image: "/img/dawn.jpg".into(),
            dimensions: None, medium: None, year_created: Some(2020), in_stock: None,
            discount: Percent::new(Decimal::from(discount)).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_seller_lists_with_discounted_price() {
        let catalog = Catalog::new(Arc::new(MemoryStore::new()));
        let seller = claims(Role::User, Some(UserType::Seller));
        let artwork = catalog.create(&seller, listing(200, 25)).await.unwrap();
        assert_eq!(artwork.price, Decimal::from(150));
        assert_eq!(catalog.seller_listings(&seller).await.unwrap().len(), 1);
        assert_eq!(catalog.get(artwork.id).await.unwrap(), artwork);
    }

    #[tokio::test]
    async fn test_buyer_cannot_list_and_empty_fields_rejected() {
        let catalog = Catalog::new(Arc::new(MemoryStore::new()));
        let buyer = claims(Role::User, Some(UserType::Buyer));
        assert!(matches!(catalog.create(&buyer, listing(10, 0)).await, Err(MarketError::Forbidden(_))));

        let mut bad = listing(10, 0);
        bad.image = String::new();
        let admin = claims(Role::Admin, None);
        assert!(matches!(catalog.create(&admin, bad).await, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_mutates() {
        let catalog = Catalog::new(Arc::new(MemoryStore::new()));
        let seller = claims(Role::User, Some(UserType::Seller));
        let other = claims(Role::User, Some(UserType::Seller));
        let admin = claims(Role::Admin, None);
        let artwork = catalog.create(&seller, listing(100, 0)).await.unwrap();

        let update = ArtworkUpdate { price: Some(Decimal::from(80)), ..Default::default() };
        assert!(matches!(catalog.update(&other, artwork.id, update.clone()).await, Err(MarketError::Forbidden(_))));
        assert_eq!(catalog.update(&seller, artwork.id, update).await.unwrap().price, Decimal::from(80));

        catalog.delete(&admin, artwork.id).await.unwrap();
        assert!(matches!(catalog.get(artwork.id).await, Err(MarketError::ArtworkNotFound(_))));
        assert!(matches!(catalog.delete(&admin, artwork.id).await, Err(MarketError::ArtworkNotFound(_))));
    }
}
