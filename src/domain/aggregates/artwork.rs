//! Artwork Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::value_objects::{to_cents, Percent, Quantity};

/// A catalog entry listed by a seller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub artist: String,
    pub price: Decimal,
    pub stock: u32,
    pub rating: Decimal,
    pub image: String,
    pub dimensions: Option<String>,
    pub medium: Option<String>,
    pub year_created: Option<i32>,
    pub discount: Percent,
    pub in_stock: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a seller supplies when listing an artwork.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewArtwork {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1))]
    pub artist: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub rating: Decimal,
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
    pub dimensions: Option<String>,
    pub medium: Option<String>,
    pub year_created: Option<i32>,
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub discount: Percent,
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub artist: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub rating: Option<Decimal>,
    pub image: Option<String>,
    pub dimensions: Option<String>,
    pub medium: Option<String>,
    pub year_created: Option<i32>,
    pub in_stock: Option<bool>,
    pub discount: Option<Percent>,
}

impl Artwork {
    /// Lists a new artwork. The stored price is the price after discount, in cents.
    pub fn list(new: NewArtwork, seller: Uuid) -> Result<Self, ArtworkError> {
        if new.price < Decimal::ZERO { return Err(ArtworkError::NegativePrice); }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            title: new.title.trim().to_string(),
            category: new.category.trim().to_string(),
            description: new.description,
            artist: new.artist.trim().to_string(),
            price: to_cents(new.discount.reduce(new.price)),
            stock: new.stock,
            rating: new.rating,
            image: new.image,
            dimensions: new.dimensions,
            medium: new.medium,
            year_created: new.year_created,
            discount: new.discount,
            in_stock: new.in_stock.unwrap_or(new.stock > 0),
            created_by: seller,
            created_at: now,
            updated_at: now,
        })
    }

    /// A new stock level recomputes availability unless `in_stock` is given explicitly.
    pub fn apply(&mut self, update: ArtworkUpdate) -> Result<(), ArtworkError> {
        if let Some(price) = update.price {
            if price < Decimal::ZERO { return Err(ArtworkError::NegativePrice); }
            self.price = to_cents(price);
        }
        if let Some(v) = update.title { self.title = v; }
        if let Some(v) = update.category { self.category = v; }
        if let Some(v) = update.description { self.description = v; }
        if let Some(v) = update.artist { self.artist = v; }
        if let Some(v) = update.stock {
            self.stock = v;
            self.in_stock = v > 0;
        }
        if let Some(v) = update.rating { self.rating = v; }
        if let Some(v) = update.image { self.image = v; }
        if let Some(v) = update.dimensions { self.dimensions = Some(v); }
        if let Some(v) = update.medium { self.medium = Some(v); }
        if let Some(v) = update.year_created { self.year_created = Some(v); }
        if let Some(v) = update.in_stock { self.in_stock = v; }
        if let Some(v) = update.discount { self.discount = v; }
        self.touch();
        Ok(())
    }

    pub fn has_stock(&self) -> bool { self.stock > 0 }

    /// Checks that `requested` units can be supplied from live stock.
    pub fn ensure_available(&self, requested: Quantity) -> Result<(), ArtworkError> {
        if !self.has_stock() { return Err(ArtworkError::OutOfStock(self.id)); }
        if requested.value() > self.stock {
            return Err(ArtworkError::InsufficientStock { artwork_id: self.id, requested: requested.value(), available: self.stock });
        }
        Ok(())
    }

    /// Removes sold units from stock, clamping at zero. Returns the shortfall.
    pub fn take_stock(&mut self, sold: Quantity) -> u32 {
        let shortfall = sold.value().saturating_sub(self.stock);
        self.stock = self.stock.saturating_sub(sold.value());
        if self.stock == 0 { self.in_stock = false; }
        self.touch();
        shortfall
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkError { NegativePrice, OutOfStock(Uuid), InsufficientStock { artwork_id: Uuid, requested: u32, available: u32 } }
impl std::error::Error for ArtworkError {}
impl std::fmt::Display for ArtworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativePrice => write!(f, "Price must not be negative"),
            Self::OutOfStock(_) => write!(f, "Artwork is out of stock"),
            Self::InsufficientStock { requested, available, .. } => write!(f, "Requested {requested}, only {available} in stock"),
        }
    }
}

impl From<ArtworkError> for crate::MarketError {
    fn from(err: ArtworkError) -> Self {
        match err {
            ArtworkError::NegativePrice => Self::Validation(err.to_string()),
            ArtworkError::OutOfStock(id) => Self::OutOfStock(id),
            ArtworkError::InsufficientStock { artwork_id, requested, available } => Self::InsufficientStock { artwork_id, requested, available },
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(price: i64, stock: u32) -> Artwork {
    Artwork::list(
        NewArtwork {
            title: "Harbour at Dusk".into(), category: "Painting".into(), description: "Oil on canvas".into(),
            artist: "M. Reyes".into(), price: Decimal::from(price), stock, rating: Decimal::ZERO,
            image: "/uploads/harbour.jpg".into(), dimensions: None, medium: Some("Oil".into()), year_created: Some(2021),
            in_stock: None, discount: Percent::zero(),
        },
        Uuid::new_v4(),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_applies_discount_to_price() {
        let listing = NewArtwork {
            title: "Study".into(), category: "Drawing".into(), description: "Charcoal".into(), artist: "K".into(),
            price: Decimal::from(200), stock: 2, rating: Decimal::ZERO, image: "/i.jpg".into(), dimensions: None,
            medium: None, year_created: None, in_stock: None, discount: Percent::new(Decimal::from(25)).unwrap(),
        };
        let a = Artwork::list(listing, Uuid::new_v4()).unwrap();
        assert_eq!(a.price, Decimal::from(150));
        assert!(a.in_stock);
    }

    #[test]
    fn test_update_keeps_raw_price() {
        let mut a = sample(100, 3);
        a.apply(ArtworkUpdate { price: Some(Decimal::from(80)), ..Default::default() }).unwrap();
        assert_eq!(a.price, Decimal::from(80));
        assert_eq!(a.stock, 3);
        assert_eq!(a.apply(ArtworkUpdate { price: Some(Decimal::from(-1)), ..Default::default() }), Err(ArtworkError::NegativePrice));
    }

    #[test]
    fn test_availability() {
        let a = sample(100, 2);
        assert!(a.ensure_available(Quantity::new(2).unwrap()).is_ok());
        assert!(matches!(a.ensure_available(Quantity::new(3).unwrap()), Err(ArtworkError::InsufficientStock { available: 2, .. })));
        let sold_out = sample(100, 0);
        assert_eq!(sold_out.ensure_available(Quantity::one()), Err(ArtworkError::OutOfStock(sold_out.id)));
    }

    #[test]
    fn test_listing_price_rounded_to_cents() {
        let listing = NewArtwork {
            title: "Sketch".into(), category: "Drawing".into(), description: "Ink".into(), artist: "K".into(),
            price: Decimal::new(1001, 2), stock: 1, rating: Decimal::ZERO, image: "/i.jpg".into(), dimensions: None,
            medium: None, year_created: None, in_stock: None, discount: Percent::new(Decimal::from(50)).unwrap(),
        };
        assert_eq!(Artwork::list(listing, Uuid::new_v4()).unwrap().price, Decimal::new(501, 2));
    }

    #[test]
    fn test_restock_makes_available_again() {
        let mut a = sample(100, 1);
        a.take_stock(Quantity::one());
        assert!(!a.in_stock);

        a.apply(ArtworkUpdate { stock: Some(5), ..Default::default() }).unwrap();
        assert_eq!(a.stock, 5);
        assert!(a.in_stock);

        a.apply(ArtworkUpdate { stock: Some(0), ..Default::default() }).unwrap();
        assert!(!a.in_stock);
        a.apply(ArtworkUpdate { stock: Some(3), in_stock: Some(false), ..Default::default() }).unwrap();
        assert!(!a.in_stock);
    }

    #[test]
    fn test_take_stock_clamps() {
        let mut a = sample(100, 2);
        assert_eq!(a.take_stock(Quantity::new(3).unwrap()), 1);
        assert_eq!(a.stock, 0);
        assert!(!a.in_stock);
    }
}
