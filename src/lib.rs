//! Art Marketplace
//!
//! Self-hosted marketplace for original artworks.
//!
//! ## Features
//! - Artwork catalog with seller ownership
//! - Per-user shopping carts with price snapshots and live stock validation
//! - Hosted checkout through a payment provider
//! - Server-verified order settlement
//! - Promo code evaluation for displayed totals
//! - Community events, favorites and user profiles

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod payment;
pub mod publisher;
pub mod service;
pub mod store;

pub use domain::aggregates::{
    Artwork, Cart, CartItem, CartLine, CommunityEvent, Order, OrderLine, OrderLineView, OrderView, ResolvedCart,
    Role, User, UserType,
};
pub use domain::value_objects::{Percent, Quantity};

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Artwork not found or has been removed")]
    ArtworkNotFound(Uuid),

    #[error("Cart not found")]
    CartNotFound(Uuid),

    #[error("Item not found in cart")]
    ItemNotInCart(Uuid),

    #[error("User not found")]
    UserNotFound(Uuid),

    #[error("Event not found")]
    CommunityEventNotFound(Uuid),

    #[error("Artwork is out of stock")]
    OutOfStock(Uuid),

    #[error("Not enough stock available: requested {requested}, available {available}")]
    InsufficientStock {
        artwork_id: Uuid,
        requested: u32,
        available: u32,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order has no items")]
    NoItems,

    #[error("Order total {stated} does not match its items ({computed})")]
    TotalMismatch { stated: Decimal, computed: Decimal },

    #[error("Payment not confirmed: {0}")]
    PaymentNotConfirmed(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("User already exists")]
    UserExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Coarse classification used by the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unauthorized,
    Forbidden,
    Upstream,
    Internal,
}

impl MarketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArtworkNotFound(_)
            | Self::CartNotFound(_)
            | Self::ItemNotInCart(_)
            | Self::UserNotFound(_)
            | Self::CommunityEventNotFound(_) => ErrorKind::NotFound,
            Self::OutOfStock(_)
            | Self::InsufficientStock { .. }
            | Self::InvalidQuantity(_)
            | Self::EmptyCart
            | Self::NoItems
            | Self::TotalMismatch { .. }
            | Self::PaymentNotConfirmed(_)
            | Self::Validation(_)
            | Self::UserExists
            | Self::InvalidCredentials => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::PaymentProvider(_) => ErrorKind::Upstream,
            Self::StorageError(_) => ErrorKind::Internal,
        }
    }
}

impl From<sqlx::Error> for MarketError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(MarketError::CartNotFound(Uuid::nil()).kind(), ErrorKind::NotFound);
        assert_eq!(MarketError::CommunityEventNotFound(Uuid::nil()).kind(), ErrorKind::NotFound);
        assert_eq!(MarketError::OutOfStock(Uuid::nil()).kind(), ErrorKind::Validation);
        assert_eq!(MarketError::StorageError("down".into()).kind(), ErrorKind::Internal);
        assert_eq!(MarketError::PaymentProvider("502".into()).kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_stock_message() {
        let err = MarketError::InsufficientStock { artwork_id: Uuid::nil(), requested: 4, available: 3 };
        assert_eq!(err.to_string(), "Not enough stock available: requested 4, available 3");
    }
}
