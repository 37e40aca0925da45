//! Hosted checkout providers.
//!
//! Sessions are created from server-side line items and later retrieved by id
//! so settlement only ever trusts the provider's own payment status.

mod mock;
mod stripe;

pub use mock::MockPaymentProvider;
pub use stripe::StripeCheckout;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::MarketError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    /// Unit price in major currency units.
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus { Paid, Unpaid, NoPaymentRequired }

impl PaymentStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => Self::Paid,
            "no_payment_required" => Self::NoPaymentRequired,
            _ => Self::Unpaid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub id: String,
    pub status: PaymentStatus,
    pub client_reference: Option<String>,
    /// Amount charged, in minor units.
    pub amount_total: Option<i64>,
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("payment provider unreachable: {0}")]
    Transport(String),

    #[error("payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unknown checkout session {0}")]
    UnknownSession(String),

    #[error("cannot charge amount {0}")]
    InvalidAmount(Decimal),
}

/// Converts a major-unit price to integer minor units, rounding half away from zero.
pub fn minor_units(price: Decimal) -> Result<i64, PaymentError> {
    if price.is_sign_negative() { return Err(PaymentError::InvalidAmount(price)); }
    (price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PaymentError::InvalidAmount(price))
}

/// Minor-unit total charged for `(unit price, quantity)` lines.
pub fn amount_due(lines: impl IntoIterator<Item = (Decimal, u32)>) -> Result<i64, PaymentError> {
    lines.into_iter().try_fold(0i64, |sum, (price, quantity)| {
        let line = minor_units(price)?.checked_mul(i64::from(quantity)).ok_or(PaymentError::InvalidAmount(price))?;
        sum.checked_add(line).ok_or(PaymentError::InvalidAmount(price))
    })
}

impl LineItem {
    pub fn priced(items: &[LineItem]) -> impl Iterator<Item = (Decimal, u32)> + '_ {
        items.iter().map(|i| (i.price, i.quantity))
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self { Self::Transport(err.to_string()) }
}

impl From<PaymentError> for MarketError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::UnknownSession(id) => Self::PaymentNotConfirmed(format!("unknown session {id}")),
            other => Self::PaymentProvider(other.to_string()),
        }
    }
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Opens a hosted checkout. `client_reference` comes back on retrieval.
    async fn create_checkout_session(&self, items: &[LineItem], client_reference: &str) -> Result<CheckoutSession, PaymentError>;
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, PaymentError>;
}
