//! Promo code evaluation for displayed cart totals.
//!
//! Presentation only. Nothing here is persisted or reaches an order total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{to_cents, Percent};

pub const PROMO_CODE: &str = "ILOVEART";
const PROMO_PERCENT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromoState {
    discount: Percent,
    code_valid: bool,
}

impl Default for PromoState {
    fn default() -> Self { Self { discount: Percent::zero(), code_valid: true } }
}

impl PromoState {
    /// A matching code sets the promo discount; anything else clears it and
    /// marks the code invalid.
    pub fn apply_code(&mut self, code: &str) {
        if code.trim().eq_ignore_ascii_case(PROMO_CODE) {
            self.discount = promo_discount();
            self.code_valid = true;
        } else {
            self.discount = Percent::zero();
            self.code_valid = false;
        }
    }

    pub fn discount(&self) -> Percent { self.discount }
    pub fn code_valid(&self) -> bool { self.code_valid }

    /// Discounted subtotal rounded half away from zero to cents.
    pub fn displayed_total(&self, subtotal: Decimal) -> Decimal {
        to_cents(self.discount.reduce(subtotal))
    }

    pub fn summarize(&self, subtotal: Decimal) -> PromoSummary {
        PromoSummary {
            subtotal,
            displayed_total: self.displayed_total(subtotal),
            discount_applied: self.discount,
            code_valid: self.code_valid,
        }
    }
}

fn promo_discount() -> Percent {
    Percent::new(Decimal::from(PROMO_PERCENT)).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoSummary {
    pub subtotal: Decimal,
    pub displayed_total: Decimal,
    pub discount_applied: Percent,
    pub code_valid: bool,
}

/// Evaluates `code` against a fresh promo state.
pub fn evaluate(subtotal: Decimal, code: &str) -> PromoSummary {
    let mut state = PromoState::default();
    state.apply_code(code);
    state.summarize(subtotal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code() {
        let summary = evaluate(Decimal::from(100), " iloveart ");
        assert_eq!(summary.displayed_total, Decimal::new(7000, 2));
        assert!(summary.code_valid);
        assert_eq!(summary.discount_applied.value(), Decimal::from(30));
    }

    #[test]
    fn test_wrong_code_clears_prior_discount() {
        let mut state = PromoState::default();
        state.apply_code(PROMO_CODE);
        state.apply_code("WRONG");
        assert!(!state.code_valid());
        assert!(state.discount().is_zero());
        assert_eq!(state.displayed_total(Decimal::from(100)), Decimal::from(100));
    }

    #[test]
    fn test_rounding_to_cents() {
        let mut state = PromoState::default();
        state.apply_code(PROMO_CODE);
        // 33.35 * 0.7 = 23.345
        assert_eq!(state.displayed_total(Decimal::new(3335, 2)), Decimal::new(2335, 2));
    }

    #[test]
    fn test_default_state_is_valid_without_discount() {
        let state = PromoState::default();
        assert!(state.code_valid());
        assert_eq!(state.displayed_total(Decimal::new(1999, 2)), Decimal::new(1999, 2));
    }
}
