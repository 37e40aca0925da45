//! Stripe Checkout client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use crate::config::PaymentConfig;
use crate::payment::{minor_units, CheckoutSession, LineItem, PaymentError, PaymentProvider, PaymentStatus, SessionStatus};

#[derive(Clone, Debug)]
pub struct StripeCheckout {
    http: Client,
    secret_key: String,
    api_base: String,
    currency: String,
    client_url: String,
}

#[derive(Deserialize)]
struct SessionBody {
    id: String,
    url: Option<String>,
    payment_status: String,
    client_reference_id: Option<String>,
    amount_total: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorBody { error: ErrorDetail }

#[derive(Deserialize)]
struct ErrorDetail { message: String }

impl StripeCheckout {
    pub fn new(secret_key: String, config: &PaymentConfig) -> Result<Self, PaymentError> {
        let http = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self {
            http,
            secret_key,
            api_base: config.stripe_api_base.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            client_url: config.client_url.clone(),
        })
    }

    /// Form fields for `POST /v1/checkout/sessions`.
    fn session_form(&self, items: &[LineItem], client_reference: &str) -> Result<Vec<(String, String)>, PaymentError> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), format!("{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}", self.client_url)),
            ("cancel_url".to_string(), format!("{}/cart", self.client_url)),
            ("client_reference_id".to_string(), client_reference.to_string()),
        ];
        for (i, item) in items.iter().enumerate() {
            let key = |field: &str| format!("line_items[{i}]{field}");
            form.push((key("[price_data][currency]"), self.currency.clone()));
            form.push((key("[price_data][product_data][name]"), item.title.clone()));
            form.push((key("[price_data][unit_amount]"), minor_units(item.price)?.to_string()));
            form.push((key("[quantity]"), item.quantity.to_string()));
        }
        Ok(form)
    }

    async fn read_session(response: reqwest::Response) -> Result<SessionBody, PaymentError> {
        let status = response.status();
        if status.is_success() { return Ok(response.json::<SessionBody>().await?); }
        let message = response.json::<ErrorBody>().await.map(|b| b.error.message).unwrap_or_else(|_| status.to_string());
        Err(PaymentError::Rejected { status: status.as_u16(), message })
    }
}

#[async_trait]
impl PaymentProvider for StripeCheckout {
    async fn create_checkout_session(&self, items: &[LineItem], client_reference: &str) -> Result<CheckoutSession, PaymentError> {
        let form = self.session_form(items, client_reference)?;
        let response = self.http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let body = Self::read_session(response).await?;
        let url = body.url.ok_or_else(|| PaymentError::Rejected { status: 200, message: "session has no checkout url".into() })?;
        tracing::info!(session_id = %body.id, lines = items.len(), "Checkout session created");
        Ok(CheckoutSession { session_id: body.id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, PaymentError> {
        let response = self.http
            .get(format!("{}/v1/checkout/sessions/{}", self.api_base, session_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::UnknownSession(session_id.to_string()));
        }
        let body = Self::read_session(response).await?;
        Ok(SessionStatus {
            id: body.id,
            status: PaymentStatus::parse(&body.payment_status),
            client_reference: body.client_reference_id,
            amount_total: body.amount_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentBackend;
    use rust_decimal::Decimal;

    fn client() -> StripeCheckout {
        let config = PaymentConfig {
            backend: PaymentBackend::Stripe { secret_key: "sk_test".into() },
            stripe_api_base: "https://api.stripe.com/".into(),
            currency: "usd".into(),
            client_url: "http://localhost:5173".into(),
            timeout_secs: 5,
        };
        StripeCheckout::new("sk_test".into(), &config).unwrap()
    }

    #[test]
    fn test_midpoint_unit_amount_rounds_up() {
        let items = vec![LineItem { title: "Half".into(), price: Decimal::new(10005, 3), quantity: 1 }];
        let form = client().session_form(&items, "user-1").unwrap();
        assert!(form.contains(&("line_items[0][price_data][unit_amount]".to_string(), "1001".to_string())));
    }

    #[test]
    fn test_session_body_carries_amount() {
        let body: SessionBody = serde_json::from_str(
            r#"{"id":"cs_1","url":null,"payment_status":"paid","client_reference_id":"u1","amount_total":30000}"#,
        ).unwrap();
        assert_eq!(body.amount_total, Some(30000));
        assert_eq!(PaymentStatus::parse(&body.payment_status), PaymentStatus::Paid);
    }

    #[test]
    fn test_session_form_fields() {
        let items = vec![
            LineItem { title: "Dawn".into(), price: Decimal::from(100), quantity: 3 },
            LineItem { title: "Dusk".into(), price: Decimal::new(4250, 2), quantity: 1 },
        ];
        let form = client().session_form(&items, "user-1").unwrap();
        let get = |k: &str| form.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("client_reference_id"), Some("user-1"));
        assert_eq!(get("success_url"), Some("http://localhost:5173/payment-success?session_id={CHECKOUT_SESSION_ID}"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("10000"));
        assert_eq!(get("line_items[0][quantity]"), Some("3"));
        assert_eq!(get("line_items[1][price_data][product_data][name]"), Some("Dusk"));
        assert_eq!(get("line_items[1][price_data][unit_amount]"), Some("4250"));
        assert_eq!(get("line_items[1][price_data][currency]"), Some("usd"));
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        assert_eq!(client().api_base, "https://api.stripe.com");
    }
}
