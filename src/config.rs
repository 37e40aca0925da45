//! Configuration loaded from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent when `DATABASE_URL` is unset; the service then runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    pub nats_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// Seeded at startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Which checkout provider settles payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentBackend {
    Stripe { secret_key: String },
    /// In-process provider that marks every session paid. Opt-in only.
    Mock,
}

impl PaymentBackend {
    /// `PAYMENT_PROVIDER=mock` selects the mock. Otherwise a Stripe key is required.
    pub fn select(provider: Option<&str>, stripe_secret_key: Option<String>) -> Result<Self> {
        match provider.map(str::to_ascii_lowercase).as_deref() {
            Some("mock") => Ok(Self::Mock),
            None | Some("stripe") => stripe_secret_key
                .map(|secret_key| Self::Stripe { secret_key })
                .context("STRIPE_SECRET_KEY must be set (or PAYMENT_PROVIDER=mock for development)"),
            Some(other) => bail!("unknown PAYMENT_PROVIDER {other:?}, expected stripe or mock"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub backend: PaymentBackend,
    pub stripe_api_base: String,
    pub currency: String,
    /// Front-end origin used for checkout success and cancel redirects.
    pub client_url: String,
    pub timeout_secs: u64,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Fails only when `JWT_SECRET` is missing.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database: non_empty("DATABASE_URL").map(|url| DatabaseConfig {
                url,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10),
                acquire_timeout_secs: parsed("DATABASE_ACQUIRE_TIMEOUT", 30),
            }),
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("PORT", 8083),
            },
            auth: AuthConfig {
                jwt_secret: non_empty("JWT_SECRET").context("JWT_SECRET must be set")?,
                token_ttl_secs: parsed("TOKEN_TTL_SECS", 3600),
                admin_email: non_empty("ADMIN_EMAIL"),
                admin_password: non_empty("ADMIN_PASSWORD"),
            },
            payment: PaymentConfig {
                backend: PaymentBackend::select(non_empty("PAYMENT_PROVIDER").as_deref(), non_empty("STRIPE_SECRET_KEY"))?,
                stripe_api_base: env::var("STRIPE_API_BASE").unwrap_or_else(|_| "https://api.stripe.com".to_string()),
                currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "usd".to_string()).to_lowercase(),
                client_url: env::var("CLIENT_URL")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout_secs: parsed("PAYMENT_TIMEOUT_SECS", 30),
            },
            nats_url: non_empty("NATS_URL"),
        })
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.server.host, self.server.port) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_falls_back_on_garbage() {
        env::set_var("ART_MARKET_TEST_PORT", "not-a-port");
        assert_eq!(parsed::<u16>("ART_MARKET_TEST_PORT", 8083), 8083);
        env::set_var("ART_MARKET_TEST_PORT", "9000");
        assert_eq!(parsed::<u16>("ART_MARKET_TEST_PORT", 8083), 9000);
    }

    #[test]
    fn test_payment_backend_fails_closed() {
        assert!(PaymentBackend::select(None, None).is_err());
        assert!(PaymentBackend::select(Some("stripe"), None).is_err());
        assert!(PaymentBackend::select(Some("paypal"), Some("sk".into())).is_err());
        assert_eq!(PaymentBackend::select(Some("MOCK"), None).unwrap(), PaymentBackend::Mock);
        assert_eq!(
            PaymentBackend::select(None, Some("sk_live".into())).unwrap(),
            PaymentBackend::Stripe { secret_key: "sk_live".into() }
        );
    }

    #[test]
    fn test_blank_values_are_absent() {
        env::set_var("ART_MARKET_TEST_BLANK", "  ");
        assert_eq!(non_empty("ART_MARKET_TEST_BLANK"), None);
        assert_eq!(non_empty("ART_MARKET_TEST_UNSET"), None);
    }
}
