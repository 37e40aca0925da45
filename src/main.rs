//! Art Marketplace - artwork catalog, carts, checkout and order settlement

use anyhow::Result;
use art_marketplace::api::{router, AppState};
use art_marketplace::auth::TokenKeys;
use art_marketplace::config::{Config, PaymentBackend};
use art_marketplace::payment::{MockPaymentProvider, PaymentProvider, StripeCheckout};
use art_marketplace::publisher::{EventPublisher, LogPublisher, NatsPublisher};
use art_marketplace::store::{MarketStore, MemoryStore, PgStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let store: Arc<dyn MarketStore> = match &config.database {
        Some(db) => {
            let pg = PgStore::connect(db).await?;
            pg.migrate().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let payments: Arc<dyn PaymentProvider> = match &config.payment.backend {
        PaymentBackend::Stripe { secret_key } => Arc::new(StripeCheckout::new(secret_key.clone(), &config.payment)?),
        PaymentBackend::Mock => {
            tracing::warn!("PAYMENT_PROVIDER=mock, checkout sessions are paid immediately without charging");
            Arc::new(MockPaymentProvider::auto_paying())
        }
    };

    let events: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match NatsPublisher::connect(url).await {
            Ok(nats) => Arc::new(nats),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, events will only be logged");
                Arc::new(LogPublisher)
            }
        },
        None => Arc::new(LogPublisher),
    };

    let state = AppState::new(store, payments, events, TokenKeys::new(&config.auth.jwt_secret, config.auth.token_ttl_secs));
    if let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password) {
        state.accounts.ensure_admin(email, password).await?;
    }

    let app = router(state);
    let addr = config.bind_addr();
    tracing::info!("🚀 Art Marketplace listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
