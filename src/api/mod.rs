//! HTTP interface. Everything except `/health` lives under `/api`.

pub mod accounts;
pub mod artworks;
pub mod cart;
pub mod community;
pub mod error;
pub mod extract;
pub mod orders;
pub mod payment;
pub mod users;

pub use error::ApiError;

use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::auth::TokenKeys;
use crate::payment::PaymentProvider;
use crate::publisher::EventPublisher;
use crate::service::{Accounts, CartEngine, Catalog, CheckoutBridge, Community, Profiles, Settlement};
use crate::store::MarketStore;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub carts: CartEngine,
    pub checkout: CheckoutBridge,
    pub settlement: Settlement,
    pub catalog: Catalog,
    pub accounts: Accounts,
    pub profiles: Profiles,
    pub community: Community,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MarketStore>,
        payments: Arc<dyn PaymentProvider>,
        events: Arc<dyn EventPublisher>,
        tokens: TokenKeys,
    ) -> Self {
        Self {
            carts: CartEngine::new(store.clone(), events.clone()),
            checkout: CheckoutBridge::new(store.clone(), payments.clone()),
            settlement: Settlement::new(store.clone(), payments, events),
            catalog: Catalog::new(store.clone()),
            profiles: Profiles::new(store.clone()),
            community: Community::new(store.clone()),
            accounts: Accounts::new(store, tokens.clone()),
            tokens,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/cart/add", post(cart::add_item))
        .route("/cart/update", put(cart::set_quantity))
        .route("/cart/remove/:user_id/:artwork_id", delete(cart::remove_item))
        .route("/cart/clear/:user_id", delete(cart::clear))
        .route("/cart/:user_id", get(cart::get_cart))
        .route("/cart/:user_id/promo", post(cart::promo))
        .route("/payment/create-checkout-session", post(payment::create_checkout_session))
        .route("/payment/confirm", post(payment::confirm))
        .route("/orders/create", post(orders::create))
        .route("/orders/:user_id", get(orders::history))
        .route("/admin/revenue", get(orders::revenue))
        .route("/artworks", get(artworks::list).post(artworks::create))
        .route("/artworks/seller", get(artworks::seller_listings))
        .route("/artworks/:id", get(artworks::get).put(artworks::update).delete(artworks::delete))
        .route("/auth/register", post(accounts::register))
        .route("/auth/login", post(accounts::login))
        .route("/users/me", get(users::me))
        .route("/users/favorites", get(users::favorites))
        .route("/users/favorites/:artwork_id", post(users::toggle_favorite))
        .route("/users/favorite/:artwork_id", patch(users::toggle_favorite))
        .route("/users/:id", get(users::get).put(users::update).delete(users::delete))
        .route("/users/:id/password", put(users::change_password))
        .route("/events", get(community::list).post(community::create))
        .route("/events/:id", get(community::get).put(community::update).delete(community::delete));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "art-marketplace"})) }))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `{message}` response body.
pub(crate) fn message(text: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": text }))
}
