//! Cart routes.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use crate::api::extract::{ApiJson, ApiPath, AuthUser};
use crate::api::{message, ApiResult, AppState};
use crate::domain::aggregates::ResolvedCart;
use crate::domain::value_objects::Quantity;
use crate::service::promo::{self, PromoSummary};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub user_id: Uuid,
    pub artwork_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 { 1 }

#[derive(Debug, Deserialize)]
pub struct PromoRequest {
    pub code: String,
}

pub async fn add_item(State(s): State<AppState>, caller: AuthUser, ApiJson(r): ApiJson<CartItemRequest>) -> ApiResult<Json<ResolvedCart>> {
    caller.ensure_self_or_admin(r.user_id)?;
    let quantity = Quantity::new(r.quantity).map_err(crate::MarketError::from)?;
    Ok(Json(s.carts.add_item(r.user_id, r.artwork_id, quantity).await?))
}

pub async fn set_quantity(State(s): State<AppState>, caller: AuthUser, ApiJson(r): ApiJson<CartItemRequest>) -> ApiResult<Json<ResolvedCart>> {
    caller.ensure_self_or_admin(r.user_id)?;
    let quantity = Quantity::new(r.quantity).map_err(crate::MarketError::from)?;
    Ok(Json(s.carts.set_quantity(r.user_id, r.artwork_id, quantity).await?))
}

pub async fn remove_item(State(s): State<AppState>, caller: AuthUser, ApiPath((user_id, artwork_id)): ApiPath<(Uuid, Uuid)>) -> ApiResult<Json<ResolvedCart>> {
    caller.ensure_self_or_admin(user_id)?;
    Ok(Json(s.carts.remove_item(user_id, artwork_id).await?))
}

pub async fn clear(State(s): State<AppState>, caller: AuthUser, ApiPath(user_id): ApiPath<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    caller.ensure_self_or_admin(user_id)?;
    s.carts.clear(user_id).await?;
    Ok(message("Cart cleared successfully"))
}

pub async fn get_cart(State(s): State<AppState>, caller: AuthUser, ApiPath(user_id): ApiPath<Uuid>) -> ApiResult<Json<ResolvedCart>> {
    caller.ensure_self_or_admin(user_id)?;
    Ok(Json(s.carts.get(user_id).await?))
}

pub async fn promo(State(s): State<AppState>, caller: AuthUser, ApiPath(user_id): ApiPath<Uuid>, ApiJson(r): ApiJson<PromoRequest>) -> ApiResult<Json<PromoSummary>> {
    caller.ensure_self_or_admin(user_id)?;
    let cart = s.carts.get(user_id).await?;
    Ok(Json(promo::evaluate(cart.subtotal, &r.code)))
}
