//! Order route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use shilpkaar_catalog::db::OrderRepository;
use shilpkaar_catalog::{NewOrder, Order, Validate};
use shilpkaar_core::{OrderId, OrderStatus};

use crate::error::{ApiError, Result};
use crate::middleware::CallerIdentity;
use crate::state::AppState;

/// `POST /api/orders`
///
/// Places an order for the caller. Line items snapshot the current product
/// price; stock is checked and decremented in the same transaction.
#[instrument(skip(state, new_order))]
pub async fn create_order(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(new_order): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    new_order.validate()?;

    let order = OrderRepository::new(state.pool())
        .create(caller.user_id, &new_order)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`
///
/// The caller's orders, newest first.
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(caller.user_id)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
///
/// Orders are only visible to the customer who placed them.
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id), caller.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

/// Body for `PUT /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// `PUT /api/orders/{id}/status`
///
/// Fulfilment-side status change. Illegal transitions are a 409, not a
/// silent overwrite.
#[instrument(skip(state))]
pub async fn update_order_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<i32>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    caller.require_artisan()?;

    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), update.status)
        .await?;
    Ok(Json(order))
}
