//! Favorite route handlers.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shilpkaar_catalog::Favorite;
use shilpkaar_catalog::db::FavoriteRepository;
use shilpkaar_core::ProductId;

use crate::error::Result;
use crate::middleware::CallerIdentity;
use crate::state::AppState;

/// Request body for the favorite toggle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub product_id: ProductId,
}

/// Response body for the favorite toggle.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// Whether the product is favorited after the toggle.
    pub favorited: bool,
}

/// `POST /api/favorites/toggle`
///
/// Toggles the caller's favorite on the product.
#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    let favorited = FavoriteRepository::new(state.pool())
        .toggle(caller.user_id, body.product_id)
        .await?;
    Ok(Json(ToggleResponse { favorited }))
}

/// `GET /api/favorites`
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Favorite>>> {
    let favorites = FavoriteRepository::new(state.pool())
        .list_for_user(caller.user_id)
        .await?;
    Ok(Json(favorites))
}
