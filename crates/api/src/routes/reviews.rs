//! Review route handlers.
//!
//! Review writes change the product's denormalized rating aggregate, so each
//! mutation refreshes the product's search document afterwards.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use shilpkaar_catalog::db::{ProductRepository, ReviewRepository};
use shilpkaar_catalog::{Review, ReviewDraft, Validate};
use shilpkaar_core::{ProductId, ReviewId};

use crate::error::Result;
use crate::middleware::CallerIdentity;
use crate::routes::products::refresh_product;
use crate::state::AppState;

/// `GET /api/products/{id}/reviews`
#[instrument(skip(state))]
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(ProductId::new(product_id))
        .await?;
    Ok(Json(reviews))
}

/// `POST /api/reviews`
///
/// One review per (user, product) pair; a second attempt is a 409.
#[instrument(skip(state, draft))]
pub async fn create_review(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(draft): Json<ReviewDraft>,
) -> Result<(StatusCode, Json<Review>)> {
    draft.validate()?;

    let review = ReviewRepository::new(state.pool())
        .create(caller.user_id, &draft)
        .await?;
    refresh_rated_product(&state, review.product_id).await;

    Ok((StatusCode::CREATED, Json(review)))
}

/// `PUT /api/reviews/{id}`
#[instrument(skip(state, draft))]
pub async fn update_review(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<i32>,
    Json(draft): Json<ReviewDraft>,
) -> Result<Json<Review>> {
    draft.validate()?;

    let review = ReviewRepository::new(state.pool())
        .update(ReviewId::new(id), caller.user_id, &draft)
        .await?;
    refresh_rated_product(&state, review.product_id).await;

    Ok(Json(review))
}

/// `DELETE /api/reviews/{id}`
#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let product_id = ReviewRepository::new(state.pool())
        .delete(ReviewId::new(id), caller.user_id)
        .await?;
    refresh_rated_product(&state, product_id).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Re-read the product and push its updated rating into the search index.
async fn refresh_rated_product(state: &AppState, product_id: ProductId) {
    match ProductRepository::new(state.pool()).get(product_id).await {
        Ok(Some(product)) => refresh_product(state, &product).await,
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(
                error = %e,
                product_id = product_id.as_i32(),
                "Failed to reload product after review change"
            );
        }
    }
}
