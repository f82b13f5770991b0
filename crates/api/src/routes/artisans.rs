//! Artisan search and profile route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use shilpkaar_catalog::db::{ArtisanRepository, ProductRepository};
use shilpkaar_catalog::{Artisan, ArtisanProfileDraft, Validate};
use shilpkaar_core::{ArtisanId, UserRole};
use shilpkaar_search::{ArtisanDoc, ArtisanQueryParams, ArtisanSearchResponse, ProductDoc};

use crate::error::{ApiError, Result};
use crate::middleware::CallerIdentity;
use crate::state::AppState;

/// `GET /api/artisans/search`
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<ArtisanQueryParams>,
) -> Result<Json<ArtisanSearchResponse>> {
    let query = params.into_query()?;
    let page = state.search().search_artisans(&query)?;
    Ok(Json(ArtisanSearchResponse {
        pagination: page.pagination(),
        artisans: page.hits,
    }))
}

/// `GET /api/artisans/{id}`
///
/// Customers and deactivated artisans are indistinguishable from absent ones.
#[instrument(skip(state))]
pub async fn get_artisan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Artisan>> {
    let artisan = ArtisanRepository::new(state.pool())
        .get(ArtisanId::new(id))
        .await?
        .filter(|a| a.role == UserRole::Artisan && a.is_active)
        .ok_or_else(|| ApiError::NotFound(format!("artisan {id}")))?;
    Ok(Json(artisan))
}

/// `PUT /api/artisans/profile`
///
/// Updates the caller's own searchable profile.
#[instrument(skip(state, draft))]
pub async fn update_profile(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(draft): Json<ArtisanProfileDraft>,
) -> Result<Json<Artisan>> {
    let artisan_id = caller.require_artisan()?;
    draft.validate()?;

    let artisan = ArtisanRepository::new(state.pool())
        .update_profile(artisan_id, &draft)
        .await?;
    refresh_artisan(&state, &artisan).await;

    Ok(Json(artisan))
}

/// Push an artisan's current state into the search index, along with every
/// active product of theirs.
///
/// Product documents carry the artisan's location fields, so a profile edit
/// must rewrite them too. The database row has already committed; index
/// failures are logged and the next full rebuild converges.
async fn refresh_artisan(state: &AppState, artisan: &Artisan) {
    let doc = ArtisanDoc::from_artisan(artisan);
    if let Err(e) = state.search().upsert_artisan(&doc) {
        sentry::capture_error(&e);
        tracing::error!(
            error = %e,
            artisan_id = artisan.id.as_i32(),
            "Failed to upsert artisan into search index"
        );
        return;
    }

    let products = match ProductRepository::new(state.pool())
        .list_by_artisan(artisan.id)
        .await
    {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(
                error = %e,
                artisan_id = artisan.id.as_i32(),
                "Failed to list products for artisan document refresh"
            );
            return;
        }
    };

    for product in products.iter().filter(|p| p.is_active) {
        let doc = ProductDoc::from_product(product, Some(artisan));
        if let Err(e) = state.search().upsert_product(&doc) {
            tracing::warn!(
                error = %e,
                product_id = product.id.as_i32(),
                "Failed to refresh product after profile update"
            );
        }
    }
    state.invalidate_filter_cache();
}
