//! Product search and catalog route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use shilpkaar_catalog::db::{ArtisanRepository, ProductRepository};
use shilpkaar_catalog::{Product, ProductDraft, Validate};
use shilpkaar_core::ProductId;
use shilpkaar_search::{
    FilterOptions, ProductDoc, ProductQuery, ProductQueryParams, ProductSearchResponse, Suggestion,
    SuggestParams,
};

use crate::error::{ApiError, Result};
use crate::middleware::CallerIdentity;
use crate::state::AppState;

/// `GET /api/products/search`
///
/// Faceted product search. Invalid parameters are rejected with a 400 naming
/// the parameter; a still-building index returns 503 with `retryable: true`.
///
/// The response embeds the filter options for the matched corpus, so the UI
/// never offers a facet value that would yield zero results. If the option
/// aggregation fails the results still go out with `filters: null`.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<ProductQueryParams>,
) -> Result<Json<ProductSearchResponse>> {
    let query = params.into_query()?;
    let page = state.search().search_products(&query)?;
    let filters = cached_filter_options(&state, &query).await;

    Ok(Json(ProductSearchResponse {
        pagination: page.pagination(),
        products: page.hits,
        filters,
    }))
}

/// `GET /api/products/suggest`
///
/// Lightweight name suggestions for type-ahead.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<Suggestion>>> {
    let (input, limit) = params.into_parts();
    let suggestions = state.search().suggest(&input, limit)?;
    Ok(Json(suggestions))
}

/// Filter options for the corpus the query's facets allow, cached per facet
/// signature. A failed aggregation degrades to `None` rather than failing the
/// search that triggered it.
async fn cached_filter_options(state: &AppState, query: &ProductQuery) -> Option<FilterOptions> {
    let key = query.facet_signature();

    if let Some(options) = state.filter_cache().get(&key).await {
        return Some(options);
    }

    match state.search().filter_options(query) {
        Ok(options) => {
            state.filter_cache().insert(key, options.clone()).await;
            Some(options)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to aggregate filter options");
            None
        }
    }
}

/// `GET /api/products/{id}`
///
/// Inactive products are indistinguishable from absent ones.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// `POST /api/products`
#[instrument(skip(state, draft))]
pub async fn create_product(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let artisan_id = caller.require_artisan()?;
    draft.validate()?;

    let product = ProductRepository::new(state.pool())
        .create(artisan_id, &draft)
        .await?;
    refresh_product(&state, &product).await;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
#[instrument(skip(state, draft))]
pub async fn update_product(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<i32>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>> {
    let artisan_id = caller.require_artisan()?;
    draft.validate()?;

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), artisan_id, &draft)
        .await?;
    refresh_product(&state, &product).await;

    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
///
/// Soft delete: the product is deactivated and drops out of search and
/// listings, but existing orders keep referencing it.
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let artisan_id = caller.require_artisan()?;

    ProductRepository::new(state.pool())
        .deactivate(ProductId::new(id), artisan_id)
        .await?;

    if let Err(e) = state.search().remove_product(id) {
        tracing::warn!(error = %e, product_id = id, "Failed to remove product from search index");
    }
    state.invalidate_filter_cache();

    Ok(StatusCode::NO_CONTENT)
}

/// Push a product's current state into the search index.
///
/// The database row has already committed, so index failures are logged and
/// captured rather than failing the request; the next full rebuild converges.
pub(crate) async fn refresh_product(state: &AppState, product: &Product) {
    if !product.is_active {
        if let Err(e) = state.search().remove_product(product.id.as_i32()) {
            tracing::warn!(
                error = %e,
                product_id = product.id.as_i32(),
                "Failed to remove product from search index"
            );
        }
        state.invalidate_filter_cache();
        return;
    }

    // The artisan's location fields are denormalized into the product
    // document so location filters need no join at query time.
    let artisan = match ArtisanRepository::new(state.pool())
        .get(product.artisan_id)
        .await
    {
        Ok(artisan) => artisan,
        Err(e) => {
            tracing::warn!(
                error = %e,
                artisan_id = product.artisan_id.as_i32(),
                "Failed to load artisan for product document"
            );
            None
        }
    };

    let doc = ProductDoc::from_product(product, artisan.as_ref());
    if let Err(e) = state.search().upsert_product(&doc) {
        sentry::capture_error(&e);
        tracing::error!(
            error = %e,
            product_id = product.id.as_i32(),
            "Failed to upsert product into search index"
        );
    }
    state.invalidate_filter_cache();
}
