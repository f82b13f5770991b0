//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! # Products
//! GET    /api/products/search           - Faceted product search, filter options embedded
//! GET    /api/products/suggest          - Type-ahead suggestions
//! GET    /api/products/{id}             - Product detail
//! POST   /api/products                  - Create product (artisan)
//! PUT    /api/products/{id}             - Replace product (artisan, own)
//! DELETE /api/products/{id}             - Deactivate product (artisan, own)
//!
//! # Artisans
//! GET    /api/artisans/search           - Artisan search
//! GET    /api/artisans/{id}             - Artisan detail
//! PUT    /api/artisans/profile          - Update own searchable profile (artisan)
//!
//! # Orders
//! POST   /api/orders                    - Place order
//! GET    /api/orders                    - Own orders, newest first
//! GET    /api/orders/{id}               - Order detail (own)
//! PUT    /api/orders/{id}/status        - Fulfilment status change (artisan)
//!
//! # Reviews
//! GET    /api/products/{id}/reviews     - Reviews for a product
//! POST   /api/reviews                   - Create review
//! PUT    /api/reviews/{id}              - Update own review
//! DELETE /api/reviews/{id}              - Delete own review
//!
//! # Favorites
//! POST   /api/favorites/toggle          - Toggle favorite
//! GET    /api/favorites                 - Own favorites
//! ```

pub mod artisans;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Products
        .route("/api/products/search", get(products::search))
        .route("/api/products/suggest", get(products::suggest))
        .route("/api/products", post(products::create_product))
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Artisans
        .route("/api/artisans/search", get(artisans::search))
        .route("/api/artisans/profile", put(artisans::update_profile))
        .route("/api/artisans/{id}", get(artisans::get_artisan))
        // Orders
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/status", put(orders::update_order_status))
        // Reviews
        .route("/api/products/{id}/reviews", get(reviews::list_for_product))
        .route("/api/reviews", post(reviews::create_review))
        .route(
            "/api/reviews/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        // Favorites
        .route("/api/favorites/toggle", post(favorites::toggle))
        .route("/api/favorites", get(favorites::list))
}
