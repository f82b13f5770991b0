//! Database operations for the marketplace `PostgreSQL` schema.
//!
//! # Tables (`marketplace` schema)
//!
//! - `users` - Customers and artisans (artisans carry the search profile)
//! - `products` - Catalog products with the derived `search_text` cache
//! - `orders` / `order_items` - Orders with price snapshots
//! - `reviews` - One review per (user, product); feeds the rating aggregate
//! - `favorites` - Unique (user, product) pairs
//!
//! # Migrations
//!
//! Migrations are stored in `crates/catalog/migrations/` and run via:
//! ```bash
//! cargo run -p shilpkaar-cli -- migrate
//! ```
//!
//! All queries are runtime-checked (`sqlx::query`/`query_as`), so the
//! workspace builds without a live database.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shilpkaar_core::OrderStatus;

pub mod artisans;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod reviews;

pub use artisans::ArtisanRepository;
pub use favorites::FavoriteRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced entity does not exist (or is not visible to the caller).
    #[error("Not found")]
    NotFound,

    /// A uniqueness or stock constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data failed domain conversion.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// The requested order status change is not a legal transition.
    #[error("Illegal status transition: {from:?} -> {to:?}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The pool is constructed explicitly and passed down by the caller; there
/// is no process-global connection state. Callers own the lifecycle: open at
/// startup, `close()` at shutdown.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
