//! Shilpkaar Catalog - Entity schemas and Postgres persistence.
//!
//! This crate owns the marketplace data model:
//!
//! - [`models`] - Product, Artisan, Order, Review, and Favorite domain types
//! - [`validate`] - Structured field validation for write payloads
//! - [`search_text`] - Pure derivation of the cached `search_text` field
//! - [`db`] - sqlx repositories with explicit pool lifecycle
//!
//! # Derived fields
//!
//! `search_text` on products and artisans and `rating`/`review_count` on
//! products are caches, not sources of truth. Every repository write path
//! recomputes them inside the same transaction as the mutation, so they can
//! never drift from their source fields.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod db;
pub mod models;
pub mod search_text;
pub mod validate;

pub use db::{RepositoryError, create_pool};
pub use models::*;
pub use validate::{FieldViolation, Validate, ValidationError};

/// Embedded database migrations, run via `shilpkaar-cli migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
