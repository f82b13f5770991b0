//! Review repository.
//!
//! The product's denormalized `rating`/`review_count` are recomputed inside
//! the same transaction as every review mutation, never via implicit hooks.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use shilpkaar_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::aggregate_rating;
use crate::models::{Review, ReviewDraft};

const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, rating, comment, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM marketplace.reviews \
             WHERE product_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(product_id.as_i32())
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Create a review. One review per (user, product) pair.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Conflict` if the user already reviewed the product.
    /// - `RepositoryError::NotFound` if the product does not exist.
    pub async fn create(
        &self,
        user_id: UserId,
        draft: &ReviewDraft,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM marketplace.products WHERE id = $1 FOR UPDATE")
                .bind(draft.product_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let sql = format!(
            "INSERT INTO marketplace.reviews (product_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4) RETURNING {REVIEW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(draft.product_id.as_i32())
            .bind(user_id.as_i32())
            .bind(draft.rating)
            .bind(&draft.comment)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    RepositoryError::Conflict("user has already reviewed this product".to_string())
                }
                other => RepositoryError::Database(other),
            })?;

        recompute_product_rating(&mut tx, draft.product_id).await?;
        tx.commit().await?;
        Ok(Review::from(row))
    }

    /// Update the caller's review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist or
    /// belongs to another user.
    pub async fn update(
        &self,
        id: ReviewId,
        user_id: UserId,
        draft: &ReviewDraft,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE marketplace.reviews SET rating = $3, comment = $4, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {REVIEW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.as_i32())
            .bind(user_id.as_i32())
            .bind(draft.rating)
            .bind(&draft.comment)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        recompute_product_rating(&mut tx, ProductId::new(row.product_id)).await?;
        tx.commit().await?;
        Ok(Review::from(row))
    }

    /// Delete the caller's review. Returns the affected product's id so the
    /// caller can refresh anything derived from the rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist or
    /// belongs to another user.
    pub async fn delete(&self, id: ReviewId, user_id: UserId) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_id: Option<i32> = sqlx::query_scalar(
            "DELETE FROM marketplace.reviews WHERE id = $1 AND user_id = $2 RETURNING product_id",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;
        let product_id = ProductId::new(product_id.ok_or(RepositoryError::NotFound)?);

        recompute_product_rating(&mut tx, product_id).await?;
        tx.commit().await?;
        Ok(product_id)
    }
}

/// Recompute a product's rating aggregate from its current reviews.
async fn recompute_product_rating(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    let ratings: Vec<i16> =
        sqlx::query_scalar("SELECT rating FROM marketplace.reviews WHERE product_id = $1")
            .bind(product_id.as_i32())
            .fetch_all(&mut **tx)
            .await?;

    let (rating, review_count) = aggregate_rating(&ratings);

    sqlx::query(
        "UPDATE marketplace.products SET rating = $2, review_count = $3, updated_at = now() \
         WHERE id = $1",
    )
    .bind(product_id.as_i32())
    .bind(rating)
    .bind(review_count)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
