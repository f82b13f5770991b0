//! Favorite repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shilpkaar_core::{FavoriteId, ProductId, UserId};

use super::RepositoryError;
use crate::models::Favorite;

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: FavoriteId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for favorite database operations.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Toggle a favorite. Returns `true` when the product is now favorited.
    ///
    /// The (user, product) pair is unique; the insert-or-delete runs in one
    /// transaction so concurrent toggles settle on a single row at most.
    /// Deactivated products remain toggleable so a user can still clear
    /// them; only absent ids are rejected.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the product does not exist.
    /// - `RepositoryError::Database` if a query fails.
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM marketplace.products WHERE id = $1")
                .bind(product_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let inserted: Option<i32> = sqlx::query_scalar(
            "INSERT INTO marketplace.favorites (user_id, product_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, product_id) DO NOTHING RETURNING id",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let favorited = if inserted.is_some() {
            true
        } else {
            sqlx::query("DELETE FROM marketplace.favorites WHERE user_id = $1 AND product_id = $2")
                .bind(user_id.as_i32())
                .bind(product_id.as_i32())
                .execute(&mut *tx)
                .await?;
            false
        };

        tx.commit().await?;
        Ok(favorited)
    }

    /// List a user's favorites, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT id, user_id, product_id, created_at FROM marketplace.favorites \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }
}
