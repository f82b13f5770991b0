//! Artisan (user) repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shilpkaar_core::{ArtisanId, UserRole};

use super::RepositoryError;
use crate::models::{Artisan, ArtisanProfileDraft};
use crate::search_text::artisan_search_text;

const ARTISAN_COLUMNS: &str = "id, name, role, craft, crafts, location, region, state, city, \
     techniques, specializations, certifications, languages, bio, rating, review_count, \
     is_verified, is_active, search_text, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ArtisanRow {
    id: i32,
    name: String,
    role: UserRole,
    craft: Option<String>,
    crafts: Vec<String>,
    location: Option<String>,
    region: Option<String>,
    state: Option<String>,
    city: Option<String>,
    techniques: Vec<String>,
    specializations: Vec<String>,
    certifications: Vec<String>,
    languages: Vec<String>,
    bio: Option<String>,
    rating: f32,
    review_count: i32,
    is_verified: bool,
    is_active: bool,
    search_text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArtisanRow> for Artisan {
    fn from(row: ArtisanRow) -> Self {
        Self {
            id: ArtisanId::new(row.id),
            name: row.name,
            role: row.role,
            craft: row.craft,
            crafts: row.crafts,
            location: row.location,
            region: row.region,
            state: row.state,
            city: row.city,
            techniques: row.techniques,
            specializations: row.specializations,
            certifications: row.certifications,
            languages: row.languages,
            bio: row.bio,
            rating: row.rating,
            review_count: row.review_count,
            is_verified: row.is_verified,
            is_active: row.is_active,
            search_text: row.search_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for artisan/user database operations.
pub struct ArtisanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ArtisanRepository<'a> {
    /// Create a new artisan repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ArtisanId) -> Result<Option<Artisan>, RepositoryError> {
        let sql = format!("SELECT {ARTISAN_COLUMNS} FROM marketplace.users WHERE id = $1");
        let row = sqlx::query_as::<_, ArtisanRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Artisan::from))
    }

    /// List active artisan-role users, ordered by ID. Used to build the
    /// artisan search index.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_artisans(&self) -> Result<Vec<Artisan>, RepositoryError> {
        let sql = format!(
            "SELECT {ARTISAN_COLUMNS} FROM marketplace.users \
             WHERE role = 'artisan' AND is_active ORDER BY id"
        );
        let rows = sqlx::query_as::<_, ArtisanRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Artisan::from).collect())
    }

    /// Create a user. Used by seeding; account provisioning itself lives
    /// upstream of this service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        role: UserRole,
    ) -> Result<Artisan, RepositoryError> {
        let sql = format!(
            "INSERT INTO marketplace.users (name, role) VALUES ($1, $2) \
             RETURNING {ARTISAN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ArtisanRow>(&sql)
            .bind(name)
            .bind(role)
            .fetch_one(self.pool)
            .await?;
        Ok(Artisan::from(row))
    }

    /// Replace an artisan's searchable profile, recomputing `search_text`
    /// from the stored role in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        id: ArtisanId,
        draft: &ArtisanProfileDraft,
    ) -> Result<Artisan, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let role: Option<UserRole> =
            sqlx::query_scalar("SELECT role FROM marketplace.users WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        let role = role.ok_or(RepositoryError::NotFound)?;

        // search_text stays empty for customer-role users.
        let search_text = artisan_search_text(role, draft);

        let sql = format!(
            "UPDATE marketplace.users SET \
             name = $2, craft = $3, crafts = $4, location = $5, region = $6, state = $7, \
             city = $8, techniques = $9, specializations = $10, certifications = $11, \
             languages = $12, bio = $13, search_text = $14, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ARTISAN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ArtisanRow>(&sql)
            .bind(id.as_i32())
            .bind(&draft.name)
            .bind(&draft.craft)
            .bind(&draft.crafts)
            .bind(&draft.location)
            .bind(&draft.region)
            .bind(&draft.state)
            .bind(&draft.city)
            .bind(&draft.techniques)
            .bind(&draft.specializations)
            .bind(&draft.certifications)
            .bind(&draft.languages)
            .bind(&draft.bio)
            .bind(&search_text)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Artisan::from(row))
    }
}
