//! Product repository.
//!
//! Every write recomputes the derived `search_text` inside the same
//! statement batch as the mutation, so the cache can never go stale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shilpkaar_core::{AgeGroup, ArtisanId, Gender, Price, ProductId, Season};

use super::RepositoryError;
use crate::models::{Product, ProductDraft};
use crate::search_text::product_search_text;

const PRODUCT_COLUMNS: &str = "id, artisan_id, name, description, price, original_price, stock, \
     category, subcategory, craft, tags, materials, colors, techniques, occasions, \
     search_keywords, age_group, gender, season, sustainability, featured, trending, \
     is_active, rating, review_count, search_text, created_at, updated_at";

/// Database row for a product; converted to the domain type on read.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: i32,
    pub artisan_id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: i32,
    pub category: String,
    pub subcategory: Option<String>,
    pub craft: Option<String>,
    pub tags: Vec<String>,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub techniques: Vec<String>,
    pub occasions: Vec<String>,
    pub search_keywords: Vec<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
    pub season: Option<String>,
    pub sustainability: bool,
    pub featured: bool,
    pub trending: bool,
    pub is_active: bool,
    pub rating: f32,
    pub review_count: i32,
    pub search_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |e: shilpkaar_core::InvalidFacetValue| {
            RepositoryError::DataCorruption(format!("invalid facet in database: {e}"))
        };
        Ok(Self {
            id: ProductId::new(row.id),
            artisan_id: ArtisanId::new(row.artisan_id),
            name: row.name,
            description: row.description,
            price: Price::from(row.price),
            original_price: row.original_price.map(Price::from),
            stock: row.stock,
            category: row.category,
            subcategory: row.subcategory,
            craft: row.craft,
            tags: row.tags,
            materials: row.materials,
            colors: row.colors,
            techniques: row.techniques,
            occasions: row.occasions,
            search_keywords: row.search_keywords,
            age_group: row
                .age_group
                .as_deref()
                .map(AgeGroup::parse)
                .transpose()
                .map_err(corrupt)?,
            gender: row
                .gender
                .as_deref()
                .map(Gender::parse)
                .transpose()
                .map_err(corrupt)?,
            season: row
                .season
                .as_deref()
                .map(Season::parse)
                .transpose()
                .map_err(corrupt)?,
            sustainability: row.sustainability,
            featured: row.featured,
            trending: row.trending,
            is_active: row.is_active,
            rating: row.rating,
            review_count: row.review_count,
            search_text: row.search_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM marketplace.products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        row.map(Product::try_from).transpose()
    }

    /// List all active products, ordered by ID. Used to build the search index.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM marketplace.products WHERE is_active ORDER BY id"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    /// List an artisan's products (active and inactive), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_artisan(
        &self,
        artisan_id: ArtisanId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM marketplace.products \
             WHERE artisan_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(artisan_id.as_i32())
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Create a product for an artisan. The caller validates the draft.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        artisan_id: ArtisanId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let search_text = product_search_text(draft);
        let sql = format!(
            "INSERT INTO marketplace.products \
             (artisan_id, name, description, price, original_price, stock, category, \
              subcategory, craft, tags, materials, colors, techniques, occasions, \
              search_keywords, age_group, gender, season, sustainability, featured, \
              trending, search_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21, $22) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = bind_draft(
            sqlx::query_as::<_, ProductRow>(&sql).bind(artisan_id.as_i32()),
            draft,
            &search_text,
        )
        .fetch_one(self.pool)
        .await?;
        Product::try_from(row)
    }

    /// Replace a product's fields. Scoped to the owning artisan.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// belongs to another artisan.
    pub async fn update(
        &self,
        id: ProductId,
        artisan_id: ArtisanId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let search_text = product_search_text(draft);
        let sql = format!(
            "UPDATE marketplace.products SET \
             name = $3, description = $4, price = $5, original_price = $6, stock = $7, \
             category = $8, subcategory = $9, craft = $10, tags = $11, materials = $12, \
             colors = $13, techniques = $14, occasions = $15, search_keywords = $16, \
             age_group = $17, gender = $18, season = $19, sustainability = $20, \
             featured = $21, trending = $22, search_text = $23, updated_at = now() \
             WHERE id = $1 AND artisan_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = bind_draft_tail(
            sqlx::query_as::<_, ProductRow>(&sql)
                .bind(id.as_i32())
                .bind(artisan_id.as_i32()),
            draft,
            &search_text,
        )
        .fetch_optional(self.pool)
        .await?;
        row.map(Product::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a product by marking it inactive. Scoped to the owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// belongs to another artisan.
    pub async fn deactivate(
        &self,
        id: ProductId,
        artisan_id: ArtisanId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE marketplace.products SET is_active = false, updated_at = now() \
             WHERE id = $1 AND artisan_id = $2",
        )
        .bind(id.as_i32())
        .bind(artisan_id.as_i32())
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

type ProductQueryAs<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, ProductRow, sqlx::postgres::PgArguments>;

/// Bind the draft fields for INSERT (positions $2..$22 after artisan_id).
fn bind_draft<'q>(
    query: ProductQueryAs<'q>,
    draft: &'q ProductDraft,
    search_text: &'q str,
) -> ProductQueryAs<'q> {
    bind_draft_tail(query, draft, search_text)
}

/// Bind the shared draft-field tail used by both INSERT and UPDATE.
fn bind_draft_tail<'q>(
    query: ProductQueryAs<'q>,
    draft: &'q ProductDraft,
    search_text: &'q str,
) -> ProductQueryAs<'q> {
    query
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(draft.original_price.map(|p| p.amount()))
        .bind(draft.stock)
        .bind(&draft.category)
        .bind(&draft.subcategory)
        .bind(&draft.craft)
        .bind(&draft.tags)
        .bind(&draft.materials)
        .bind(&draft.colors)
        .bind(&draft.techniques)
        .bind(&draft.occasions)
        .bind(&draft.search_keywords)
        .bind(draft.age_group.map(AgeGroup::as_str))
        .bind(draft.gender.map(Gender::as_str))
        .bind(draft.season.map(Season::as_str))
        .bind(draft.sustainability)
        .bind(draft.featured)
        .bind(draft.trending)
        .bind(search_text)
}
