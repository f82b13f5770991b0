//! Versioned ranking configuration.
//!
//! Field weights and compound-index declarations live here as plain
//! configuration data rather than inside the entity definitions, so ranking
//! can be retuned (and the change reviewed and tested) without touching the
//! schema layer. The tantivy schema is generated from the weight tables;
//! the compound-index list mirrors the accelerated lookups created by the
//! SQL migrations.

use serde::{Deserialize, Serialize};

/// Relative relevance weight of one source field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWeight {
    pub field: String,
    pub weight: f32,
}

impl FieldWeight {
    fn new(field: &str, weight: f32) -> Self {
        Self {
            field: field.to_string(),
            weight,
        }
    }
}

/// A multi-column lookup the persistence layer accelerates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundIndex {
    pub name: String,
    pub columns: Vec<String>,
}

impl CompoundIndex {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The full ranking configuration, versioned so index rebuilds can detect
/// a stale on-disk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub version: u32,
    pub product_weights: Vec<FieldWeight>,
    pub artisan_weights: Vec<FieldWeight>,
    pub compound_indexes: Vec<CompoundIndex>,
}

impl RankingConfig {
    /// The active configuration.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: 1,
            product_weights: vec![
                FieldWeight::new("name", 10.0),
                FieldWeight::new("tags", 8.0),
                FieldWeight::new("category", 6.0),
                FieldWeight::new("craft", 6.0),
                FieldWeight::new("search_keywords", 5.0),
                FieldWeight::new("materials", 4.0),
                FieldWeight::new("colors", 3.0),
                FieldWeight::new("techniques", 3.0),
                FieldWeight::new("occasions", 3.0),
                FieldWeight::new("description", 2.0),
            ],
            artisan_weights: vec![
                FieldWeight::new("name", 10.0),
                FieldWeight::new("craft", 8.0),
                FieldWeight::new("crafts", 8.0),
                FieldWeight::new("location", 6.0),
                FieldWeight::new("region", 5.0),
                FieldWeight::new("techniques", 4.0),
                FieldWeight::new("specializations", 4.0),
                FieldWeight::new("bio", 2.0),
            ],
            compound_indexes: vec![
                CompoundIndex::new("products_artisan_active", &["artisan_id", "is_active"]),
                CompoundIndex::new("products_category_active", &["category", "is_active"]),
                CompoundIndex::new("orders_customer_created", &["customer_id", "created_at"]),
                CompoundIndex::new("reviews_product_user", &["product_id", "user_id"]),
                CompoundIndex::new("favorites_user_product", &["user_id", "product_id"]),
            ],
        }
    }

    /// Look up the weight for a product field, defaulting to 1.0 for
    /// unlisted fields.
    #[must_use]
    pub fn product_weight(&self, field: &str) -> f32 {
        self.product_weights
            .iter()
            .find(|w| w.field == field)
            .map_or(1.0, |w| w.weight)
    }

    /// Look up the weight for an artisan field, defaulting to 1.0.
    #[must_use]
    pub fn artisan_weight(&self, field: &str) -> f32 {
        self.artisan_weights
            .iter()
            .find(|w| w.field == field)
            .map_or(1.0, |w| w.weight)
    }
}
