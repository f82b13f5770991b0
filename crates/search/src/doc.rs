//! Index documents.
//!
//! The index stores a denormalized snapshot of each searchable entity. A
//! product document carries its artisan's location and region so location
//! filters need no join at query time; the snapshot is refreshed whenever
//! the product or the artisan profile is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shilpkaar_catalog::models::{Artisan, Product};
use shilpkaar_core::{AgeGroup, Gender, Season};

/// Kind discriminator for documents sharing the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Product,
    Artisan,
}

impl DocKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Artisan => "artisan",
        }
    }
}

/// A product as stored in the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: i32,
    pub artisan_id: i32,
    pub name: String,
    pub description: String,
    /// Price in paise; the sort and range-filter key.
    pub price_paise: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price_paise: Option<u64>,
    pub stock: i32,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft: Option<String>,
    pub tags: Vec<String>,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub techniques: Vec<String>,
    pub occasions: Vec<String>,
    pub search_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    pub sustainability: bool,
    pub featured: bool,
    pub trending: bool,
    pub rating: f32,
    pub review_count: i32,
    /// Artisan location snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Artisan region snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductDoc {
    /// Snapshot a product, denormalizing the owning artisan's location.
    #[must_use]
    pub fn from_product(product: &Product, artisan: Option<&Artisan>) -> Self {
        Self {
            id: product.id.as_i32(),
            artisan_id: product.artisan_id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price_paise: product.price.as_paise(),
            original_price_paise: product.original_price.map(|p| p.as_paise()),
            stock: product.stock,
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            craft: product.craft.clone(),
            tags: product.tags.clone(),
            materials: product.materials.clone(),
            colors: product.colors.clone(),
            techniques: product.techniques.clone(),
            occasions: product.occasions.clone(),
            search_keywords: product.search_keywords.clone(),
            age_group: product.age_group,
            gender: product.gender,
            season: product.season,
            sustainability: product.sustainability,
            featured: product.featured,
            trending: product.trending,
            rating: product.rating,
            review_count: product.review_count,
            location: artisan.and_then(|a| a.location.clone()),
            region: artisan.and_then(|a| a.region.clone()),
            created_at: product.created_at,
        }
    }

    /// Stable identity term; upserts delete by this before re-adding.
    #[must_use]
    pub fn uid(&self) -> String {
        product_uid(self.id)
    }

    /// Rating in tenths, the index's range-filter key.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rating_tenths(&self) -> u64 {
        (f64::from(self.rating.max(0.0)) * 10.0).round() as u64
    }

    /// Body text for one weighted field of the ranking configuration.
    #[must_use]
    pub fn text_value(&self, field: &str) -> Option<String> {
        let joined = |values: &[String]| {
            if values.is_empty() {
                None
            } else {
                Some(values.join(" "))
            }
        };
        match field {
            "name" => Some(self.name.clone()),
            "description" => Some(self.description.clone()),
            "category" => Some(self.category.clone()),
            "craft" => self.craft.clone(),
            "tags" => joined(&self.tags),
            "materials" => joined(&self.materials),
            "colors" => joined(&self.colors),
            "techniques" => joined(&self.techniques),
            "occasions" => joined(&self.occasions),
            "search_keywords" => joined(&self.search_keywords),
            _ => None,
        }
    }
}

/// An artisan as stored in the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanDoc {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft: Option<String>,
    pub crafts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub techniques: Vec<String>,
    pub specializations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub rating: f32,
    pub review_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl ArtisanDoc {
    #[must_use]
    pub fn from_artisan(artisan: &Artisan) -> Self {
        Self {
            id: artisan.id.as_i32(),
            name: artisan.name.clone(),
            craft: artisan.craft.clone(),
            crafts: artisan.crafts.clone(),
            location: artisan.location.clone(),
            region: artisan.region.clone(),
            techniques: artisan.techniques.clone(),
            specializations: artisan.specializations.clone(),
            bio: artisan.bio.clone(),
            rating: artisan.rating,
            review_count: artisan.review_count,
            is_verified: artisan.is_verified,
            created_at: artisan.created_at,
        }
    }

    /// Stable identity term; upserts delete by this before re-adding.
    #[must_use]
    pub fn uid(&self) -> String {
        artisan_uid(self.id)
    }

    /// Rating in tenths, the index's range-filter key.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rating_tenths(&self) -> u64 {
        (f64::from(self.rating.max(0.0)) * 10.0).round() as u64
    }

    /// Body text for one weighted field of the ranking configuration.
    #[must_use]
    pub fn text_value(&self, field: &str) -> Option<String> {
        let joined = |values: &[String]| {
            if values.is_empty() {
                None
            } else {
                Some(values.join(" "))
            }
        };
        match field {
            "name" => Some(self.name.clone()),
            "craft" => self.craft.clone(),
            "crafts" => joined(&self.crafts),
            "location" => self.location.clone(),
            "region" => self.region.clone(),
            "techniques" => joined(&self.techniques),
            "specializations" => joined(&self.specializations),
            "bio" => self.bio.clone(),
            _ => None,
        }
    }
}

/// Identity term for a product document.
#[must_use]
pub fn product_uid(id: i32) -> String {
    format!("product-{id}")
}

/// Identity term for an artisan document.
#[must_use]
pub fn artisan_uid(id: i32) -> String {
    format!("artisan-{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_is_kind_scoped() {
        assert_eq!(product_uid(7), "product-7");
        assert_eq!(artisan_uid(7), "artisan-7");
        assert_ne!(product_uid(7), artisan_uid(7));
    }

    #[test]
    fn test_rating_tenths_rounds() {
        let mut doc = sample_product_doc();
        doc.rating = 4.26;
        assert_eq!(doc.rating_tenths(), 43);
        doc.rating = 0.0;
        assert_eq!(doc.rating_tenths(), 0);
    }

    #[test]
    fn test_text_value_covers_weighted_fields() {
        let doc = sample_product_doc();
        for field in crate::ranking::RankingConfig::current()
            .product_weights
            .iter()
            .map(|w| w.field.as_str())
        {
            assert!(
                doc.text_value(field).is_some(),
                "no text for weighted field {field}"
            );
        }
    }

    fn sample_product_doc() -> ProductDoc {
        ProductDoc {
            id: 1,
            artisan_id: 2,
            name: "Blue Pottery Vase".to_string(),
            description: "Hand-glazed vase".to_string(),
            price_paise: 150_000,
            original_price_paise: None,
            stock: 4,
            category: "pottery".to_string(),
            subcategory: None,
            craft: Some("blue_pottery".to_string()),
            tags: vec!["ceramic".to_string()],
            materials: vec!["clay".to_string()],
            colors: vec!["blue".to_string()],
            techniques: vec!["glazing".to_string()],
            occasions: vec!["home".to_string()],
            search_keywords: vec!["vase".to_string()],
            age_group: None,
            gender: None,
            season: None,
            sustainability: true,
            featured: false,
            trending: false,
            rating: 4.5,
            review_count: 12,
            location: Some("Jaipur".to_string()),
            region: Some("north".to_string()),
            created_at: Utc::now(),
        }
    }
}
