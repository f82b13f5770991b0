//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shilpkaar_core::{AgeGroup, ArtisanId, Gender, Price, ProductId, Season};

use crate::validate::{Validate, ValidationError, Violations};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Artisan who owns this product.
    pub artisan_id: ArtisanId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Pre-discount price, when the product is on offer.
    pub original_price: Option<Price>,
    /// Units in stock.
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
    pub age_group: Option<AgeGroup>,
    pub gender: Option<Gender>,
    pub season: Option<Season>,
    pub sustainability: bool,
    pub featured: bool,
    pub trending: bool,
    /// Inactive products are hidden from search and listings.
    pub is_active: bool,
    /// Denormalized mean review rating, 1 decimal place. Derived from reviews.
    pub rating: f32,
    /// Denormalized review count. Derived from reviews.
    pub review_count: i32,
    /// Derived concatenation of all textual fields. Recomputed on every write.
    pub search_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for creating or replacing a product.
///
/// Derived fields (`search_text`, `rating`, `review_count`) are never part of
/// the payload; the repository computes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    pub stock: i32,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub craft: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub sustainability: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub trending: bool,
}

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;

impl Validate for ProductDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();

        if self.name.trim().is_empty() {
            v.add("name", "must not be empty");
        } else if self.name.len() > MAX_NAME_LEN {
            v.add("name", format!("must be at most {MAX_NAME_LEN} characters"));
        }

        if self.description.trim().is_empty() {
            v.add("description", "must not be empty");
        } else if self.description.len() > MAX_DESCRIPTION_LEN {
            v.add(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }

        if self.price.is_negative() {
            v.add("price", "must not be negative");
        }
        if self.original_price.is_some_and(|p| p.is_negative()) {
            v.add("originalPrice", "must not be negative");
        }
        if self.stock < 0 {
            v.add("stock", "must not be negative");
        }
        if self.category.trim().is_empty() {
            v.add("category", "must not be empty");
        }

        for (field, values) in [
            ("tags", &self.tags),
            ("materials", &self.materials),
            ("colors", &self.colors),
            ("techniques", &self.techniques),
            ("occasions", &self.occasions),
            ("searchKeywords", &self.search_keywords),
        ] {
            if values.iter().any(|s| s.trim().is_empty()) {
                v.add(field, "must not contain empty values");
            }
        }

        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Banarasi Silk Saree".to_string(),
            description: "Handwoven silk saree with zari work".to_string(),
            price: Price::from_paise(1_249_900),
            original_price: None,
            stock: 3,
            category: "textiles".to_string(),
            subcategory: Some("sarees".to_string()),
            craft: Some("banarasi_weaving".to_string()),
            tags: vec!["silk".to_string(), "handloom".to_string()],
            materials: vec!["silk".to_string()],
            colors: vec!["red".to_string(), "gold".to_string()],
            techniques: vec!["zari".to_string()],
            occasions: vec!["wedding".to_string()],
            search_keywords: vec!["saree".to_string()],
            age_group: None,
            gender: Some(shilpkaar_core::Gender::Women),
            season: None,
            sustainability: true,
            featured: false,
            trending: false,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_empty_name_and_category_rejected() {
        let mut d = draft();
        d.name = "  ".to_string();
        d.category = String::new();
        let err = d.validate().expect_err("must fail");
        let fields: Vec<_> = err.violations.iter().map(|v| v.field).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"category"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut d = draft();
        d.price = Price::new(Decimal::new(-1, 0));
        let err = d.validate().expect_err("must fail");
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "price");
    }

    #[test]
    fn test_empty_facet_value_rejected() {
        let mut d = draft();
        d.materials.push(String::new());
        let err = d.validate().expect_err("must fail");
        assert_eq!(err.violations[0].field, "materials");
    }
}
