//! Filter-option aggregation.
//!
//! Computes the facet values and numeric ranges available within a matched
//! corpus, so a filter panel only offers choices that lead somewhere. Each
//! section is optional: a caller assembling options from several sources can
//! degrade a failed section to `null` while still serving the rest.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::doc::ProductDoc;

/// Inclusive price range over a corpus, in paise. Zero-width when the
/// corpus is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_paise: u64,
    pub max_paise: u64,
}

/// Inclusive rating range over a corpus, in tenths of a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRange {
    pub min_tenths: u64,
    pub max_tenths: u64,
}

/// The filter choices available within a matched corpus.
///
/// List sections hold distinct values sorted ascending. A `None` section
/// means that section could not be computed, not that it is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub categories: Option<Vec<String>>,
    pub crafts: Option<Vec<String>>,
    pub regions: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
    pub materials: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub techniques: Option<Vec<String>>,
    pub occasions: Option<Vec<String>>,
    pub price: Option<PriceRange>,
    pub rating: Option<RatingRange>,
}

impl FilterOptions {
    /// Aggregate options over product documents.
    ///
    /// All sections are `Some` here; degradation to `null` happens at the
    /// assembly layer when a source fails.
    #[must_use]
    pub fn from_docs<'a, I>(docs: I) -> Self
    where
        I: IntoIterator<Item = &'a ProductDoc>,
    {
        let mut categories = BTreeSet::new();
        let mut crafts = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut materials = BTreeSet::new();
        let mut colors = BTreeSet::new();
        let mut techniques = BTreeSet::new();
        let mut occasions = BTreeSet::new();

        let mut price: Option<PriceRange> = None;
        let mut rating: Option<RatingRange> = None;

        for doc in docs {
            insert_norm(&mut categories, &doc.category);
            if let Some(craft) = &doc.craft {
                insert_norm(&mut crafts, craft);
            }
            if let Some(region) = &doc.region {
                insert_norm(&mut regions, region);
            }
            if let Some(location) = &doc.location {
                insert_norm(&mut locations, location);
            }
            for value in &doc.materials {
                insert_norm(&mut materials, value);
            }
            for value in &doc.colors {
                insert_norm(&mut colors, value);
            }
            for value in &doc.techniques {
                insert_norm(&mut techniques, value);
            }
            for value in &doc.occasions {
                insert_norm(&mut occasions, value);
            }

            price = Some(price.map_or(
                PriceRange {
                    min_paise: doc.price_paise,
                    max_paise: doc.price_paise,
                },
                |r| PriceRange {
                    min_paise: r.min_paise.min(doc.price_paise),
                    max_paise: r.max_paise.max(doc.price_paise),
                },
            ));

            let tenths = doc.rating_tenths();
            rating = Some(rating.map_or(
                RatingRange {
                    min_tenths: tenths,
                    max_tenths: tenths,
                },
                |r| RatingRange {
                    min_tenths: r.min_tenths.min(tenths),
                    max_tenths: r.max_tenths.max(tenths),
                },
            ));
        }

        Self {
            categories: Some(categories.into_iter().collect()),
            crafts: Some(crafts.into_iter().collect()),
            regions: Some(regions.into_iter().collect()),
            locations: Some(locations.into_iter().collect()),
            materials: Some(materials.into_iter().collect()),
            colors: Some(colors.into_iter().collect()),
            techniques: Some(techniques.into_iter().collect()),
            occasions: Some(occasions.into_iter().collect()),
            // Zero-width ranges for an empty corpus.
            price: Some(price.unwrap_or_default()),
            rating: Some(rating.unwrap_or_default()),
        }
    }
}

fn insert_norm(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim().to_lowercase();
    if !value.is_empty() {
        set.insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(id: i32, category: &str, price_paise: u64, rating: f32) -> ProductDoc {
        ProductDoc {
            id,
            artisan_id: 1,
            name: format!("product {id}"),
            description: String::new(),
            price_paise,
            original_price_paise: None,
            stock: 1,
            category: category.to_string(),
            subcategory: None,
            craft: Some("weaving".to_string()),
            tags: vec![],
            materials: vec!["Silk".to_string()],
            colors: vec!["red".to_string()],
            techniques: vec![],
            occasions: vec![],
            search_keywords: vec![],
            age_group: None,
            gender: None,
            season: None,
            sustainability: false,
            featured: false,
            trending: false,
            rating,
            review_count: 0,
            location: Some("Varanasi".to_string()),
            region: Some("north".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_distinct_sorted_values() {
        let docs = [
            doc(1, "Textiles", 100, 4.0),
            doc(2, "pottery", 200, 3.0),
            doc(3, "textiles", 300, 5.0),
        ];
        let options = FilterOptions::from_docs(&docs);
        assert_eq!(
            options.categories,
            Some(vec!["pottery".to_string(), "textiles".to_string()])
        );
        assert_eq!(options.materials, Some(vec!["silk".to_string()]));
    }

    #[test]
    fn test_ranges_span_corpus() {
        let docs = [doc(1, "a", 500, 2.5), doc(2, "b", 100, 4.5)];
        let options = FilterOptions::from_docs(&docs);
        assert_eq!(
            options.price,
            Some(PriceRange {
                min_paise: 100,
                max_paise: 500
            })
        );
        assert_eq!(
            options.rating,
            Some(RatingRange {
                min_tenths: 25,
                max_tenths: 45
            })
        );
    }

    #[test]
    fn test_empty_corpus_gives_zero_width_ranges() {
        let options = FilterOptions::from_docs(std::iter::empty::<&ProductDoc>());
        assert_eq!(options.price, Some(PriceRange::default()));
        assert_eq!(options.rating, Some(RatingRange::default()));
        assert_eq!(options.categories, Some(vec![]));
    }
}
