//! Derivation of the cached `search_text` field.
//!
//! `search_text` is a space-joined, lowercased concatenation of every
//! textual source field on a product or artisan. It exists so the data
//! store can run a single-column fallback match; the search index itself
//! indexes the source fields individually with per-field weights.
//!
//! The field is a cache, not a source of truth: repositories call these
//! functions inside every write transaction, so the stored value is always
//! a pure function of the current source fields.

use crate::models::{Artisan, ArtisanProfileDraft, Product, ProductDraft};
use shilpkaar_core::UserRole;

fn join(parts: &mut Vec<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_lowercase());
    }
}

fn join_all(parts: &mut Vec<String>, values: &[String]) {
    for value in values {
        join(parts, value);
    }
}

/// Compute a product's `search_text` from its draft source fields.
#[must_use]
pub fn product_search_text(draft: &ProductDraft) -> String {
    let mut parts = Vec::new();
    join(&mut parts, &draft.name);
    join(&mut parts, &draft.description);
    join(&mut parts, &draft.category);
    if let Some(subcategory) = &draft.subcategory {
        join(&mut parts, subcategory);
    }
    if let Some(craft) = &draft.craft {
        join(&mut parts, craft);
    }
    join_all(&mut parts, &draft.tags);
    join_all(&mut parts, &draft.materials);
    join_all(&mut parts, &draft.colors);
    join_all(&mut parts, &draft.techniques);
    join_all(&mut parts, &draft.occasions);
    join_all(&mut parts, &draft.search_keywords);
    parts.join(" ")
}

/// Compute an artisan's `search_text` from a profile draft.
///
/// Only artisan-role users carry a search profile; pass the stored role so
/// customer rows always get an empty cache.
#[must_use]
pub fn artisan_search_text(role: UserRole, draft: &ArtisanProfileDraft) -> String {
    if role != UserRole::Artisan {
        return String::new();
    }
    let mut parts = Vec::new();
    join(&mut parts, &draft.name);
    if let Some(craft) = &draft.craft {
        join(&mut parts, craft);
    }
    join_all(&mut parts, &draft.crafts);
    for field in [&draft.location, &draft.region, &draft.state, &draft.city] {
        if let Some(value) = field {
            join(&mut parts, value);
        }
    }
    join_all(&mut parts, &draft.techniques);
    join_all(&mut parts, &draft.specializations);
    join_all(&mut parts, &draft.certifications);
    join_all(&mut parts, &draft.languages);
    if let Some(bio) = &draft.bio {
        join(&mut parts, bio);
    }
    parts.join(" ")
}

/// Check that a stored product's cache matches its source fields.
///
/// Used by tests and the reindex path to detect drift.
#[must_use]
pub fn product_cache_is_fresh(product: &Product) -> bool {
    product.search_text == product_search_text(&draft_of(product))
}

fn draft_of(product: &Product) -> ProductDraft {
    ProductDraft {
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        original_price: product.original_price,
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
    }
}

/// Check that a stored artisan's cache matches its source fields.
#[must_use]
pub fn artisan_cache_is_fresh(artisan: &Artisan) -> bool {
    let draft = ArtisanProfileDraft {
        name: artisan.name.clone(),
        craft: artisan.craft.clone(),
        crafts: artisan.crafts.clone(),
        location: artisan.location.clone(),
        region: artisan.region.clone(),
        state: artisan.state.clone(),
        city: artisan.city.clone(),
        techniques: artisan.techniques.clone(),
        specializations: artisan.specializations.clone(),
        certifications: artisan.certifications.clone(),
        languages: artisan.languages.clone(),
        bio: artisan.bio.clone(),
    };
    artisan.search_text == artisan_search_text(artisan.role, &draft)
}
