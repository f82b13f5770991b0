//! End-to-end tests over an in-memory index.

use chrono::{Duration, TimeZone, Utc};

use shilpkaar_search::indexer::build_in_ram;
use shilpkaar_search::{
    ArtisanDoc, ArtisanQueryParams, ProductDoc, ProductQueryParams, SearchError, SearchIndex,
};

fn product(id: i32, name: &str, price_rupees: u64, category: &str) -> ProductDoc {
    ProductDoc {
        id,
        artisan_id: 1,
        name: name.to_string(),
        description: format!("{name} description"),
        price_paise: price_rupees * 100,
        original_price_paise: None,
        stock: 5,
        category: category.to_string(),
        subcategory: None,
        craft: None,
        tags: vec![],
        materials: vec![],
        colors: vec![],
        techniques: vec![],
        occasions: vec![],
        search_keywords: vec![],
        age_group: None,
        gender: None,
        season: None,
        sustainability: false,
        featured: false,
        trending: false,
        rating: 0.0,
        review_count: 0,
        location: None,
        region: None,
        // Older IDs are older products; keeps tie-breaks deterministic.
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap()
            + Duration::days(i64::from(id)),
    }
}

fn artisan(id: i32, name: &str, craft: &str, region: &str) -> ArtisanDoc {
    ArtisanDoc {
        id,
        name: name.to_string(),
        craft: Some(craft.to_string()),
        crafts: vec![craft.to_string()],
        location: Some("Jaipur".to_string()),
        region: Some(region.to_string()),
        techniques: vec![],
        specializations: vec![],
        bio: None,
        rating: 4.0,
        review_count: 3,
        is_verified: true,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap()
            + Duration::days(i64::from(id)),
    }
}

fn ready(products: &[ProductDoc], artisans: &[ArtisanDoc]) -> SearchIndex {
    let (index, fields) = build_in_ram(products, artisans).expect("build");
    let search = SearchIndex::new();
    search.set_ready(index, fields).expect("set ready");
    search
}

fn search_ids(index: &SearchIndex, params: ProductQueryParams) -> Vec<i32> {
    index
        .search_products(&params.into_query().expect("valid query"))
        .expect("search")
        .hits
        .iter()
        .map(|h| h.doc.id)
        .collect()
}

#[test]
fn unready_index_is_unavailable_not_empty() {
    let index = SearchIndex::new();
    assert!(!index.is_ready());
    let query = ProductQueryParams::default().into_query().unwrap();
    assert!(matches!(
        index.search_products(&query),
        Err(SearchError::Unavailable)
    ));
    assert!(matches!(
        index.filter_options(&query),
        Err(SearchError::Unavailable)
    ));
}

#[test]
fn empty_query_returns_full_catalog_newest_first() {
    let index = ready(
        &[
            product(1, "Vase", 100, "pottery"),
            product(2, "Bowl", 200, "pottery"),
            product(3, "Plate", 300, "pottery"),
        ],
        &[],
    );
    assert_eq!(search_ids(&index, ProductQueryParams::default()), vec![3, 2, 1]);
}

#[test]
fn price_range_is_inclusive_at_both_bounds() {
    let index = ready(
        &[
            product(1, "Cheap", 100, "pottery"),
            product(2, "Mid", 500, "pottery"),
            product(3, "Dear", 1000, "pottery"),
        ],
        &[],
    );
    let ids = search_ids(
        &index,
        ProductQueryParams {
            min_price: Some("100".to_string()),
            max_price: Some("500".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn min_rating_is_inclusive() {
    let mut low = product(1, "Low", 100, "pottery");
    low.rating = 3.9;
    let mut exact = product(2, "Exact", 100, "pottery");
    exact.rating = 4.0;
    let index = ready(&[low, exact], &[]);
    let ids = search_ids(
        &index,
        ProductQueryParams {
            min_rating: Some("4".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(ids, vec![2]);
}

#[test]
fn facet_values_or_within_facets_and_across() {
    let mut a = product(1, "Silver Ring", 100, "jewelry");
    a.materials = vec!["silver".to_string()];
    let mut b = product(2, "Wooden Bangle", 100, "jewelry");
    b.materials = vec!["wood".to_string()];
    let mut c = product(3, "Wooden Toy", 100, "toys");
    c.materials = vec!["wood".to_string()];
    let index = ready(&[a, b, c], &[]);

    // wood OR silver, AND category jewelry.
    let ids = search_ids(
        &index,
        ProductQueryParams {
            materials: Some("wood,silver".to_string()),
            category: Some("jewelry".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn adding_a_filter_never_grows_the_result_set() {
    let docs: Vec<ProductDoc> = (1..=10)
        .map(|id| product(id, "Item", u64::try_from(id).unwrap() * 100, "pottery"))
        .collect();
    let index = ready(&docs, &[]);

    let all = search_ids(&index, ProductQueryParams::default());
    let filtered = search_ids(
        &index,
        ProductQueryParams {
            max_price: Some("400".to_string()),
            ..Default::default()
        },
    );
    assert!(filtered.iter().all(|id| all.contains(id)));
    assert!(filtered.len() < all.len());
}

#[test]
fn pagination_partitions_the_result_set() {
    let docs: Vec<ProductDoc> = (1..=5)
        .map(|id| product(id, "Item", 100, "pottery"))
        .collect();
    let index = ready(&docs, &[]);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = index
            .search_products(
                &ProductQueryParams {
                    page: Some(page.to_string()),
                    limit: Some("2".to_string()),
                    ..Default::default()
                }
                .into_query()
                .unwrap(),
            )
            .unwrap();
        assert_eq!(result.total, 5);
        assert_eq!(result.total_pages, 3);
        seen.extend(result.hits.iter().map(|h| h.doc.id));
    }
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[test]
fn name_matches_outrank_description_matches() {
    let mut named = product(1, "Silk Saree", 100, "textiles");
    named.description = "Handwoven drape".to_string();
    let mut described = product(2, "Cotton Kurta", 100, "textiles");
    described.description = "Soft cotton with silk border".to_string();
    let index = ready(&[named, described], &[]);

    let ids = search_ids(
        &index,
        ProductQueryParams {
            q: Some("silk".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn price_sort_defaults_ascending_with_stable_ties() {
    let index = ready(
        &[
            product(1, "A", 300, "pottery"),
            product(2, "B", 100, "pottery"),
            product(3, "C", 100, "pottery"),
        ],
        &[],
    );
    let ids = search_ids(
        &index,
        ProductQueryParams {
            sort_by: Some("price".to_string()),
            ..Default::default()
        },
    );
    // Equal prices tie-break newest first.
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn suggest_matches_prefixes_of_product_names() {
    let index = ready(
        &[
            product(1, "Silk Saree", 100, "textiles"),
            product(2, "Clay Pot", 100, "pottery"),
        ],
        &[],
    );
    let suggestions = index.suggest("si", 5).expect("suggest");
    assert!(suggestions.iter().any(|s| s.id == 1));
    assert!(suggestions.iter().all(|s| s.id != 2));
    assert!(index.suggest("  ", 5).expect("blank").is_empty());
}

#[test]
fn upserts_are_idempotent_and_visible() {
    let index = ready(&[product(1, "Vase", 100, "pottery")], &[]);

    let new = product(2, "Bowl", 200, "pottery");
    index.upsert_product(&new).expect("upsert");
    index.upsert_product(&new).expect("upsert again");

    let ids = search_ids(&index, ProductQueryParams::default());
    assert_eq!(ids, vec![2, 1]);

    index.remove_product(2).expect("remove");
    assert_eq!(search_ids(&index, ProductQueryParams::default()), vec![1]);
    // Removing an absent document is a no-op.
    index.remove_product(99).expect("remove absent");
}

#[test]
fn artisan_search_filters_by_craft_and_region() {
    let index = ready(
        &[],
        &[
            artisan(1, "Meera Devi", "blue_pottery", "north"),
            artisan(2, "Ravi Kumar", "weaving", "south"),
        ],
    );
    let result = index
        .search_artisans(
            &ArtisanQueryParams {
                craft: Some("weaving".to_string()),
                ..Default::default()
            }
            .into_query()
            .unwrap(),
        )
        .expect("search");
    assert_eq!(result.total, 1);
    assert_eq!(result.hits[0].doc.id, 2);

    let by_region = index
        .search_artisans(
            &ArtisanQueryParams {
                region: Some("north".to_string()),
                ..Default::default()
            }
            .into_query()
            .unwrap(),
        )
        .expect("search");
    assert_eq!(by_region.hits[0].doc.id, 1);
}

#[test]
fn filter_options_reflect_the_constrained_corpus() {
    let mut a = product(1, "Silver Ring", 100, "jewelry");
    a.materials = vec!["silver".to_string()];
    let mut b = product(2, "Clay Pot", 900, "pottery");
    b.materials = vec!["clay".to_string()];
    let index = ready(&[a, b], &[]);

    let all = index
        .filter_options(&ProductQueryParams::default().into_query().unwrap())
        .expect("options");
    assert_eq!(
        all.categories,
        Some(vec!["jewelry".to_string(), "pottery".to_string()])
    );
    assert_eq!(all.price.unwrap().min_paise, 10_000);
    assert_eq!(all.price.unwrap().max_paise, 90_000);

    let constrained = index
        .filter_options(
            &ProductQueryParams {
                category: Some("pottery".to_string()),
                ..Default::default()
            }
            .into_query()
            .unwrap(),
        )
        .expect("options");
    assert_eq!(constrained.materials, Some(vec!["clay".to_string()]));
}
