//! Shilpkaar Search - faceted product and artisan search.
//!
//! A single in-memory tantivy index holds both products and artisans,
//! discriminated by a `kind` field. The index starts empty; a background
//! task builds it from the catalog and swaps it in atomically when ready.
//! Until then every query fails with [`SearchError::Unavailable`], which
//! callers surface as a retryable condition distinct from an empty result.
//!
//! Filter semantics: values within one facet are OR-ed, facets are AND-ed
//! together, and numeric ranges are inclusive at both bounds. Result order
//! is deterministic: ties on the sort key break by newest creation time,
//! then ascending ID.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod doc;
pub mod facets;
pub mod indexer;
pub mod query;
pub mod ranking;

use std::cmp::Ordering;
use std::ops::Bound;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, RangeQuery, RegexQuery,
    TermQuery,
};
use tantivy::schema::{
    Field, IndexRecordOption, NumericOptions, STORED, STRING, Schema, TantivyDocument,
    TextFieldIndexing, TextOptions, Value,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Term};
use tracing::instrument;

pub use doc::{ArtisanDoc, DocKind, ProductDoc, artisan_uid, product_uid};
pub use facets::{FilterOptions, PriceRange, RatingRange};
pub use indexer::build_index_async;
pub use query::{
    ArtisanQuery, ArtisanQueryParams, ProductQuery, ProductQueryParams, QueryError, SortBy,
    SortOrder, SuggestParams,
};
pub use ranking::RankingConfig;

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The index has not been built yet. Retryable; not an empty result.
    #[error("search index is not available yet")]
    Unavailable,
    #[error("index error: {0}")]
    Index(String),
    #[error("query error: {0}")]
    Query(String),
}

/// One full-text field of the schema, with its per-kind relevance weights.
#[derive(Debug, Clone)]
pub struct TextField {
    pub name: String,
    pub field: Field,
    pub product_weight: Option<f32>,
    pub artisan_weight: Option<f32>,
}

/// Schema field handles for the search index.
#[derive(Debug, Clone)]
pub struct SearchFields {
    /// Identity term ("product-{id}" / "artisan-{id}"); upsert delete key.
    pub uid: Field,
    pub kind: Field,
    /// Stored JSON snapshot of the document, returned in results.
    pub payload: Field,
    // Exact-match facet fields, lowercased at index time.
    pub category: Field,
    pub craft: Field,
    pub location: Field,
    pub region: Field,
    pub materials: Field,
    pub colors: Field,
    pub techniques: Field,
    pub occasions: Field,
    pub age_group: Field,
    pub gender: Field,
    pub season: Field,
    // Boolean flags as 0/1.
    pub sustainability: Field,
    pub featured: Field,
    pub trending: Field,
    // Range and sort keys.
    pub price_paise: Field,
    pub rating_tenths: Field,
    pub created_at_ts: Field,
    /// Tokenized fields generated from the ranking configuration.
    pub text: Vec<TextField>,
}

impl SearchFields {
    fn text_field(&self, name: &str) -> Option<&TextField> {
        self.text.iter().find(|t| t.name == name)
    }
}

/// A scored product result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductHit {
    #[serde(flatten)]
    pub doc: ProductDoc,
    pub score: f32,
}

/// A scored artisan result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanHit {
    #[serde(flatten)]
    pub doc: ArtisanDoc,
    pub score: f32,
}

/// One page of product results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub hits: Vec<ProductHit>,
    /// Matches across the whole corpus, before pagination.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// One page of artisan results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanPage {
    pub hits: Vec<ArtisanHit>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// A typeahead suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: i32,
    pub name: String,
    pub category: String,
}

/// Wire pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based current page.
    pub current: usize,
    /// Total page count.
    pub pages: usize,
    /// Matches across the whole corpus.
    pub total: usize,
    pub limit: usize,
}

/// Wire shape of a product search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchResponse {
    pub products: Vec<ProductHit>,
    pub pagination: Pagination,
    /// Filter options over the matched corpus. `null` when the aggregation
    /// failed; the results themselves are still valid.
    pub filters: Option<FilterOptions>,
}

/// Wire shape of an artisan search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanSearchResponse {
    pub artisans: Vec<ArtisanHit>,
    pub pagination: Pagination,
}

impl ProductPage {
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        Pagination {
            current: self.page,
            pages: self.total_pages,
            total: self.total,
            limit: self.limit,
        }
    }
}

impl ArtisanPage {
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        Pagination {
            current: self.page,
            pages: self.total_pages,
            total: self.total,
            limit: self.limit,
        }
    }
}

/// Inner index state (once built).
struct ReadyIndex {
    #[allow(dead_code)]
    index: Index,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    fields: SearchFields,
}

/// The search index.
///
/// Starts empty and is populated asynchronously by a background task.
/// Cloning is cheap; clones share the same index.
#[derive(Clone)]
pub struct SearchIndex {
    inner: Arc<RwLock<Option<ReadyIndex>>>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

const WRITER_BUFFER_BYTES: usize = 50_000_000;

impl SearchIndex {
    /// Create a new empty search index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Check if the index is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Get the number of documents in the index, or 0 if not ready.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|r| r.reader.searcher().num_docs()))
            .unwrap_or(0)
    }

    /// Set the built index. Called by the background builder task.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader or writer cannot be created.
    pub fn set_ready(&self, index: Index, fields: SearchFields) -> Result<(), SearchError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("failed to create reader: {e}")))?;
        let writer = index
            .writer(WRITER_BUFFER_BYTES)
            .map_err(|e| SearchError::Index(format!("failed to create writer: {e}")))?;

        let ready = ReadyIndex {
            index,
            writer: Mutex::new(writer),
            reader,
            fields,
        };

        *self
            .inner
            .write()
            .map_err(|_| SearchError::Index("lock poisoned".to_string()))? = Some(ready);

        Ok(())
    }

    /// Build the schema for the search index.
    ///
    /// Exact-match facet fields are raw (untokenized) strings; full-text
    /// fields come from the ranking configuration's weight tables and use
    /// the English stemmer.
    #[must_use]
    pub fn build_schema(config: &RankingConfig) -> (Schema, SearchFields) {
        let mut schema_builder = Schema::builder();

        let uid = schema_builder.add_text_field("uid", STRING | STORED);
        let kind = schema_builder.add_text_field("kind", STRING);
        let payload = schema_builder.add_text_field("payload", STORED);

        let category = schema_builder.add_text_field("category", STRING);
        let craft = schema_builder.add_text_field("craft", STRING);
        let location = schema_builder.add_text_field("location", STRING);
        let region = schema_builder.add_text_field("region", STRING);
        let materials = schema_builder.add_text_field("materials", STRING);
        let colors = schema_builder.add_text_field("colors", STRING);
        let techniques = schema_builder.add_text_field("techniques", STRING);
        let occasions = schema_builder.add_text_field("occasions", STRING);
        let age_group = schema_builder.add_text_field("age_group", STRING);
        let gender = schema_builder.add_text_field("gender", STRING);
        let season = schema_builder.add_text_field("season", STRING);

        let flag_options = || NumericOptions::default().set_indexed();
        let sustainability = schema_builder.add_u64_field("sustainability", flag_options());
        let featured = schema_builder.add_u64_field("featured", flag_options());
        let trending = schema_builder.add_u64_field("trending", flag_options());

        let range_options = || NumericOptions::default().set_indexed().set_fast();
        let price_paise = schema_builder.add_u64_field("price_paise", range_options());
        let rating_tenths = schema_builder.add_u64_field("rating_tenths", range_options());
        let created_at_ts = schema_builder.add_i64_field("created_at_ts", range_options());

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer("en_stem")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        let mut text: Vec<TextField> = Vec::new();
        for weight in &config.product_weights {
            let field =
                schema_builder.add_text_field(&format!("{}_text", weight.field), text_options.clone());
            text.push(TextField {
                name: weight.field.clone(),
                field,
                product_weight: Some(weight.weight),
                artisan_weight: None,
            });
        }
        for weight in &config.artisan_weights {
            if let Some(existing) = text.iter_mut().find(|t| t.name == weight.field) {
                existing.artisan_weight = Some(weight.weight);
            } else {
                let field = schema_builder
                    .add_text_field(&format!("{}_text", weight.field), text_options.clone());
                text.push(TextField {
                    name: weight.field.clone(),
                    field,
                    product_weight: None,
                    artisan_weight: Some(weight.weight),
                });
            }
        }

        let schema = schema_builder.build();
        let fields = SearchFields {
            uid,
            kind,
            payload,
            category,
            craft,
            location,
            region,
            materials,
            colors,
            techniques,
            occasions,
            age_group,
            gender,
            season,
            sustainability,
            featured,
            trending,
            price_paise,
            rating_tenths,
            created_at_ts,
            text,
        };

        (schema, fields)
    }

    /// Search products with the given validated query.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Unavailable`] before the initial build completes.
    /// - [`SearchError::Query`] if the search itself fails.
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    // Allow: the RwLockReadGuard must be held for the entire search because
    // `ready` borrows from the guard's protected data. Dropping the guard
    // early would invalidate the `ready` reference; the searcher, fields,
    // and all document access depend on this lock being held.
    #[allow(clippy::significant_drop_tightening)]
    pub fn search_products(&self, query: &ProductQuery) -> Result<ProductPage, SearchError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("lock poisoned".to_string()))?;
        let ready = guard.as_ref().ok_or(SearchError::Unavailable)?;

        let searcher = ready.reader.searcher();
        let tantivy_query = build_product_query(&ready.fields, query);

        let total = searcher
            .search(&tantivy_query, &Count)
            .map_err(|e| SearchError::Query(format!("count failed: {e}")))?;
        let top_docs = searcher
            .search(&tantivy_query, &TopDocs::with_limit(total.max(1)))
            .map_err(|e| SearchError::Query(format!("search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: ProductDoc = retrieve_payload(&searcher, &ready.fields, address)?;
            hits.push(ProductHit { doc, score });
        }

        sort_product_hits(&mut hits, query);
        let hits: Vec<ProductHit> = hits
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .collect();

        Ok(ProductPage {
            hits,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(query.limit),
        })
    }

    /// Search artisans with the given validated query.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Unavailable`] before the initial build completes.
    /// - [`SearchError::Query`] if the search itself fails.
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    // Allow: see `search_products`; the guard must outlive `ready`.
    #[allow(clippy::significant_drop_tightening)]
    pub fn search_artisans(&self, query: &ArtisanQuery) -> Result<ArtisanPage, SearchError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("lock poisoned".to_string()))?;
        let ready = guard.as_ref().ok_or(SearchError::Unavailable)?;

        let searcher = ready.reader.searcher();
        let tantivy_query = build_artisan_query(&ready.fields, query);

        let total = searcher
            .search(&tantivy_query, &Count)
            .map_err(|e| SearchError::Query(format!("count failed: {e}")))?;
        let top_docs = searcher
            .search(&tantivy_query, &TopDocs::with_limit(total.max(1)))
            .map_err(|e| SearchError::Query(format!("search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: ArtisanDoc = retrieve_payload(&searcher, &ready.fields, address)?;
            hits.push(ArtisanHit { doc, score });
        }

        sort_artisan_hits(&mut hits, query);
        let hits: Vec<ArtisanHit> = hits
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .collect();

        Ok(ArtisanPage {
            hits,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(query.limit),
        })
    }

    /// Compute filter options over the corpus matched by `query`. The
    /// query's own pagination and sort are ignored.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Unavailable`] before the initial build completes.
    /// - [`SearchError::Query`] if the search itself fails.
    #[instrument(skip(self, query))]
    // Allow: see `search_products`; the guard must outlive `ready`.
    #[allow(clippy::significant_drop_tightening)]
    pub fn filter_options(&self, query: &ProductQuery) -> Result<FilterOptions, SearchError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("lock poisoned".to_string()))?;
        let ready = guard.as_ref().ok_or(SearchError::Unavailable)?;

        let searcher = ready.reader.searcher();
        let tantivy_query = build_product_query(&ready.fields, query);

        let total = searcher
            .search(&tantivy_query, &Count)
            .map_err(|e| SearchError::Query(format!("count failed: {e}")))?;
        let top_docs = searcher
            .search(&tantivy_query, &TopDocs::with_limit(total.max(1)))
            .map_err(|e| SearchError::Query(format!("search failed: {e}")))?;

        let mut docs = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: ProductDoc = retrieve_payload(&searcher, &ready.fields, address)?;
            docs.push(doc);
        }

        Ok(FilterOptions::from_docs(&docs))
    }

    /// Typeahead product suggestions. Short terms prefix-match on the name,
    /// longer terms combine exact and fuzzy matching.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Unavailable`] before the initial build completes.
    /// - [`SearchError::Query`] if the search itself fails.
    #[instrument(skip(self))]
    // Allow: see `search_products`; the guard must outlive `ready`.
    #[allow(clippy::significant_drop_tightening)]
    pub fn suggest(&self, input: &str, limit: usize) -> Result<Vec<Suggestion>, SearchError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("lock poisoned".to_string()))?;
        let ready = guard.as_ref().ok_or(SearchError::Unavailable)?;
        let fields = &ready.fields;

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in input.split_whitespace() {
            let prefix_targets = ["name", "tags"]
                .iter()
                .filter_map(|name| fields.text_field(name));
            if term.len() < 3 {
                let pattern = format!("{}.*", regex::escape(term));
                for target in prefix_targets {
                    if let Ok(q) = RegexQuery::from_pattern(&pattern, target.field) {
                        subqueries.push((Occur::Should, Box::new(q)));
                    }
                }
            } else {
                for target in ["name", "tags", "search_keywords"]
                    .iter()
                    .filter_map(|name| fields.text_field(name))
                {
                    let t = Term::from_field_text(target.field, term);
                    subqueries.push((
                        Occur::Should,
                        Box::new(TermQuery::new(t.clone(), IndexRecordOption::Basic)),
                    ));
                    subqueries.push((Occur::Should, Box::new(FuzzyTermQuery::new(t, 1, true))));
                }
            }
        }

        let query = BooleanQuery::new(vec![
            (Occur::Must, kind_query(fields, DocKind::Product)),
            (Occur::Must, Box::new(BooleanQuery::new(subqueries))),
        ]);

        let searcher = ready.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit.max(1)))
            .map_err(|e| SearchError::Query(format!("suggest failed: {e}")))?;

        let mut suggestions = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: ProductDoc = retrieve_payload(&searcher, fields, address)?;
            suggestions.push(Suggestion {
                id: doc.id,
                name: doc.name,
                category: doc.category,
            });
        }
        Ok(suggestions)
    }

    /// Insert or replace a product document. A no-op before the initial
    /// build; the build reads the catalog and will pick the row up.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Index`] if the write or commit fails.
    #[instrument(skip(self, doc), fields(product = doc.id))]
    pub fn upsert_product(&self, doc: &ProductDoc) -> Result<(), SearchError> {
        self.commit_change(|fields, writer| {
            writer.delete_term(Term::from_field_text(fields.uid, &doc.uid()));
            let tdoc = product_document(fields, doc)?;
            writer
                .add_document(tdoc)
                .map_err(|e| SearchError::Index(format!("failed to add product: {e}")))?;
            Ok(())
        })
    }

    /// Remove a product document, if present.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Index`] if the commit fails.
    #[instrument(skip(self))]
    pub fn remove_product(&self, id: i32) -> Result<(), SearchError> {
        self.commit_change(|fields, writer| {
            writer.delete_term(Term::from_field_text(fields.uid, &product_uid(id)));
            Ok(())
        })
    }

    /// Insert or replace an artisan document. A no-op before the initial
    /// build.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Index`] if the write or commit fails.
    #[instrument(skip(self, doc), fields(artisan = doc.id))]
    pub fn upsert_artisan(&self, doc: &ArtisanDoc) -> Result<(), SearchError> {
        self.commit_change(|fields, writer| {
            writer.delete_term(Term::from_field_text(fields.uid, &doc.uid()));
            let tdoc = artisan_document(fields, doc)?;
            writer
                .add_document(tdoc)
                .map_err(|e| SearchError::Index(format!("failed to add artisan: {e}")))?;
            Ok(())
        })
    }

    /// Remove an artisan document, if present.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Index`] if the commit fails.
    #[instrument(skip(self))]
    pub fn remove_artisan(&self, id: i32) -> Result<(), SearchError> {
        self.commit_change(|fields, writer| {
            writer.delete_term(Term::from_field_text(fields.uid, &artisan_uid(id)));
            Ok(())
        })
    }

    /// Run a mutation against the writer, commit, and reload the reader so
    /// the change is visible to subsequent searches.
    fn commit_change<F>(&self, apply: F) -> Result<(), SearchError>
    where
        F: FnOnce(&SearchFields, &mut IndexWriter) -> Result<(), SearchError>,
    {
        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("lock poisoned".to_string()))?;
        let Some(ready) = guard.as_ref() else {
            return Ok(());
        };

        {
            let mut writer = ready
                .writer
                .lock()
                .map_err(|_| SearchError::Index("writer lock poisoned".to_string()))?;
            apply(&ready.fields, &mut writer)?;
            writer
                .commit()
                .map_err(|e| SearchError::Index(format!("commit failed: {e}")))?;
        }

        ready
            .reader
            .reload()
            .map_err(|e| SearchError::Index(format!("reader reload failed: {e}")))
    }
}

// =============================================================================
// Document construction
// =============================================================================

/// Build the tantivy document for a product snapshot.
pub(crate) fn product_document(
    fields: &SearchFields,
    doc: &ProductDoc,
) -> Result<TantivyDocument, SearchError> {
    let payload = serde_json::to_string(doc)
        .map_err(|e| SearchError::Index(format!("failed to serialize product {}: {e}", doc.id)))?;

    let mut tdoc = TantivyDocument::new();
    tdoc.add_text(fields.uid, doc.uid());
    tdoc.add_text(fields.kind, DocKind::Product.as_str());
    tdoc.add_text(fields.payload, payload);

    tdoc.add_text(fields.category, doc.category.trim().to_lowercase());
    if let Some(craft) = &doc.craft {
        tdoc.add_text(fields.craft, craft.trim().to_lowercase());
    }
    if let Some(location) = &doc.location {
        tdoc.add_text(fields.location, location.trim().to_lowercase());
    }
    if let Some(region) = &doc.region {
        tdoc.add_text(fields.region, region.trim().to_lowercase());
    }
    for (field, values) in [
        (fields.materials, &doc.materials),
        (fields.colors, &doc.colors),
        (fields.techniques, &doc.techniques),
        (fields.occasions, &doc.occasions),
    ] {
        for value in values {
            tdoc.add_text(field, value.trim().to_lowercase());
        }
    }
    if let Some(age_group) = doc.age_group {
        tdoc.add_text(fields.age_group, age_group.as_str());
    }
    if let Some(gender) = doc.gender {
        tdoc.add_text(fields.gender, gender.as_str());
    }
    if let Some(season) = doc.season {
        tdoc.add_text(fields.season, season.as_str());
    }

    tdoc.add_u64(fields.sustainability, u64::from(doc.sustainability));
    tdoc.add_u64(fields.featured, u64::from(doc.featured));
    tdoc.add_u64(fields.trending, u64::from(doc.trending));

    tdoc.add_u64(fields.price_paise, doc.price_paise);
    tdoc.add_u64(fields.rating_tenths, doc.rating_tenths());
    tdoc.add_i64(fields.created_at_ts, doc.created_at.timestamp());

    for text in &fields.text {
        if text.product_weight.is_some()
            && let Some(value) = doc.text_value(&text.name)
        {
            tdoc.add_text(text.field, value);
        }
    }

    Ok(tdoc)
}

/// Build the tantivy document for an artisan snapshot.
pub(crate) fn artisan_document(
    fields: &SearchFields,
    doc: &ArtisanDoc,
) -> Result<TantivyDocument, SearchError> {
    let payload = serde_json::to_string(doc)
        .map_err(|e| SearchError::Index(format!("failed to serialize artisan {}: {e}", doc.id)))?;

    let mut tdoc = TantivyDocument::new();
    tdoc.add_text(fields.uid, doc.uid());
    tdoc.add_text(fields.kind, DocKind::Artisan.as_str());
    tdoc.add_text(fields.payload, payload);

    if let Some(craft) = &doc.craft {
        tdoc.add_text(fields.craft, craft.trim().to_lowercase());
    }
    for craft in &doc.crafts {
        tdoc.add_text(fields.craft, craft.trim().to_lowercase());
    }
    if let Some(location) = &doc.location {
        tdoc.add_text(fields.location, location.trim().to_lowercase());
    }
    if let Some(region) = &doc.region {
        tdoc.add_text(fields.region, region.trim().to_lowercase());
    }

    tdoc.add_u64(fields.rating_tenths, doc.rating_tenths());
    tdoc.add_i64(fields.created_at_ts, doc.created_at.timestamp());

    for text in &fields.text {
        if text.artisan_weight.is_some()
            && let Some(value) = doc.text_value(&text.name)
        {
            tdoc.add_text(text.field, value);
        }
    }

    Ok(tdoc)
}

// =============================================================================
// Query construction
// =============================================================================

fn kind_query(fields: &SearchFields, kind: DocKind) -> Box<dyn Query> {
    let term = Term::from_field_text(fields.kind, kind.as_str());
    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
}

/// Weighted full-text subquery over one kind's weight table.
fn text_query(fields: &SearchFields, kind: DocKind, input: &str) -> Box<dyn Query> {
    let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

    for term in input.split_whitespace() {
        for text in &fields.text {
            let weight = match kind {
                DocKind::Product => text.product_weight,
                DocKind::Artisan => text.artisan_weight,
            };
            let Some(weight) = weight else { continue };

            let t = Term::from_field_text(text.field, term);
            let exact = TermQuery::new(t.clone(), IndexRecordOption::Basic);
            subqueries.push((
                Occur::Should,
                Box::new(BoostQuery::new(Box::new(exact), weight)),
            ));

            // Fuzzy matches score below exact ones on the same field.
            if term.len() >= 3 {
                let fuzzy = FuzzyTermQuery::new(t, 1, true);
                subqueries.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(fuzzy), weight * 0.5)),
                ));
            }
        }
    }

    Box::new(BooleanQuery::new(subqueries))
}

/// One facet with several accepted values: OR within the facet.
fn any_term_query(field: Field, values: &[String]) -> Box<dyn Query> {
    let clauses: Vec<(Occur, Box<dyn Query>)> = values
        .iter()
        .map(|value| {
            let term = Term::from_field_text(field, value);
            (
                Occur::Should,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)) as Box<dyn Query>,
            )
        })
        .collect();
    Box::new(BooleanQuery::new(clauses))
}

fn exact_term_query(field: Field, value: &str) -> Box<dyn Query> {
    let term = Term::from_field_text(field, value);
    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
}

fn flag_query(field: Field, value: bool) -> Box<dyn Query> {
    let term = Term::from_field_u64(field, u64::from(value));
    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
}

fn build_product_query(fields: &SearchFields, query: &ProductQuery) -> BooleanQuery {
    let mut clauses: Vec<(Occur, Box<dyn Query>)> =
        vec![(Occur::Must, kind_query(fields, DocKind::Product))];

    match &query.q {
        Some(input) => clauses.push((Occur::Must, text_query(fields, DocKind::Product, input))),
        None => clauses.push((Occur::Must, Box::new(AllQuery))),
    }

    for (field, value) in [
        (fields.category, &query.category),
        (fields.craft, &query.craft),
        (fields.location, &query.location),
        (fields.region, &query.region),
    ] {
        if let Some(value) = value {
            clauses.push((Occur::Must, exact_term_query(field, value)));
        }
    }

    for (field, values) in [
        (fields.materials, &query.materials),
        (fields.colors, &query.colors),
        (fields.techniques, &query.techniques),
        (fields.occasions, &query.occasions),
    ] {
        if !values.is_empty() {
            clauses.push((Occur::Must, any_term_query(field, values)));
        }
    }

    if let Some(age_group) = query.age_group {
        clauses.push((Occur::Must, exact_term_query(fields.age_group, age_group.as_str())));
    }
    if let Some(gender) = query.gender {
        clauses.push((Occur::Must, exact_term_query(fields.gender, gender.as_str())));
    }
    if let Some(season) = query.season {
        clauses.push((Occur::Must, exact_term_query(fields.season, season.as_str())));
    }

    for (field, value) in [
        (fields.sustainability, query.sustainability),
        (fields.featured, query.featured),
        (fields.trending, query.trending),
    ] {
        if let Some(value) = value {
            clauses.push((Occur::Must, flag_query(field, value)));
        }
    }

    // Inclusive at both bounds.
    if query.min_price_paise.is_some() || query.max_price_paise.is_some() {
        let min = query.min_price_paise.unwrap_or(0);
        let max = query.max_price_paise.unwrap_or(u64::MAX);
        let range = RangeQuery::new(
            Bound::Included(Term::from_field_u64(fields.price_paise, min)),
            Bound::Included(Term::from_field_u64(fields.price_paise, max)),
        );
        clauses.push((Occur::Must, Box::new(range)));
    }
    if let Some(min) = query.min_rating_tenths {
        let range = RangeQuery::new(
            Bound::Included(Term::from_field_u64(fields.rating_tenths, min)),
            Bound::Unbounded,
        );
        clauses.push((Occur::Must, Box::new(range)));
    }

    BooleanQuery::new(clauses)
}

fn build_artisan_query(fields: &SearchFields, query: &ArtisanQuery) -> BooleanQuery {
    let mut clauses: Vec<(Occur, Box<dyn Query>)> =
        vec![(Occur::Must, kind_query(fields, DocKind::Artisan))];

    match &query.q {
        Some(input) => clauses.push((Occur::Must, text_query(fields, DocKind::Artisan, input))),
        None => clauses.push((Occur::Must, Box::new(AllQuery))),
    }

    for (field, value) in [
        (fields.craft, &query.craft),
        (fields.location, &query.location),
        (fields.region, &query.region),
    ] {
        if let Some(value) = value {
            clauses.push((Occur::Must, exact_term_query(field, value)));
        }
    }

    if let Some(min) = query.min_rating_tenths {
        let range = RangeQuery::new(
            Bound::Included(Term::from_field_u64(fields.rating_tenths, min)),
            Bound::Unbounded,
        );
        clauses.push((Occur::Must, Box::new(range)));
    }

    BooleanQuery::new(clauses)
}

// =============================================================================
// Result assembly
// =============================================================================

fn retrieve_payload<T: serde::de::DeserializeOwned>(
    searcher: &tantivy::Searcher,
    fields: &SearchFields,
    address: tantivy::DocAddress,
) -> Result<T, SearchError> {
    let doc = searcher
        .doc::<TantivyDocument>(address)
        .map_err(|e| SearchError::Query(format!("failed to retrieve doc: {e}")))?;
    let payload = doc
        .get_first(fields.payload)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SearchError::Index("document has no payload".to_string()))?;
    serde_json::from_str(payload)
        .map_err(|e| SearchError::Index(format!("corrupt document payload: {e}")))
}

/// Order hits deterministically: sort key with the requested direction,
/// then creation time descending, then ascending ID.
fn sort_product_hits(hits: &mut [ProductHit], query: &ProductQuery) {
    // A relevance sort without query text has no scores to rank by.
    let sort_by = if query.sort_by == SortBy::Relevance && query.q.is_none() {
        SortBy::Newest
    } else {
        query.sort_by
    };
    let order = query.effective_order();

    hits.sort_by(|a, b| {
        let primary = match sort_by {
            SortBy::Relevance => a.score.total_cmp(&b.score),
            SortBy::Price => a.doc.price_paise.cmp(&b.doc.price_paise),
            SortBy::Rating => a.doc.rating_tenths().cmp(&b.doc.rating_tenths()),
            SortBy::Newest => a.doc.created_at.cmp(&b.doc.created_at),
            SortBy::Name => a.doc.name.to_lowercase().cmp(&b.doc.name.to_lowercase()),
        };
        directed(primary, order)
            .then_with(|| b.doc.created_at.cmp(&a.doc.created_at))
            .then_with(|| a.doc.id.cmp(&b.doc.id))
    });
}

fn sort_artisan_hits(hits: &mut [ArtisanHit], query: &ArtisanQuery) {
    let sort_by = if query.sort_by == SortBy::Relevance && query.q.is_none() {
        SortBy::Newest
    } else {
        query.sort_by
    };
    let order = query.effective_order();

    hits.sort_by(|a, b| {
        let primary = match sort_by {
            SortBy::Relevance => a.score.total_cmp(&b.score),
            SortBy::Rating => a.doc.rating_tenths().cmp(&b.doc.rating_tenths()),
            SortBy::Newest => a.doc.created_at.cmp(&b.doc.created_at),
            SortBy::Name | SortBy::Price => {
                a.doc.name.to_lowercase().cmp(&b.doc.name.to_lowercase())
            }
        };
        directed(primary, order)
            .then_with(|| b.doc.created_at.cmp(&a.doc.created_at))
            .then_with(|| a.doc.id.cmp(&b.doc.id))
    });
}

const fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}
