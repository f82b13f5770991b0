//! Search index builder.
//!
//! Builds the index asynchronously from the catalog's active products and
//! artisans. The app starts serving immediately; until the build completes,
//! queries fail with `Unavailable` and clients retry.

use std::collections::HashMap;

use sqlx::PgPool;
use tantivy::Index;
use tracing::{error, info, instrument};

use shilpkaar_catalog::db::{ArtisanRepository, ProductRepository};

use crate::doc::{ArtisanDoc, ProductDoc};
use crate::ranking::RankingConfig;
use crate::{SearchError, SearchFields, SearchIndex, artisan_document, product_document};

/// Spawn a background task to build the search index from the catalog.
///
/// Until complete, searches return `SearchError::Unavailable`.
pub fn build_index_async(search_index: SearchIndex, pool: PgPool) {
    info!("spawning background search index build task");
    tokio::spawn(async move {
        match build_from_catalog(&pool).await {
            Ok((index, fields)) => {
                if let Err(e) = search_index.set_ready(index, fields) {
                    error!(error = %e, "failed to set search index as ready");
                } else {
                    let docs = search_index.num_docs();
                    info!(docs, "search index is ready and serving requests");
                }
            }
            Err(e) => {
                error!(error = %e, "failed to build search index");
            }
        }
    });
}

/// Build the index from active catalog rows.
///
/// # Errors
///
/// Returns [`SearchError::Index`] if the catalog cannot be loaded or a
/// document fails to index.
#[instrument(skip_all)]
pub async fn build_from_catalog(pool: &PgPool) -> Result<(Index, SearchFields), SearchError> {
    let artisans = ArtisanRepository::new(pool)
        .list_active_artisans()
        .await
        .map_err(|e| SearchError::Index(format!("failed to load artisans: {e}")))?;
    let products = ProductRepository::new(pool)
        .list_active()
        .await
        .map_err(|e| SearchError::Index(format!("failed to load products: {e}")))?;

    // Artisan location is denormalized onto product documents here, so
    // location filters need no join at query time.
    let by_id: HashMap<i32, &shilpkaar_catalog::models::Artisan> =
        artisans.iter().map(|a| (a.id.as_i32(), a)).collect();

    let product_docs: Vec<ProductDoc> = products
        .iter()
        .map(|p| ProductDoc::from_product(p, by_id.get(&p.artisan_id.as_i32()).copied()))
        .collect();
    let artisan_docs: Vec<ArtisanDoc> = artisans.iter().map(ArtisanDoc::from_artisan).collect();

    info!(
        products = product_docs.len(),
        artisans = artisan_docs.len(),
        "indexing catalog snapshot"
    );
    build_in_ram(&product_docs, &artisan_docs)
}

/// Build a committed in-memory index over the given document snapshots.
///
/// # Errors
///
/// Returns [`SearchError::Index`] if a document cannot be serialized or the
/// commit fails.
pub fn build_in_ram(
    products: &[ProductDoc],
    artisans: &[ArtisanDoc],
) -> Result<(Index, SearchFields), SearchError> {
    let config = RankingConfig::current();
    let (schema, fields) = SearchIndex::build_schema(&config);

    let index = Index::create_in_ram(schema);
    register_tokenizers(&index);

    let mut writer: tantivy::IndexWriter = index
        .writer(crate::WRITER_BUFFER_BYTES)
        .map_err(|e| SearchError::Index(format!("failed to create writer: {e}")))?;

    for doc in products {
        let tdoc = product_document(&fields, doc)?;
        writer
            .add_document(tdoc)
            .map_err(|e| SearchError::Index(format!("failed to index product {}: {e}", doc.id)))?;
    }
    for doc in artisans {
        let tdoc = artisan_document(&fields, doc)?;
        writer
            .add_document(tdoc)
            .map_err(|e| SearchError::Index(format!("failed to index artisan {}: {e}", doc.id)))?;
    }

    writer
        .commit()
        .map_err(|e| SearchError::Index(format!("failed to commit index: {e}")))?;

    Ok((index, fields))
}

/// Register the English stemmer used by the full-text fields.
fn register_tokenizers(index: &Index) {
    index.tokenizers().register(
        "en_stem",
        tantivy::tokenizer::TextAnalyzer::builder(tantivy::tokenizer::SimpleTokenizer::default())
            .filter(tantivy::tokenizer::RemoveLongFilter::limit(40))
            .filter(tantivy::tokenizer::LowerCaser)
            .filter(tantivy::tokenizer::Stemmer::new(
                tantivy::tokenizer::Language::English,
            ))
            .build(),
    );
}
