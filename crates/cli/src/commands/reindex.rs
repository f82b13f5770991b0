//! Index rebuild command.
//!
//! The API service holds its search index in process memory and rebuilds it
//! on startup, so there is no persisted index to write here. This command
//! performs the same build against the live catalog and reports what it
//! indexed, which catches rows the indexer would reject before they take a
//! deployment down.
//!
//! # Environment Variables
//!
//! - `SHILPKAAR_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use thiserror::Error;
use tracing::info;

use shilpkaar_search::SearchError;

use super::migrate::MigrationError;

#[derive(Debug, Error)]
pub enum ReindexError {
    #[error(transparent)]
    Config(#[from] MigrationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Index build error: {0}")]
    Index(#[from] SearchError),
}

/// Build a full search index from the active catalog and report its size.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or any catalog row fails to index.
pub async fn run() -> Result<(), ReindexError> {
    dotenvy::dotenv().ok();

    let database_url = super::migrate::database_url()?;

    info!("Connecting to database...");
    let pool = shilpkaar_catalog::create_pool(&database_url).await?;

    info!("Building search index from the catalog...");
    let (index, _fields) = shilpkaar_search::indexer::build_from_catalog(&pool).await?;

    let reader = index
        .reader()
        .map_err(|e| SearchError::Index(format!("failed to open reader: {e}")))?;
    let docs = reader.searcher().num_docs();

    info!(docs, "Index build complete!");
    Ok(())
}
