//! Database migration command.
//!
//! # Environment Variables
//!
//! - `SHILPKAAR_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending catalog migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = shilpkaar_catalog::create_pool(&database_url).await?;

    info!("Running migrations...");
    shilpkaar_catalog::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}

pub(crate) fn database_url() -> Result<SecretString, MigrationError> {
    std::env::var("SHILPKAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("SHILPKAAR_DATABASE_URL"))
}
