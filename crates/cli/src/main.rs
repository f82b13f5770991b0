//! Shilpkaar CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shilpkaar-cli migrate
//!
//! # Seed the database with sample artisans and products
//! shilpkaar-cli seed
//!
//! # Build a search index from the catalog and report its size
//! shilpkaar-cli reindex
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with sample catalog data
//! - `reindex` - Build a search index from the catalog and report its size

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shilpkaar-cli")]
#[command(author, version, about = "Shilpkaar marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample artisans and products
    Seed,
    /// Build a search index from the catalog and report its size
    Reindex,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Reindex => commands::reindex::run().await?,
    }
    Ok(())
}
