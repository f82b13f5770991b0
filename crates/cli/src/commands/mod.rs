//! CLI command implementations.

pub mod migrate;
pub mod reindex;
pub mod seed;
