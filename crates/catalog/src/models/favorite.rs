//! Favorite domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shilpkaar_core::{FavoriteId, ProductId, UserId};

/// A user's favorite product. Unique per (user, product) pair; toggled
/// rather than created/deleted directly.
#[derive(Debug, Clone, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}
