//! Marketplace domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. Repositories convert rows into these and reject corrupt data.

pub mod artisan;
pub mod favorite;
pub mod order;
pub mod product;
pub mod review;

pub use artisan::{Artisan, ArtisanProfileDraft};
pub use favorite::Favorite;
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use product::{Product, ProductDraft};
pub use review::{Review, ReviewDraft};
