//! Live-database repository tests.
//!
//! These tests require a migrated `PostgreSQL` database reachable via
//! `SHILPKAAR_DATABASE_URL` (or `DATABASE_URL`) and are ignored by default.
//!
//! Run with: cargo test -p shilpkaar-catalog -- --ignored

use rand::Rng;
use secrecy::SecretString;
use sqlx::PgPool;

use shilpkaar_catalog::db::{
    ArtisanRepository, FavoriteRepository, OrderRepository, ProductRepository,
};
use shilpkaar_catalog::{NewOrder, NewOrderItem, Product, ProductDraft, RepositoryError};
use shilpkaar_core::{PaymentMethod, Price, ProductId, UserId, UserRole};

async fn pool() -> PgPool {
    let url = std::env::var("SHILPKAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("SHILPKAAR_DATABASE_URL or DATABASE_URL must be set");
    shilpkaar_catalog::create_pool(&url).await.expect("pool")
}

fn draft(name: &str, price_paise: i64, stock: i32) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: "test fixture".to_string(),
        price: Price::from_paise(price_paise),
        original_price: None,
        stock,
        category: "pottery".to_string(),
        subcategory: None,
        craft: Some("pottery".to_string()),
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
    }
}

async fn seed_product(pool: &PgPool, stock: i32) -> Product {
    let artisan = ArtisanRepository::new(pool)
        .create("Test Artisan", UserRole::Artisan)
        .await
        .expect("artisan");
    ProductRepository::new(pool)
        .create(artisan.id, &draft("Collision Test Vase", 50_000, stock))
        .await
        .expect("product")
}

async fn seed_customer(pool: &PgPool) -> UserId {
    let customer = ArtisanRepository::new(pool)
        .create("Test Customer", UserRole::Customer)
        .await
        .expect("customer");
    UserId::new(customer.id.as_i32())
}

fn test_number(tag: &str) -> String {
    format!("ORD-TEST-{tag}-{:06}", rand::rng().random_range(0..1_000_000))
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_order_number_collision_retries_without_poisoning_the_transaction() {
    let pool = pool().await;
    let customer_id = seed_customer(&pool).await;
    let product = seed_product(&pool, 10).await;

    // Occupy an order number so the first candidate collides.
    let taken = test_number("TAKEN");
    sqlx::query(
        "INSERT INTO marketplace.orders (order_number, customer_id, total) VALUES ($1, $2, 0)",
    )
    .bind(&taken)
    .bind(customer_id.as_i32())
    .execute(&pool)
    .await
    .expect("pre-inserted order");

    let fresh = test_number("FRESH");
    let mut candidates = vec![taken, fresh.clone()].into_iter();
    let mut next_number = || candidates.next().expect("candidate");

    let new_order = NewOrder {
        items: vec![NewOrderItem {
            product_id: product.id,
            quantity: 3,
        }],
        payment_method: PaymentMethod::Cod,
    };
    let order = OrderRepository::new(&pool)
        .create_with_numbers(customer_id, &new_order, &mut next_number)
        .await
        .expect("order lands on the second candidate");

    assert_eq!(order.order_number, fresh);
    assert_eq!(order.items.len(), 1);

    // The stock decrement from before the collision must have survived.
    let after = ProductRepository::new(&pool)
        .get(product.id)
        .await
        .expect("get product")
        .expect("product exists");
    assert_eq!(after.stock, 7);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_favorite_toggle_missing_product_is_not_found() {
    let pool = pool().await;
    let customer_id = seed_customer(&pool).await;

    let result = FavoriteRepository::new(&pool)
        .toggle(customer_id, ProductId::new(i32::MAX))
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_favorite_toggle_roundtrip() {
    let pool = pool().await;
    let customer_id = seed_customer(&pool).await;
    let product = seed_product(&pool, 1).await;

    let repo = FavoriteRepository::new(&pool);
    assert!(repo.toggle(customer_id, product.id).await.expect("toggle on"));
    assert!(!repo.toggle(customer_id, product.id).await.expect("toggle off"));
    assert!(
        repo.list_for_user(customer_id)
            .await
            .expect("list")
            .iter()
            .all(|f| f.product_id != product.id)
    );
}
