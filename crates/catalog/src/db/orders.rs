//! Order repository.
//!
//! Order creation runs in a single transaction: product rows are locked,
//! prices snapshotted, stock decremented, and the order number assigned.
//! The order number is generated client-side and made unique by the
//! database constraint; each insert attempt runs under a savepoint so a
//! collision rolls back only the attempt and retries with a fresh
//! candidate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgPool};
use tracing::instrument;

use shilpkaar_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::order::generate_order_number;
use crate::models::{NewOrder, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, order_number, customer_id, total, status, payment_status, \
     payment_method, created_at, updated_at";

const MAX_ORDER_NUMBER_ATTEMPTS: usize = 3;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    customer_id: i32,
    total: Decimal,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: PaymentMethod,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            customer_id: UserId::new(self.customer_id),
            items,
            total: Price::from(self.total),
            status: self.status,
            payment_status: self.payment_status,
            payment_method: self.payment_method,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: Price::from(row.unit_price),
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for a customer. The caller validates the payload.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if a referenced product is missing or
    ///   inactive.
    /// - `RepositoryError::Conflict` if stock is insufficient.
    /// - `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        customer_id: UserId,
        new_order: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        self.create_with_numbers(customer_id, new_order, &mut || {
            generate_order_number(Utc::now(), &mut rand::rng())
        })
        .await
    }

    /// Like [`Self::create`], drawing order-number candidates from
    /// `next_number`.
    #[instrument(skip(self, new_order, next_number), fields(customer = %customer_id))]
    pub async fn create_with_numbers(
        &self,
        customer_id: UserId,
        new_order: &NewOrder,
        next_number: &mut (dyn FnMut() -> String + Send),
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Snapshot prices and decrement stock under row locks.
        let mut snapshots: Vec<(ProductId, i32, Decimal)> = Vec::with_capacity(new_order.items.len());
        let mut total = Decimal::ZERO;
        for item in &new_order.items {
            let row: Option<(Decimal, i32)> = sqlx::query_as(
                "SELECT price, stock FROM marketplace.products \
                 WHERE id = $1 AND is_active FOR UPDATE",
            )
            .bind(item.product_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;
            let (price, stock) = row.ok_or(RepositoryError::NotFound)?;

            if stock < item.quantity {
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for product {}",
                    item.product_id
                )));
            }

            sqlx::query("UPDATE marketplace.products SET stock = stock - $2 WHERE id = $1")
                .bind(item.product_id.as_i32())
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;

            total += price * Decimal::from(item.quantity);
            snapshots.push((item.product_id, item.quantity, price));
        }

        // Insert the order header, retrying on order-number collision. Each
        // attempt runs under a savepoint: a unique violation aborts the
        // innermost transaction block only, so the stock work above survives
        // the retry.
        let order_row = {
            let sql = format!(
                "INSERT INTO marketplace.orders \
                 (order_number, customer_id, total, payment_method) \
                 VALUES ($1, $2, $3, $4) RETURNING {ORDER_COLUMNS}"
            );
            let mut attempt = 0;
            loop {
                let number = next_number();
                let mut sp = tx.begin().await?;
                let result = sqlx::query_as::<_, OrderRow>(&sql)
                    .bind(&number)
                    .bind(customer_id.as_i32())
                    .bind(total)
                    .bind(new_order.payment_method)
                    .fetch_one(&mut *sp)
                    .await;
                match result {
                    Ok(row) => {
                        sp.commit().await?;
                        break row;
                    }
                    Err(sqlx::Error::Database(db))
                        if db.is_unique_violation() && attempt + 1 < MAX_ORDER_NUMBER_ATTEMPTS =>
                    {
                        sp.rollback().await?;
                        attempt += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let mut items = Vec::with_capacity(snapshots.len());
        for (product_id, quantity, unit_price) in snapshots {
            let row = sqlx::query_as::<_, OrderItemRow>(
                "INSERT INTO marketplace.order_items (order_id, product_id, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, product_id, quantity, unit_price",
            )
            .bind(order_row.id)
            .bind(product_id.as_i32())
            .bind(quantity)
            .bind(unit_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(OrderItem::from(row));
        }

        tx.commit().await?;
        Ok(order_row.into_order(items))
    }

    /// Get an order by ID, scoped to the owning customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: OrderId,
        customer_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM marketplace.orders \
             WHERE id = $1 AND customer_id = $2"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i32())
            .bind(customer_id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };
        let items = self.items_for(OrderId::new(row.id)).await?;
        Ok(Some(row.into_order(items)))
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: UserId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM marketplace.orders \
             WHERE customer_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(customer_id.as_i32())
            .fetch_all(self.pool)
            .await?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(OrderId::new(row.id)).await?;
            orders.push(row.into_order(items));
        }
        Ok(orders)
    }

    /// Advance an order's status, enforcing legal transitions under a row
    /// lock. The order number is never touched.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the order does not exist.
    /// - `RepositoryError::IllegalTransition` for a forbidden status change.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM marketplace.orders WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(RepositoryError::IllegalTransition {
                from: current,
                to: next,
            });
        }

        let sql = format!(
            "UPDATE marketplace.orders SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i32())
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        let items = self.items_for(OrderId::new(row.id)).await?;
        Ok(row.into_order(items))
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, product_id, quantity, unit_price \
             FROM marketplace.order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}
