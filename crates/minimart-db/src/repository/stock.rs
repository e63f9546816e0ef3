//! # Stock Repository
//!
//! Quantity-on-hand per (location, product).
//!
//! ## The Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Overselling is prevented in exactly one place:                     │
//! │                                                                     │
//! │    UPDATE stocks SET quantity = quantity - ?                        │
//! │    WHERE ... AND quantity >= ?                                      │
//! │                                                                     │
//! │  rows_affected == 0  →  insufficient stock (or no record = 0)       │
//! │  rows_affected == 1  →  decrement applied atomically                │
//! │                                                                     │
//! │  Two concurrent checkouts of the same product serialize on this     │
//! │  row write; the loser observes the already-reduced quantity.        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use minimart_core::{Location, StockRecord};

const STOCK_COLUMNS: &str = "location_type, location_id, product_id, quantity, price_cents";

/// Gets the stock record for (location, product), if present.
pub async fn get(
    conn: &mut SqliteConnection,
    location: &Location,
    product_id: &str,
) -> DbResult<Option<StockRecord>> {
    let record = sqlx::query_as::<_, StockRecord>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stocks \
         WHERE location_type = ?1 AND location_id = ?2 AND product_id = ?3"
    ))
    .bind(location.kind())
    .bind(location.id())
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(record)
}

/// Quantity on hand; 0 when no record exists (valid zero-stock state).
pub async fn available(
    conn: &mut SqliteConnection,
    location: &Location,
    product_id: &str,
) -> DbResult<i64> {
    let quantity: i64 = sqlx::query_scalar(
        "SELECT COALESCE( \
            (SELECT quantity FROM stocks \
             WHERE location_type = ?1 AND location_id = ?2 AND product_id = ?3), 0)",
    )
    .bind(location.kind())
    .bind(location.id())
    .bind(product_id)
    .fetch_one(conn)
    .await?;

    Ok(quantity)
}

/// Attempts the conditional atomic decrement.
///
/// ## Returns
/// * `Ok(true)` - quantity reduced
/// * `Ok(false)` - insufficient stock (including missing record); nothing
///   was written, the caller maps this to its error type
pub async fn try_reduce(
    conn: &mut SqliteConnection,
    location: &Location,
    product_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    debug!(
        location = %location.id(),
        product_id = %product_id,
        quantity,
        "Reducing stock"
    );

    let result = sqlx::query(
        "UPDATE stocks SET quantity = quantity - ?4 \
         WHERE location_type = ?1 AND location_id = ?2 AND product_id = ?3 \
         AND quantity >= ?4",
    )
    .bind(location.kind())
    .bind(location.id())
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Adds quantity, creating the record (from 0) when absent.
pub async fn upsert_increase(
    conn: &mut SqliteConnection,
    location: &Location,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    debug!(
        location = %location.id(),
        product_id = %product_id,
        quantity,
        "Increasing stock"
    );

    sqlx::query(
        r#"
        INSERT INTO stocks (location_type, location_id, product_id, quantity)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (location_type, location_id, product_id)
        DO UPDATE SET quantity = stocks.quantity + excluded.quantity
        "#,
    )
    .bind(location.kind())
    .bind(location.id())
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(())
}

/// Absolute overwrite of quantity (stock-take correction), optionally
/// setting the per-location price.
pub async fn upsert_set(
    conn: &mut SqliteConnection,
    location: &Location,
    product_id: &str,
    quantity: i64,
    price_cents: Option<i64>,
) -> DbResult<()> {
    debug!(
        location = %location.id(),
        product_id = %product_id,
        quantity,
        "Setting stock quantity"
    );

    sqlx::query(
        r#"
        INSERT INTO stocks (location_type, location_id, product_id, quantity, price_cents)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (location_type, location_id, product_id)
        DO UPDATE SET
            quantity = excluded.quantity,
            price_cents = COALESCE(excluded.price_cents, stocks.price_cents)
        "#,
    )
    .bind(location.kind())
    .bind(location.id())
    .bind(product_id)
    .bind(quantity)
    .bind(price_cents)
    .execute(conn)
    .await?;

    Ok(())
}

/// All stock records for a product across locations.
pub async fn by_product(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Vec<StockRecord>> {
    let records = sqlx::query_as::<_, StockRecord>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stocks \
         WHERE product_id = ?1 \
         ORDER BY location_type, location_id"
    ))
    .bind(product_id)
    .fetch_all(conn)
    .await?;

    Ok(records)
}
