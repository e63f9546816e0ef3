//! # Product Repository
//!
//! Catalog lookups used by the cart workflow, plus the inserts the seed
//! binary and tests need. Full catalog CRUD lives outside the checkout
//! core.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use minimart_core::Product;

/// Inserts a product.
pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(id = %product.id, sku = %product.sku, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (id, sku, name, cost_cents, price_cents, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&product.id)
    .bind(&product.sku)
    .bind(&product.name)
    .bind(product.cost_cents)
    .bind(product.price_cents)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets a product by its ID.
///
/// ## Returns
/// * `Ok(Some(Product))` - Product found
/// * `Ok(None)` - Product not found
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, sku, name, cost_cents, price_cents, is_active, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Lists active products sorted by name.
pub async fn list_active(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, sku, name, cost_cents, price_cents, is_active, created_at, updated_at
        FROM products
        WHERE is_active = 1
        ORDER BY name
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await?;

    Ok(products)
}
