//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! Sales are append-only: the checkout workflow inserts a sale together
//! with its items inside one transaction, and nothing here mutates them
//! afterwards. Sale items use the snapshot pattern — product details are
//! copied from the cart line, so the sale history survives later catalog
//! changes.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use minimart_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, register_id, client_id, cost_cents, subtotal_cents, \
     tax_cents, discount_cents, total_cents, paid_cents, payment_method, \
     item_count, status, created_by, created_at";

/// Inserts a sale.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, register_id = %sale.register_id, total_cents = sale.total_cents, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, register_id, client_id, cost_cents,
            subtotal_cents, tax_cents, discount_cents, total_cents,
            paid_cents, payment_method, item_count, status,
            created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.register_id)
    .bind(&sale.client_id)
    .bind(sale.cost_cents)
    .bind(sale.subtotal_cents)
    .bind(sale.tax_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.paid_cents)
    .bind(sale.payment_method)
    .bind(sale.item_count)
    .bind(sale.status)
    .bind(&sale.created_by)
    .bind(sale.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts a sale item snapshot.
pub async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Inserting sale item");

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, name,
            unit_price_cents, quantity, subtotal_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.name)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.subtotal_cents)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets a sale by ID.
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sale =
        sqlx::query_as::<_, Sale>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

    Ok(sale)
}

/// Gets all items of a sale, in insertion order.
pub async fn items(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        "SELECT id, sale_id, product_id, name, unit_price_cents, quantity, \
                subtotal_cents, created_at \
         FROM sale_items WHERE sale_id = ?1 ORDER BY created_at",
    )
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

/// Lists the sales settled into one register session, newest first.
pub async fn list_for_register(
    conn: &mut SqliteConnection,
    register_id: &str,
) -> DbResult<Vec<Sale>> {
    let sales = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM sales \
         WHERE register_id = ?1 ORDER BY created_at DESC"
    ))
    .bind(register_id)
    .fetch_all(conn)
    .await?;

    Ok(sales)
}
