//! # Cart Repository
//!
//! Cart line storage for the per-register working cart.
//!
//! ## Line States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Cart Line Lifecycle                            │
//! │                                                                     │
//! │  add_item ──► ACTIVE (slot 0) ──┬── hold ──► HELD (slot N)          │
//! │                  ▲              │                │                  │
//! │                  │              │                │ select           │
//! │                  └──────────────┼────────────────┘                  │
//! │                                 │                                   │
//! │                                 ├── complete_sale ──► deleted       │
//! │                                 └── remove/clear ───► deleted       │
//! │                                                                     │
//! │  subtotal / item_count aggregate ACTIVE lines only.                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use minimart_core::{CartLine, LineState};

const LINE_COLUMNS: &str = "id, register_id, product_id, name, unit_cost_cents, \
     unit_price_cents, quantity, slot_number, state, created_at";

/// Inserts a new cart line.
pub async fn insert_line(conn: &mut SqliteConnection, line: &CartLine) -> DbResult<()> {
    debug!(id = %line.id, register_id = %line.register_id, product_id = %line.product_id, "Inserting cart line");

    sqlx::query(
        r#"
        INSERT INTO cart_lines (
            id, register_id, product_id, name,
            unit_cost_cents, unit_price_cents, quantity,
            slot_number, state, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&line.id)
    .bind(&line.register_id)
    .bind(&line.product_id)
    .bind(&line.name)
    .bind(line.unit_cost_cents)
    .bind(line.unit_price_cents)
    .bind(line.quantity)
    .bind(line.slot_number)
    .bind(line.state)
    .bind(line.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets a cart line by ID.
pub async fn get_line(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<CartLine>> {
    let line = sqlx::query_as::<_, CartLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM cart_lines WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(line)
}

/// Finds the ACTIVE line for (register, product), if any.
///
/// Used by add-to-cart to decide between increment and insert.
pub async fn find_active_line(
    conn: &mut SqliteConnection,
    register_id: &str,
    product_id: &str,
) -> DbResult<Option<CartLine>> {
    let line = sqlx::query_as::<_, CartLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM cart_lines \
         WHERE register_id = ?1 AND product_id = ?2 AND state = ?3"
    ))
    .bind(register_id)
    .bind(product_id)
    .bind(LineState::Active)
    .fetch_optional(conn)
    .await?;

    Ok(line)
}

/// Lists the ACTIVE lines of a register, oldest first.
pub async fn active_lines(
    conn: &mut SqliteConnection,
    register_id: &str,
) -> DbResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM cart_lines \
         WHERE register_id = ?1 AND state = ?2 \
         ORDER BY created_at"
    ))
    .bind(register_id)
    .bind(LineState::Active)
    .fetch_all(conn)
    .await?;

    Ok(lines)
}

/// Lists the lines parked at a hold slot.
pub async fn lines_at_slot(
    conn: &mut SqliteConnection,
    register_id: &str,
    slot_number: i64,
) -> DbResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM cart_lines \
         WHERE register_id = ?1 AND slot_number = ?2 AND state = ?3 \
         ORDER BY created_at"
    ))
    .bind(register_id)
    .bind(slot_number)
    .bind(LineState::Held)
    .fetch_all(conn)
    .await?;

    Ok(lines)
}

/// Sets a line's quantity.
///
/// Errors with NotFound when the line does not exist.
pub async fn set_line_quantity(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE cart_lines SET quantity = ?2 WHERE id = ?1")
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Cart line", id));
    }

    Ok(())
}

/// Increments a line's quantity by one (repeat add-to-cart).
pub async fn increment_line_quantity(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let result = sqlx::query("UPDATE cart_lines SET quantity = quantity + 1 WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Cart line", id));
    }

    Ok(())
}

/// Deletes a line unconditionally.
pub async fn delete_line(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM cart_lines WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Deletes every ACTIVE line of a register (sale completion, reset).
pub async fn delete_active_lines(conn: &mut SqliteConnection, register_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE register_id = ?1 AND state = ?2")
        .bind(register_id)
        .bind(LineState::Active)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes every line parked at a hold slot.
pub async fn delete_lines_at_slot(
    conn: &mut SqliteConnection,
    register_id: &str,
    slot_number: i64,
) -> DbResult<u64> {
    let result = sqlx::query(
        "DELETE FROM cart_lines WHERE register_id = ?1 AND slot_number = ?2 AND state = ?3",
    )
    .bind(register_id)
    .bind(slot_number)
    .bind(LineState::Held)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Parks every ACTIVE line of a register under a hold slot.
pub async fn hold_active_lines(
    conn: &mut SqliteConnection,
    register_id: &str,
    slot_number: i64,
) -> DbResult<u64> {
    debug!(register_id = %register_id, slot_number, "Holding active cart lines");

    let result = sqlx::query(
        "UPDATE cart_lines SET state = ?3, slot_number = ?2 \
         WHERE register_id = ?1 AND state = ?4",
    )
    .bind(register_id)
    .bind(slot_number)
    .bind(LineState::Held)
    .bind(LineState::Active)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Re-activates every line parked at a hold slot (slot number resets to 0).
pub async fn activate_lines_at_slot(
    conn: &mut SqliteConnection,
    register_id: &str,
    slot_number: i64,
) -> DbResult<u64> {
    debug!(register_id = %register_id, slot_number, "Activating held cart lines");

    let result = sqlx::query(
        "UPDATE cart_lines SET state = ?3, slot_number = 0 \
         WHERE register_id = ?1 AND slot_number = ?2 AND state = ?4",
    )
    .bind(register_id)
    .bind(slot_number)
    .bind(LineState::Active)
    .bind(LineState::Held)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Subtotal over ACTIVE lines: Σ unit_price × quantity, in cents.
pub async fn active_subtotal_cents(
    conn: &mut SqliteConnection,
    register_id: &str,
) -> DbResult<i64> {
    let subtotal: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(unit_price_cents * quantity), 0) \
         FROM cart_lines WHERE register_id = ?1 AND state = ?2",
    )
    .bind(register_id)
    .bind(LineState::Active)
    .fetch_one(conn)
    .await?;

    Ok(subtotal)
}

/// Total units over ACTIVE lines: Σ quantity.
pub async fn active_item_count(conn: &mut SqliteConnection, register_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity), 0) \
         FROM cart_lines WHERE register_id = ?1 AND state = ?2",
    )
    .bind(register_id)
    .bind(LineState::Active)
    .fetch_one(conn)
    .await?;

    Ok(count)
}
