//! # Hold Repository
//!
//! Bookkeeping rows for parked carts. The cart lines themselves stay in
//! `cart_lines` with state HELD; a hold row exists iff at least one line
//! carries its slot number.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use minimart_core::HoldSlot;

/// Inserts a hold slot row.
pub async fn insert(conn: &mut SqliteConnection, hold: &HoldSlot) -> DbResult<()> {
    debug!(register_id = %hold.register_id, slot_number = hold.slot_number, "Inserting hold slot");

    sqlx::query("INSERT INTO holds (register_id, slot_number, created_at) VALUES (?1, ?2, ?3)")
        .bind(&hold.register_id)
        .bind(hold.slot_number)
        .bind(hold.created_at)
        .execute(conn)
        .await?;

    Ok(())
}

/// Highest slot number ever live for a register, 0 when none.
///
/// The next hold takes max + 1. Slots freed by removal may be reused;
/// only uniqueness among currently-live slots is guaranteed.
pub async fn max_slot_number(conn: &mut SqliteConnection, register_id: &str) -> DbResult<i64> {
    let max: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(slot_number), 0) FROM holds WHERE register_id = ?1")
            .bind(register_id)
            .fetch_one(conn)
            .await?;

    Ok(max)
}

/// Gets one hold slot, if present.
pub async fn get(
    conn: &mut SqliteConnection,
    register_id: &str,
    slot_number: i64,
) -> DbResult<Option<HoldSlot>> {
    let hold = sqlx::query_as::<_, HoldSlot>(
        "SELECT register_id, slot_number, created_at FROM holds \
         WHERE register_id = ?1 AND slot_number = ?2",
    )
    .bind(register_id)
    .bind(slot_number)
    .fetch_optional(conn)
    .await?;

    Ok(hold)
}

/// Deletes a hold slot row. Idempotent.
pub async fn delete(
    conn: &mut SqliteConnection,
    register_id: &str,
    slot_number: i64,
) -> DbResult<()> {
    sqlx::query("DELETE FROM holds WHERE register_id = ?1 AND slot_number = ?2")
        .bind(register_id)
        .bind(slot_number)
        .execute(conn)
        .await?;

    Ok(())
}

/// Lists a register's hold slots, ascending by slot number (for display).
pub async fn list(conn: &mut SqliteConnection, register_id: &str) -> DbResult<Vec<HoldSlot>> {
    let holds = sqlx::query_as::<_, HoldSlot>(
        "SELECT register_id, slot_number, created_at FROM holds \
         WHERE register_id = ?1 ORDER BY slot_number ASC",
    )
    .bind(register_id)
    .fetch_all(conn)
    .await?;

    Ok(holds)
}
