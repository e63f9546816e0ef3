//! # Register Repository
//!
//! Register session rows: the open/close lifecycle of a cash drawer and
//! its settlement totals.
//!
//! Guarded UPDATEs carry `AND status = 'open'` so that a CLOSED session
//! can never be settled or re-closed, even by a stale caller racing the
//! close. The partial unique index on (store_id WHERE status='open')
//! backs the one-open-session-per-store invariant.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use minimart_core::{PaymentMethod, RegisterSession, RegisterStatus};

const SESSION_COLUMNS: &str = "id, user_id, store_id, opening_cash_cents, \
     cash_total_cents, cash_settled_cents, card_total_cents, card_settled_cents, \
     cheque_total_cents, cheque_settled_cents, status, opened_at, closed_at, \
     closed_by, note";

/// Inserts a newly opened session.
///
/// A second OPEN session for the same store violates the partial unique
/// index and surfaces as `DbError::UniqueViolation`.
pub async fn insert(conn: &mut SqliteConnection, session: &RegisterSession) -> DbResult<()> {
    debug!(id = %session.id, store_id = %session.store_id, "Inserting register session");

    sqlx::query(
        r#"
        INSERT INTO register_sessions (
            id, user_id, store_id, opening_cash_cents,
            cash_total_cents, cash_settled_cents,
            card_total_cents, card_settled_cents,
            cheque_total_cents, cheque_settled_cents,
            status, opened_at, closed_at, closed_by, note
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(&session.store_id)
    .bind(session.opening_cash_cents)
    .bind(session.cash_total_cents)
    .bind(session.cash_settled_cents)
    .bind(session.card_total_cents)
    .bind(session.card_settled_cents)
    .bind(session.cheque_total_cents)
    .bind(session.cheque_settled_cents)
    .bind(session.status)
    .bind(session.opened_at)
    .bind(session.closed_at)
    .bind(&session.closed_by)
    .bind(&session.note)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets a session by ID.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<RegisterSession>> {
    let session = sqlx::query_as::<_, RegisterSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(session)
}

/// Finds the OPEN session for a store, if any.
pub async fn find_open_for_store(
    conn: &mut SqliteConnection,
    store_id: &str,
) -> DbResult<Option<RegisterSession>> {
    let session = sqlx::query_as::<_, RegisterSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM register_sessions \
         WHERE store_id = ?1 AND status = ?2"
    ))
    .bind(store_id)
    .bind(RegisterStatus::Open)
    .fetch_optional(conn)
    .await?;

    Ok(session)
}

/// Adds a settlement amount to both the lifetime total and the settled
/// sub-total of the given payment method.
///
/// ## Returns
/// NotFound when the session does not exist **or is not OPEN** — the
/// caller distinguishes the two by loading the session first.
pub async fn add_settlement(
    conn: &mut SqliteConnection,
    session_id: &str,
    method: PaymentMethod,
    amount_cents: i64,
) -> DbResult<()> {
    debug!(session_id = %session_id, ?method, amount_cents, "Settling sale into register session");

    let sql = match method {
        PaymentMethod::Cash => {
            "UPDATE register_sessions SET \
                cash_total_cents = cash_total_cents + ?2, \
                cash_settled_cents = cash_settled_cents + ?2 \
             WHERE id = ?1 AND status = ?3"
        }
        PaymentMethod::Card => {
            "UPDATE register_sessions SET \
                card_total_cents = card_total_cents + ?2, \
                card_settled_cents = card_settled_cents + ?2 \
             WHERE id = ?1 AND status = ?3"
        }
        PaymentMethod::Cheque => {
            "UPDATE register_sessions SET \
                cheque_total_cents = cheque_total_cents + ?2, \
                cheque_settled_cents = cheque_settled_cents + ?2 \
             WHERE id = ?1 AND status = ?3"
        }
    };

    let result = sqlx::query(sql)
        .bind(session_id)
        .bind(amount_cents)
        .bind(RegisterStatus::Open)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Open register session", session_id));
    }

    Ok(())
}

/// Closes a session: records who, when, and the drawer note.
///
/// ## Returns
/// NotFound when the session does not exist or is already CLOSED.
pub async fn close(
    conn: &mut SqliteConnection,
    session_id: &str,
    closed_by: &str,
    note: Option<&str>,
    closed_at: DateTime<Utc>,
) -> DbResult<()> {
    debug!(session_id = %session_id, closed_by = %closed_by, "Closing register session");

    let result = sqlx::query(
        "UPDATE register_sessions SET status = ?2, closed_at = ?3, closed_by = ?4, note = ?5 \
         WHERE id = ?1 AND status = ?6",
    )
    .bind(session_id)
    .bind(RegisterStatus::Closed)
    .bind(closed_at)
    .bind(closed_by)
    .bind(note)
    .bind(RegisterStatus::Open)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Open register session", session_id));
    }

    Ok(())
}
