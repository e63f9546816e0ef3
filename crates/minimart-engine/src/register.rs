//! # Register Service
//!
//! The register session state machine.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   (no session) ──open──► OPEN ──close──► CLOSED (terminal)          │
//! │                            │                                        │
//! │                            └── settle (once per completed sale)     │
//! │                                                                     │
//! │  Invariant: at most one OPEN session per store. Enforced here at    │
//! │  open-time and by the partial unique index underneath.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A CLOSED session is immutable: settle and close both fail with
//! `SessionClosed` once the drawer has been counted.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use minimart_core::validation::{validate_amount_cents, validate_id};
use minimart_core::{Money, PaymentMethod, RegisterSession, RegisterStatus};
use minimart_db::repository::register;
use minimart_db::{Database, DbError};

use crate::error::{PosError, PosResult};

/// Register session lifecycle operations.
#[derive(Debug, Clone)]
pub struct RegisterService {
    db: Database,
}

impl RegisterService {
    pub(crate) fn new(db: Database) -> Self {
        RegisterService { db }
    }

    /// Opens a new session for a store with the counted opening cash.
    ///
    /// ## Errors
    /// `RegisterAlreadyOpen` when the store already has an OPEN session.
    /// Two racing opens both reach the insert; the loser trips the
    /// partial unique index and gets the same error.
    pub async fn open(
        &self,
        user_id: &str,
        store_id: &str,
        opening_cash: Money,
    ) -> PosResult<RegisterSession> {
        validate_id("user_id", user_id)?;
        validate_id("store_id", store_id)?;
        validate_amount_cents("opening_cash", opening_cash.cents())?;

        let mut tx = self.db.begin().await?;

        if register::find_open_for_store(&mut tx, store_id).await?.is_some() {
            return Err(PosError::RegisterAlreadyOpen {
                store_id: store_id.to_string(),
            });
        }

        let session = RegisterSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            store_id: store_id.to_string(),
            opening_cash_cents: opening_cash.cents(),
            cash_total_cents: 0,
            cash_settled_cents: 0,
            card_total_cents: 0,
            card_settled_cents: 0,
            cheque_total_cents: 0,
            cheque_settled_cents: 0,
            status: RegisterStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            closed_by: None,
            note: None,
        };

        match register::insert(&mut tx, &session).await {
            Ok(()) => {}
            Err(DbError::UniqueViolation { .. }) => {
                return Err(PosError::RegisterAlreadyOpen {
                    store_id: store_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;

        info!(session_id = %session.id, store_id = %store_id, opening_cash = %opening_cash, "Register opened");
        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get(&self, session_id: &str) -> PosResult<RegisterSession> {
        let mut conn = self.db.acquire().await?;
        register::get(&mut conn, session_id)
            .await?
            .ok_or_else(|| PosError::not_found("Register session", session_id))
    }

    /// The store's OPEN session, if any.
    pub async fn open_for_store(&self, store_id: &str) -> PosResult<Option<RegisterSession>> {
        let mut conn = self.db.acquire().await?;
        Ok(register::find_open_for_store(&mut conn, store_id).await?)
    }

    /// Adds a completed sale's amount to the session's totals for the
    /// payment method (both the lifetime total and the settled sub-total).
    ///
    /// ## Errors
    /// - `NotFound` when the session does not exist
    /// - `SessionClosed` when the session is CLOSED
    pub async fn settle(
        &self,
        session_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> PosResult<RegisterSession> {
        validate_amount_cents("amount", amount.cents())?;

        let mut tx = self.db.begin().await?;

        let session = register::get(&mut tx, session_id)
            .await?
            .ok_or_else(|| PosError::not_found("Register session", session_id))?;
        if !session.is_open() {
            return Err(PosError::SessionClosed {
                session_id: session_id.to_string(),
            });
        }

        register::add_settlement(&mut tx, session_id, method, amount.cents()).await?;

        let updated = register::get(&mut tx, session_id)
            .await?
            .ok_or_else(|| PosError::not_found("Register session", session_id))?;
        tx.commit().await?;

        info!(session_id = %session_id, ?method, amount = %amount, "Sale settled into register");
        Ok(updated)
    }

    /// Closes the session. Irreversible.
    ///
    /// ## Errors
    /// - `NotFound` when the session does not exist
    /// - `SessionClosed` when it was already closed
    pub async fn close(
        &self,
        session_id: &str,
        closed_by: &str,
        note: Option<&str>,
    ) -> PosResult<RegisterSession> {
        validate_id("closed_by", closed_by)?;

        let mut tx = self.db.begin().await?;

        let session = register::get(&mut tx, session_id)
            .await?
            .ok_or_else(|| PosError::not_found("Register session", session_id))?;
        if !session.is_open() {
            return Err(PosError::SessionClosed {
                session_id: session_id.to_string(),
            });
        }

        register::close(&mut tx, session_id, closed_by, note, Utc::now()).await?;

        let closed = register::get(&mut tx, session_id)
            .await?
            .ok_or_else(|| PosError::not_found("Register session", session_id))?;
        tx.commit().await?;

        info!(session_id = %session_id, closed_by = %closed_by, "Register closed");
        Ok(closed)
    }

    /// Informational drawer balance: opening cash + all lifetime totals.
    /// Does not mutate.
    pub async fn balance(&self, session_id: &str) -> PosResult<Money> {
        let session = self.get(session_id).await?;
        Ok(session.balance())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pos;
    use minimart_db::DbConfig;

    async fn test_pos() -> Pos {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Pos::new(db)
    }

    #[tokio::test]
    async fn test_open_starts_with_zero_totals() {
        let pos = test_pos().await;

        let session = pos
            .registers()
            .open("user-1", "store-1", Money::from_cents(10_000))
            .await
            .unwrap();

        assert_eq!(session.status, RegisterStatus::Open);
        assert_eq!(session.opening_cash_cents, 10_000);
        assert_eq!(session.cash_total_cents, 0);
        assert_eq!(session.card_total_cents, 0);
        assert_eq!(session.cheque_total_cents, 0);
        assert_eq!(session.balance().cents(), 10_000);
    }

    #[tokio::test]
    async fn test_second_open_for_store_conflicts() {
        let pos = test_pos().await;

        pos.registers()
            .open("user-1", "store-1", Money::zero())
            .await
            .unwrap();

        let err = pos
            .registers()
            .open("user-2", "store-1", Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::RegisterAlreadyOpen { .. }));

        // a different store is unaffected
        pos.registers()
            .open("user-2", "store-2", Money::zero())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reopen_after_close_is_allowed() {
        let pos = test_pos().await;

        let first = pos
            .registers()
            .open("user-1", "store-1", Money::zero())
            .await
            .unwrap();
        pos.registers()
            .close(&first.id, "user-1", Some("end of shift"))
            .await
            .unwrap();

        let second = pos
            .registers()
            .open("user-2", "store-1", Money::zero())
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_settle_accumulates_per_method() {
        let pos = test_pos().await;
        let session = pos
            .registers()
            .open("user-1", "store-1", Money::from_cents(5_000))
            .await
            .unwrap();

        pos.registers()
            .settle(&session.id, PaymentMethod::Cash, Money::from_cents(3_000))
            .await
            .unwrap();
        pos.registers()
            .settle(&session.id, PaymentMethod::Card, Money::from_cents(2_000))
            .await
            .unwrap();
        let updated = pos
            .registers()
            .settle(&session.id, PaymentMethod::Cash, Money::from_cents(1_000))
            .await
            .unwrap();

        assert_eq!(updated.cash_total_cents, 4_000);
        assert_eq!(updated.cash_settled_cents, 4_000);
        assert_eq!(updated.card_total_cents, 2_000);
        assert_eq!(updated.cheque_total_cents, 0);

        // balance = opening + cash + card + cheque
        assert_eq!(
            pos.registers().balance(&session.id).await.unwrap().cents(),
            11_000
        );
    }

    #[tokio::test]
    async fn test_closed_session_is_immutable() {
        let pos = test_pos().await;
        let session = pos
            .registers()
            .open("user-1", "store-1", Money::zero())
            .await
            .unwrap();

        let closed = pos
            .registers()
            .close(&session.id, "manager-1", Some("drawer counted"))
            .await
            .unwrap();
        assert_eq!(closed.status, RegisterStatus::Closed);
        assert_eq!(closed.closed_by.as_deref(), Some("manager-1"));
        assert!(closed.closed_at.is_some());

        let err = pos
            .registers()
            .settle(&session.id, PaymentMethod::Cash, Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::SessionClosed { .. }));

        let err = pos
            .registers()
            .close(&session.id, "manager-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::SessionClosed { .. }));
    }

    #[tokio::test]
    async fn test_open_for_store_lookup() {
        let pos = test_pos().await;

        assert!(pos
            .registers()
            .open_for_store("store-1")
            .await
            .unwrap()
            .is_none());

        let session = pos
            .registers()
            .open("user-1", "store-1", Money::zero())
            .await
            .unwrap();

        let found = pos
            .registers()
            .open_for_store("store-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, session.id);
    }
}
