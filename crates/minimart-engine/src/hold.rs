//! # Hold Service
//!
//! Parks and restores a register's cart under numbered slots so a cashier
//! can serve another customer mid-transaction.
//!
//! ## Slot Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  hold    : ACTIVE lines ──► HELD @ slot (max live slot + 1)         │
//! │  select  : discard ACTIVE cart, HELD @ slot ──► ACTIVE (slot 0)     │
//! │  remove  : delete HELD lines + slot row (idempotent)                │
//! │                                                                     │
//! │  Slot numbers are per-register counters. Gaps after removal are     │
//! │  fine; only uniqueness among live slots is guaranteed.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `select` is a destructive swap, not a merge: whatever is in the active
//! cart when a hold is loaded is discarded.

use chrono::Utc;
use tracing::{debug, info};

use minimart_core::validation::validate_id;
use minimart_core::{CartLine, HoldSlot};
use minimart_db::repository::{cart, hold};
use minimart_db::Database;

use crate::error::{PosError, PosResult};

/// Hold operations for a register.
#[derive(Debug, Clone)]
pub struct HoldService {
    db: Database,
}

impl HoldService {
    pub(crate) fn new(db: Database) -> Self {
        HoldService { db }
    }

    /// Parks the register's ACTIVE cart under the next slot number.
    ///
    /// The held lines stay associated with the register but drop out of
    /// subtotal/item-count queries until selected again.
    ///
    /// ## Errors
    /// `EmptyCart` when there is nothing to hold.
    pub async fn hold(&self, register_id: &str) -> PosResult<HoldSlot> {
        validate_id("register_id", register_id)?;

        let mut tx = self.db.begin().await?;

        let lines = cart::active_lines(&mut tx, register_id).await?;
        if lines.is_empty() {
            return Err(PosError::EmptyCart {
                register_id: register_id.to_string(),
            });
        }

        let next_slot = hold::max_slot_number(&mut tx, register_id).await? + 1;

        let slot = HoldSlot {
            register_id: register_id.to_string(),
            slot_number: next_slot,
            created_at: Utc::now(),
        };

        hold::insert(&mut tx, &slot).await?;
        cart::hold_active_lines(&mut tx, register_id, next_slot).await?;

        tx.commit().await?;

        info!(register_id = %register_id, slot_number = next_slot, lines = lines.len(), "Cart held");
        Ok(slot)
    }

    /// Deletes a hold: its lines and its slot row. Idempotent — removing
    /// a slot that does not exist leaves state unchanged.
    pub async fn remove(&self, register_id: &str, slot_number: i64) -> PosResult<()> {
        let mut tx = self.db.begin().await?;

        cart::delete_lines_at_slot(&mut tx, register_id, slot_number).await?;
        hold::delete(&mut tx, register_id, slot_number).await?;

        tx.commit().await?;

        debug!(register_id = %register_id, slot_number, "Hold removed");
        Ok(())
    }

    /// Restores a held cart, discarding the current ACTIVE cart.
    ///
    /// The existence check runs before any mutation, so a failed select
    /// leaves the active cart intact.
    ///
    /// ## Errors
    /// `NotFound` when no lines are parked at the slot.
    pub async fn select(&self, register_id: &str, slot_number: i64) -> PosResult<Vec<CartLine>> {
        let mut tx = self.db.begin().await?;

        let held = cart::lines_at_slot(&mut tx, register_id, slot_number).await?;
        if held.is_empty() {
            return Err(PosError::not_found("Hold", slot_number.to_string()));
        }

        cart::delete_active_lines(&mut tx, register_id).await?;
        cart::activate_lines_at_slot(&mut tx, register_id, slot_number).await?;
        hold::delete(&mut tx, register_id, slot_number).await?;

        let restored = cart::active_lines(&mut tx, register_id).await?;
        tx.commit().await?;

        info!(register_id = %register_id, slot_number, lines = restored.len(), "Hold selected");
        Ok(restored)
    }

    /// Lists the register's holds, ascending by slot number.
    pub async fn list(&self, register_id: &str) -> PosResult<Vec<HoldSlot>> {
        let mut conn = self.db.acquire().await?;
        Ok(hold::list(&mut conn, register_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pos;
    use minimart_core::Product;
    use minimart_db::{repository, DbConfig};
    use uuid::Uuid;

    async fn test_pos() -> Pos {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Pos::new(db)
    }

    async fn seed_product(pos: &Pos, name: &str, price_cents: i64) -> String {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: format!("SKU-{}", Uuid::new_v4()),
            name: name.to_string(),
            cost_cents: price_cents / 2,
            price_cents,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut conn = pos.database().acquire().await.unwrap();
        repository::product::insert(&mut conn, &product).await.unwrap();
        product.id
    }

    #[tokio::test]
    async fn test_hold_empty_cart_rejected() {
        let pos = test_pos().await;

        let err = pos.holds().hold("reg-1").await.unwrap_err();
        assert!(matches!(err, PosError::EmptyCart { .. }));
    }

    #[tokio::test]
    async fn test_hold_assigns_monotonic_slots() {
        let pos = test_pos().await;
        let product_id = seed_product(&pos, "Widget", 100).await;

        pos.cart().add_item("reg-1", &product_id).await.unwrap();
        let first = pos.holds().hold("reg-1").await.unwrap();
        assert_eq!(first.slot_number, 1);

        pos.cart().add_item("reg-1", &product_id).await.unwrap();
        let second = pos.holds().hold("reg-1").await.unwrap();
        assert_eq!(second.slot_number, 2);

        let list = pos.holds().list("reg-1").await.unwrap();
        assert_eq!(
            list.iter().map(|h| h.slot_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn test_held_lines_leave_the_active_cart() {
        let pos = test_pos().await;
        let product_id = seed_product(&pos, "Widget", 100).await;

        pos.cart().add_item("reg-1", &product_id).await.unwrap();
        pos.holds().hold("reg-1").await.unwrap();

        assert_eq!(pos.cart().item_count("reg-1").await.unwrap(), 0);
        assert_eq!(pos.cart().subtotal("reg-1").await.unwrap().cents(), 0);
    }

    #[tokio::test]
    async fn test_select_restores_held_multiset_and_discards_active() {
        let pos = test_pos().await;
        let b = seed_product(&pos, "Product B", 100).await;
        let c = seed_product(&pos, "Product C", 200).await;

        // addItem(B) → hold → addItem(C) → select(slot)
        pos.cart().add_item("reg-1", &b).await.unwrap();
        pos.cart().add_item("reg-1", &b).await.unwrap();
        let slot = pos.holds().hold("reg-1").await.unwrap();

        pos.cart().add_item("reg-1", &c).await.unwrap();

        let restored = pos
            .holds()
            .select("reg-1", slot.slot_number)
            .await
            .unwrap();

        // cart now contains only B at the held quantity; C is discarded
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].product_id, b);
        assert_eq!(restored[0].quantity, 2);
        assert_eq!(restored[0].slot_number, 0);

        let lines = pos.cart().lines("reg-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, b);

        // slot is consumed
        assert!(pos.holds().list("reg-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_select_missing_slot_is_not_found_and_keeps_cart() {
        let pos = test_pos().await;
        let product_id = seed_product(&pos, "Widget", 100).await;
        pos.cart().add_item("reg-1", &product_id).await.unwrap();

        let err = pos.holds().select("reg-1", 7).await.unwrap_err();
        assert!(matches!(err, PosError::NotFound { entity: "Hold", .. }));

        // failed select must not have cleared the active cart
        assert_eq!(pos.cart().item_count("reg-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let pos = test_pos().await;

        // removing a slot that never existed is fine
        pos.holds().remove("reg-1", 42).await.unwrap();
        assert!(pos.holds().list("reg-1").await.unwrap().is_empty());

        let product_id = seed_product(&pos, "Widget", 100).await;
        pos.cart().add_item("reg-1", &product_id).await.unwrap();
        let slot = pos.holds().hold("reg-1").await.unwrap();

        pos.holds().remove("reg-1", slot.slot_number).await.unwrap();
        pos.holds().remove("reg-1", slot.slot_number).await.unwrap();
        assert!(pos.holds().list("reg-1").await.unwrap().is_empty());
    }
}
