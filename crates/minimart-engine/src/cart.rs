//! # Cart Service
//!
//! The working set of unconfirmed line items for one register.
//!
//! ## Price Freezing
//! `add_item` snapshots the product's name, cost and price into the line.
//! Later catalog price changes never retroactively alter an open cart.
//!
//! ## No Stock Check Here
//! Adding to the cart does not reserve or verify stock; availability is
//! enforced once, at sale completion, by the conditional decrement.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use minimart_core::validation::{validate_id, validate_line_quantity};
use minimart_core::{CartLine, LineState, Money, MAX_CART_LINES};
use minimart_db::repository::{cart, product};
use minimart_db::Database;

use crate::error::{PosError, PosResult};

/// Cart operations for a register.
#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    pub(crate) fn new(db: Database) -> Self {
        CartService { db }
    }

    /// Adds one unit of a product to the register's cart.
    ///
    /// If an ACTIVE line for (register, product) exists its quantity is
    /// incremented by 1; otherwise a new quantity-1 line is created with
    /// the product's current name/cost/price frozen in.
    ///
    /// ## Errors
    /// - `NotFound` when the product does not exist
    /// - `CartFull` when the cart already has [`MAX_CART_LINES`] lines
    pub async fn add_item(&self, register_id: &str, product_id: &str) -> PosResult<CartLine> {
        validate_id("register_id", register_id)?;
        validate_id("product_id", product_id)?;

        debug!(register_id = %register_id, product_id = %product_id, "add_item");

        let mut tx = self.db.begin().await?;

        if let Some(line) = cart::find_active_line(&mut tx, register_id, product_id).await? {
            validate_line_quantity(line.quantity + 1)?;
            cart::increment_line_quantity(&mut tx, &line.id).await?;
            let updated = cart::get_line(&mut tx, &line.id)
                .await?
                .ok_or_else(|| PosError::not_found("Cart line", &line.id))?;
            tx.commit().await?;

            info!(line_id = %updated.id, quantity = updated.quantity, "Cart line quantity updated");
            return Ok(updated);
        }

        let lines = cart::active_lines(&mut tx, register_id).await?;
        if lines.len() >= MAX_CART_LINES {
            return Err(PosError::cart_full());
        }

        let product = product::get_by_id(&mut tx, product_id)
            .await?
            .ok_or_else(|| PosError::not_found("Product", product_id))?;

        let line = CartLine {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_cost_cents: product.cost_cents,
            unit_price_cents: product.price_cents,
            quantity: 1,
            slot_number: 0,
            state: LineState::Active,
            created_at: Utc::now(),
        };

        cart::insert_line(&mut tx, &line).await?;
        tx.commit().await?;

        info!(line_id = %line.id, register_id = %register_id, name = %line.name, "Product added to cart");
        Ok(line)
    }

    /// Sets a line's quantity and returns the updated line.
    ///
    /// Quantities below 1 are rejected — use [`remove_item`](Self::remove_item)
    /// to take a line out of the cart.
    pub async fn set_quantity(&self, line_id: &str, quantity: i64) -> PosResult<CartLine> {
        validate_line_quantity(quantity)?;

        let mut tx = self.db.begin().await?;

        let line = cart::get_line(&mut tx, line_id)
            .await?
            .ok_or_else(|| PosError::not_found("Cart line", line_id))?;

        cart::set_line_quantity(&mut tx, &line.id, quantity).await?;
        tx.commit().await?;

        debug!(line_id = %line_id, quantity, "Cart line quantity set");
        Ok(CartLine { quantity, ..line })
    }

    /// Removes a line unconditionally. Idempotent.
    pub async fn remove_item(&self, line_id: &str) -> PosResult<()> {
        let mut conn = self.db.acquire().await?;
        cart::delete_line(&mut conn, line_id).await?;

        debug!(line_id = %line_id, "Cart line removed");
        Ok(())
    }

    /// Lists the register's ACTIVE lines for display, oldest first.
    pub async fn lines(&self, register_id: &str) -> PosResult<Vec<CartLine>> {
        let mut conn = self.db.acquire().await?;
        Ok(cart::active_lines(&mut conn, register_id).await?)
    }

    /// Subtotal over ACTIVE lines: Σ unit price × quantity.
    pub async fn subtotal(&self, register_id: &str) -> PosResult<Money> {
        let mut conn = self.db.acquire().await?;
        let cents = cart::active_subtotal_cents(&mut conn, register_id).await?;
        Ok(Money::from_cents(cents))
    }

    /// Total units over ACTIVE lines: Σ quantity.
    pub async fn item_count(&self, register_id: &str) -> PosResult<i64> {
        let mut conn = self.db.acquire().await?;
        Ok(cart::active_item_count(&mut conn, register_id).await?)
    }

    /// Deletes every ACTIVE line of the register (explicit reset).
    ///
    /// Held lines are untouched; they still belong to their slots.
    pub async fn clear(&self, register_id: &str) -> PosResult<u64> {
        let mut conn = self.db.acquire().await?;
        let removed = cart::delete_active_lines(&mut conn, register_id).await?;

        info!(register_id = %register_id, removed, "Cart cleared");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
