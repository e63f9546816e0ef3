//! # Checkout Workflow
//!
//! Converts a register's cart into a recorded sale.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  complete_sale(register_id, input, actor)   — ONE transaction —     │
//! │                                                                     │
//! │  1. load ACTIVE cart lines          (empty cart → rejected)         │
//! │  2. load register session           (must be OPEN)                  │
//! │  3. cost basis + item count         (Σ over cart lines)             │
//! │  4. insert Sale                     (PAID / PARTIAL by paid≥total)  │
//! │  5. per line:                                                       │
//! │       insert SaleItem snapshot                                      │
//! │       reduce stock @ session store  (failure aborts EVERYTHING)     │
//! │  6. settle session (method, total)                                  │
//! │  7. clear the ACTIVE cart                                           │
//! │  8. commit, render receipt                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A half-completed sale that decremented some stock but failed on
//! another line would be data corruption; the single transaction makes
//! that impossible. Settlement and cart-clear happen only after every
//! stock reduction succeeded.
//!
//! Subtotal, tax, discount and total are caller-supplied: tax and
//! discount arithmetic happens outside this workflow, at the surface that
//! knows the store's rules. The workflow records them as given.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use minimart_core::validation::{validate_amount_cents, validate_id};
use minimart_core::{
    Location, Money, PaymentMethod, Receipt, Sale, SaleItem, SaleStatus,
};
use minimart_db::repository::{cart, register, sale, stock};
use minimart_db::Database;

use crate::error::{PosError, PosResult};

// =============================================================================
// Workflow Input / Output
// =============================================================================

/// Caller-supplied amounts for a sale completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleInput {
    /// Optional customer reference.
    pub client_id: Option<String>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    /// Customer-facing amount due (subtotal + tax − discount, computed
    /// by the caller).
    pub total: Money,
    /// Amount tendered.
    pub paid: Money,
    pub payment_method: PaymentMethod,
}

/// The outcome of a completed checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSale {
    pub sale: Sale,
    pub receipt: Receipt,
}

impl CompletedSale {
    /// The printable receipt text.
    pub fn receipt_text(&self) -> String {
        self.receipt.render()
    }
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The checkout orchestrator.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    pub(crate) fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Completes the register's in-progress sale.
    ///
    /// All-or-nothing: sale, sale items, every stock decrement, the
    /// register settlement and the cart clear commit together or not at
    /// all.
    ///
    /// ## Errors
    /// - `EmptyCart` when the register has no ACTIVE lines
    /// - `NotFound` when the register session does not exist
    /// - `SessionClosed` when the session is not OPEN
    /// - `InsufficientStock` when any line exceeds the store's stock
    pub async fn complete_sale(
        &self,
        register_id: &str,
        input: SaleInput,
        actor: &str,
    ) -> PosResult<CompletedSale> {
        validate_id("register_id", register_id)?;
        validate_id("actor", actor)?;
        validate_amount_cents("subtotal", input.subtotal.cents())?;
        validate_amount_cents("tax", input.tax.cents())?;
        validate_amount_cents("discount", input.discount.cents())?;
        validate_amount_cents("total", input.total.cents())?;
        validate_amount_cents("paid", input.paid.cents())?;

        debug!(register_id = %register_id, total = %input.total, "complete_sale");

        let mut tx = self.db.begin().await?;

        // 1. The cart must have something to sell.
        let lines = cart::active_lines(&mut tx, register_id).await?;
        if lines.is_empty() {
            return Err(PosError::EmptyCart {
                register_id: register_id.to_string(),
            });
        }

        // 2. The session must exist and be OPEN. A closed drawer cannot
        //    absorb a settlement.
        let session = register::get(&mut tx, register_id)
            .await?
            .ok_or_else(|| PosError::not_found("Register session", register_id))?;
        if !session.is_open() {
            return Err(PosError::SessionClosed {
                session_id: session.id.clone(),
            });
        }

        // 3. Cost basis (profit reporting) and unit count from the lines.
        let cost: Money = lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.cost_basis());
        let item_count: i64 = lines.iter().map(|line| line.quantity).sum();

        // 4. The sale record.
        let now = Utc::now();
        let sale_record = Sale {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            client_id: input.client_id.clone(),
            cost_cents: cost.cents(),
            subtotal_cents: input.subtotal.cents(),
            tax_cents: input.tax.cents(),
            discount_cents: input.discount.cents(),
            total_cents: input.total.cents(),
            paid_cents: input.paid.cents(),
            payment_method: input.payment_method,
            item_count,
            status: SaleStatus::for_payment(input.paid, input.total),
            created_by: actor.to_string(),
            created_at: now,
        };

        sale::insert_sale(&mut tx, &sale_record).await?;

        // 5. Item snapshots and stock decrements at the session's store.
        let store = Location::Store(session.store_id.clone());
        for line in &lines {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_record.id.clone(),
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                subtotal_cents: line.subtotal().cents(),
                created_at: now,
            };
            sale::insert_item(&mut tx, &item).await?;

            if !stock::try_reduce(&mut tx, &store, &line.product_id, line.quantity).await? {
                let available = stock::available(&mut tx, &store, &line.product_id).await?;
                // Returning drops `tx`, rolling back the sale, its items
                // and every decrement already applied in this call.
                return Err(PosError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }

        // 6. Settle the drawer, 7. consume the cart.
        register::add_settlement(&mut tx, &session.id, input.payment_method, input.total.cents())
            .await?;
        cart::delete_active_lines(&mut tx, register_id).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_record.id,
            register_id = %register_id,
            total = %input.total,
            items = lines.len(),
            status = ?sale_record.status,
            "Sale completed"
        );

        // 8. Receipt, rendered from the committed snapshots.
        let receipt = Receipt::for_sale(&sale_record, &lines);
        Ok(CompletedSale {
            sale: sale_record,
            receipt,
        })
    }

    /// Looks up a recorded sale with its item snapshots.
    pub async fn sale_with_items(&self, sale_id: &str) -> PosResult<(Sale, Vec<SaleItem>)> {
        let mut conn = self.db.acquire().await?;

        let sale_record = sale::get_by_id(&mut conn, sale_id)
            .await?
            .ok_or_else(|| PosError::not_found("Sale", sale_id))?;
        let items = sale::items(&mut conn, sale_id).await?;

        Ok((sale_record, items))
    }

    /// Sales recorded against one register session, newest first.
    pub async fn sales_for_register(&self, register_id: &str) -> PosResult<Vec<Sale>> {
        let mut conn = self.db.acquire().await?;
        Ok(sale::list_for_register(&mut conn, register_id).await?)
    }
}
