//! # Domain Types
//!
//! Core domain types used throughout Minimart POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐        │
//! │  │   CartLine     │  │ RegisterSession│  │     Sale       │        │
//! │  │  ────────────  │  │  ────────────  │  │  ────────────  │        │
//! │  │  register_id   │  │  store_id      │  │  register_id   │        │
//! │  │  product_id    │  │  opening_cash  │  │  total_cents   │        │
//! │  │  quantity      │  │  cash/card/chq │  │  paid_cents    │        │
//! │  │  state         │  │  status        │  │  status        │        │
//! │  └────────────────┘  └────────────────┘  └────────────────┘        │
//! │                                                                     │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐        │
//! │  │   HoldSlot     │  │  StockRecord   │  │   SaleItem     │        │
//! │  │  slot_number   │  │  location      │  │  sale_id (FK)  │        │
//! │  │  per register  │  │  quantity ≥ 0  │  │  snapshot data │        │
//! │  └────────────────┘  └────────────────┘  └────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Cart lines and sale items copy the product's name/cost/price at the
//! moment they are created. Later catalog changes never retroactively
//! alter an open cart or a recorded sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Line State
// =============================================================================

/// The state of a cart line.
///
/// ACTIVE lines form the register's working cart; HELD lines are parked
/// under a hold slot and excluded from subtotal/item-count queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    /// Part of the register's current working cart.
    Active,
    /// Parked under a hold slot.
    Held,
}

impl Default for LineState {
    fn default() -> Self {
        LineState::Active
    }
}

// =============================================================================
// Register Status
// =============================================================================

/// The lifecycle status of a register session.
///
/// CLOSED is terminal: a closed session never transitions again and its
/// settlement totals become immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    /// Cash drawer is open and accepting settlements.
    Open,
    /// Cash drawer has been counted and closed.
    Closed,
}

// =============================================================================
// Sale Status
// =============================================================================

/// Payment completeness of a recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Paid in full (paid ≥ total).
    Paid,
    /// Partially paid (paid < total).
    Partial,
}

impl SaleStatus {
    /// Derives the status from the amounts at sale-completion time.
    pub fn for_payment(paid: Money, total: Money) -> Self {
        if paid >= total {
            SaleStatus::Paid
        } else {
            SaleStatus::Partial
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was tendered. Each method accumulates into its own pair of
/// register-session settlement totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Cheque,
}

// =============================================================================
// Stock Location
// =============================================================================

/// The kind of location a stock record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Store,
    Warehouse,
}

/// A stock-keeping location: one store or one warehouse.
///
/// Checkout always reduces stock at the store of the register's session;
/// warehouse records exist for receiving and stock-take corrections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Location {
    Store(String),
    Warehouse(String),
}

impl Location {
    /// The location kind, for persistence.
    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Store(_) => LocationKind::Store,
            Location::Warehouse(_) => LocationKind::Warehouse,
        }
    }

    /// The location identifier.
    pub fn id(&self) -> &str {
        match self {
            Location::Store(id) | Location::Warehouse(id) => id,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Cost in cents (for profit reporting).
    pub cost_cents: i64,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in a register's in-progress sale.
///
/// Owned by exactly one register. Price and cost are frozen at add-time
/// (snapshot pattern); `slot_number` is 0 while the line is ACTIVE and set
/// to the hold slot while HELD.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: String,
    pub register_id: String,
    pub product_id: String,
    /// Product name at time of adding (frozen).
    pub name: String,
    /// Unit cost in cents at time of adding (frozen).
    pub unit_cost_cents: i64,
    /// Unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Hold slot number; 0 when the line is active.
    pub slot_number: i64,
    pub state: LineState,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// Line subtotal: unit price × quantity.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Line cost basis: unit cost × quantity.
    #[inline]
    pub fn cost_basis(&self) -> Money {
        self.unit_cost().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Hold Slot
// =============================================================================

/// A named, parked cart snapshot set aside to serve another transaction.
///
/// Slot numbers are per-register monotonic counters; gaps after deletion
/// are acceptable. A hold slot exists iff at least one HELD cart line
/// carries its slot number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HoldSlot {
    pub register_id: String,
    pub slot_number: i64,
    pub created_at: DateTime<Utc>,
}

impl HoldSlot {
    /// Human-readable time label for display in the hold list.
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

// =============================================================================
// Register Session
// =============================================================================

/// The open/close lifecycle of a cash drawer, accumulating settlement
/// totals by payment method.
///
/// At most one OPEN session exists per store at any time. Each completed
/// sale adds its total to both the lifetime total and the settled sub-total
/// of its payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RegisterSession {
    pub id: String,
    pub user_id: String,
    pub store_id: String,
    pub opening_cash_cents: i64,
    pub cash_total_cents: i64,
    pub cash_settled_cents: i64,
    pub card_total_cents: i64,
    pub card_settled_cents: i64,
    pub cheque_total_cents: i64,
    pub cheque_settled_cents: i64,
    pub status: RegisterStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub note: Option<String>,
}

impl RegisterSession {
    /// Whether the session is still accepting settlements.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }

    /// Informational drawer balance: opening cash plus all lifetime totals.
    pub fn balance(&self) -> Money {
        Money::from_cents(
            self.opening_cash_cents
                + self.cash_total_cents
                + self.card_total_cents
                + self.cheque_total_cents,
        )
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
///
/// Immutable once created; always created together with its SaleItems in
/// one atomic unit by the checkout workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub register_id: String,
    pub client_id: Option<String>,
    /// Total cost basis (Σ line cost × qty) for profit reporting.
    pub cost_cents: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub payment_method: PaymentMethod,
    /// Total units sold (Σ line quantity).
    pub item_count: i64,
    pub status: SaleStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the customer-facing total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the paid amount as Money.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// Change due: paid − total, clamped at zero.
    #[inline]
    pub fn change(&self) -> Money {
        self.paid().saturating_sub_zero(self.total())
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze cart line data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Line subtotal (unit_price × quantity).
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Stock Record
// =============================================================================

/// The quantity-on-hand for a product at one location.
///
/// Absence of a record is a valid zero-stock state, not an error.
/// Quantity never goes negative after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockRecord {
    pub location_type: LocationKind,
    pub location_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Per-location selling price override, when set.
    pub price_cents: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_status_for_payment() {
        let total = Money::from_cents(3000);

        assert_eq!(
            SaleStatus::for_payment(Money::from_cents(3000), total),
            SaleStatus::Paid
        );
        assert_eq!(
            SaleStatus::for_payment(Money::from_cents(5000), total),
            SaleStatus::Paid
        );
        assert_eq!(
            SaleStatus::for_payment(Money::from_cents(2999), total),
            SaleStatus::Partial
        );
    }

    #[test]
    fn test_location_accessors() {
        let store = Location::Store("store-1".to_string());
        assert_eq!(store.kind(), LocationKind::Store);
        assert_eq!(store.id(), "store-1");

        let warehouse = Location::Warehouse("wh-9".to_string());
        assert_eq!(warehouse.kind(), LocationKind::Warehouse);
        assert_eq!(warehouse.id(), "wh-9");
    }

    #[test]
    fn test_cart_line_subtotal() {
        let line = CartLine {
            id: "l1".to_string(),
            register_id: "r1".to_string(),
            product_id: "p1".to_string(),
            name: "Coca-Cola 330ml".to_string(),
            unit_cost_cents: 150,
            unit_price_cents: 299,
            quantity: 3,
            slot_number: 0,
            state: LineState::Active,
            created_at: Utc::now(),
        };

        assert_eq!(line.subtotal().cents(), 897);
        assert_eq!(line.cost_basis().cents(), 450);
    }

    #[test]
    fn test_session_balance() {
        let session = RegisterSession {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            store_id: "store-1".to_string(),
            opening_cash_cents: 10_000,
            cash_total_cents: 3_000,
            cash_settled_cents: 3_000,
            card_total_cents: 2_000,
            card_settled_cents: 2_000,
            cheque_total_cents: 500,
            cheque_settled_cents: 500,
            status: RegisterStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            closed_by: None,
            note: None,
        };

        assert_eq!(session.balance().cents(), 15_500);
        assert!(session.is_open());
    }

    #[test]
    fn test_sale_change() {
        let sale = Sale {
            id: "s1".to_string(),
            register_id: "r1".to_string(),
            client_id: None,
            cost_cents: 1500,
            subtotal_cents: 3000,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 3000,
            paid_cents: 5000,
            payment_method: PaymentMethod::Cash,
            item_count: 3,
            status: SaleStatus::Paid,
            created_by: "cashier".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(sale.change().cents(), 2000);
    }
}
