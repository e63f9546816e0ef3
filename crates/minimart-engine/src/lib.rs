//! # minimart-engine: Checkout Workflow Engine
//!
//! Coordinates the point-of-sale transaction workflow across four
//! collaborating entities — cart, holds, stock, register sessions —
//! through a small per-register state machine.
//!
//! ## Component Dependency Order (leaves first)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   StockService        per (product, location) quantity ledger       │
//! │   CartService         a register's unconfirmed line items           │
//! │   HoldService         park / restore a cart under a slot number     │
//! │   RegisterService     open / settle / close a cash drawer session   │
//! │        │                                                            │
//! │        ▼                                                            │
//! │   CheckoutService     cart → sale conversion, stock decrement,      │
//! │                       settlement update, receipt text               │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Each multi-step operation (`hold`, `select`, `complete_sale`) runs in
//! one database transaction. A stock insufficiency mid-checkout rolls
//! back the sale, its items, every prior stock decrement of that call,
//! and leaves the cart untouched.
//!
//! ## Authorization
//! Callers are authenticated and authorized by an external collaborator.
//! Operations take the acting user as a plain identifier (`actor`) and
//! record it (`created_by`, `closed_by`); no role checks happen here.
//!
//! ## Usage
//! ```rust,ignore
//! use minimart_db::{Database, DbConfig};
//! use minimart_engine::Pos;
//!
//! let db = Database::new(DbConfig::new("./minimart.db")).await?;
//! let pos = Pos::new(db);
//!
//! let session = pos.registers().open("user-1", "store-1", Money::from_cents(10_000)).await?;
//! pos.cart().add_item(&session.id, &product_id).await?;
//! let checkout = pos.checkout().complete_sale(&session.id, input, "user-1").await?;
//! println!("{}", checkout.receipt);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod hold;
pub mod register;
pub mod stock;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::CartService;
pub use checkout::{CheckoutService, CompletedSale, SaleInput};
pub use error::{PosError, PosResult};
pub use hold::HoldService;
pub use register::RegisterService;
pub use stock::StockService;

use minimart_db::Database;

// =============================================================================
// Facade
// =============================================================================

/// Entry point to the checkout workflow engine.
///
/// Cheap to clone and hand out; every accessor returns a service bound to
/// the same connection pool.
#[derive(Debug, Clone)]
pub struct Pos {
    db: Database,
}

impl Pos {
    /// Creates the engine on top of an initialized database.
    pub fn new(db: Database) -> Self {
        Pos { db }
    }

    /// Cart operations: add/edit/remove lines, subtotal, reset.
    pub fn cart(&self) -> CartService {
        CartService::new(self.db.clone())
    }

    /// Hold operations: park, restore, list, remove.
    pub fn holds(&self) -> HoldService {
        HoldService::new(self.db.clone())
    }

    /// Stock ledger operations: receive, correct, query, reduce.
    pub fn stock(&self) -> StockService {
        StockService::new(self.db.clone())
    }

    /// Register session lifecycle: open, settle, close, balance.
    pub fn registers(&self) -> RegisterService {
        RegisterService::new(self.db.clone())
    }

    /// Sale completion: the checkout orchestrator.
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.db.clone())
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}
