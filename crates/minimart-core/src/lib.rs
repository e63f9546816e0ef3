//! # minimart-core: Pure Business Logic for Minimart POS
//!
//! This crate is the heart of the Minimart POS back office. It contains the
//! domain types and business rules of the checkout workflow as pure code
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Minimart POS Data Flow                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                 minimart-engine (workflows)                   │ │
//! │  │   CartService ─► HoldService ─► CheckoutService ─► Receipt    │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │               ★ minimart-core (THIS CRATE) ★                  │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐          │ │
//! │  │   │  types  │ │  money  │ │ receipt │ │ validation│          │ │
//! │  │   │CartLine │ │  Money  │ │ Receipt │ │   rules   │          │ │
//! │  │   │  Sale   │ │ (cents) │ │ render  │ │  checks   │          │ │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └───────────┘          │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                  minimart-db (SQLite layer)                   │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CartLine, Sale, RegisterSession, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Validation error types
//! - [`receipt`] - Plain-text receipt rendering
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use minimart_core::Money` instead of
// `use minimart_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use receipt::Receipt;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
