//! # Validation Module
//!
//! Input validation rules for Minimart POS workflows.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Engine services (this module)                             │
//! │  ├── Quantity bounds, non-negative amounts                          │
//! │  └── Rejected before any database write                             │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Database (SQLite)                                         │
//! │  ├── CHECK (quantity >= 0) on stock records                         │
//! │  ├── UNIQUE open-session-per-store index                            │
//! │  └── Foreign key constraints                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be at least 1 (removal is a separate operation, never qty 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// ## Example
/// ```rust
/// use minimart_core::validation::validate_line_quantity;
///
/// assert!(validate_line_quantity(5).is_ok());
/// assert!(validate_line_quantity(0).is_err());
/// assert!(validate_line_quantity(-3).is_err());
/// ```
pub fn validate_line_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock movement quantity (receive or reduce).
///
/// Zero-unit movements are rejected: they are always caller mistakes.
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a monetary amount that must not be negative
/// (opening cash, settlement amounts, caller-supplied totals).
pub fn validate_amount_cents(field: &'static str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::NotNegative { field });
    }
    Ok(())
}

/// Validates a non-empty identifier (register id, product id, user id).
pub fn validate_id(field: &'static str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_quantity_bounds() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(999).is_ok());

        assert_eq!(
            validate_line_quantity(0),
            Err(ValidationError::MustBePositive { field: "quantity" })
        );
        assert_eq!(
            validate_line_quantity(1000),
            Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: 999
            })
        );
    }

    #[test]
    fn test_stock_quantity() {
        assert!(validate_stock_quantity(10).is_ok());
        assert!(validate_stock_quantity(0).is_err());
        assert!(validate_stock_quantity(-5).is_err());
    }

    #[test]
    fn test_amount_cents() {
        assert!(validate_amount_cents("opening_cash", 0).is_ok());
        assert!(validate_amount_cents("opening_cash", 10_000).is_ok());
        assert_eq!(
            validate_amount_cents("opening_cash", -1),
            Err(ValidationError::NotNegative {
                field: "opening_cash"
            })
        );
    }

    #[test]
    fn test_id_required() {
        assert!(validate_id("register_id", "reg-1").is_ok());
        assert!(validate_id("register_id", "  ").is_err());
    }
}
