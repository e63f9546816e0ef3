//! # Workflow Error Types
//!
//! The error taxonomy surfaced to callers of the engine.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Validation / EmptyCart / CartFull  - bad input, rejected early     │
//! │  NotFound                           - missing product/line/session  │
//! │  RegisterAlreadyOpen                - second open() for a store     │
//! │  SessionClosed                      - mutating a CLOSED session     │
//! │  InsufficientStock                  - decrement would go negative   │
//! │  Db                                 - storage failure (wrapped)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries the offending identifiers; nothing is silently
//! swallowed. All errors are terminal per request — there are no
//! automatic retries, the caller corrects and resubmits.

use thiserror::Error;

use minimart_core::{ValidationError, MAX_CART_LINES};
use minimart_db::DbError;

/// Errors produced by the checkout workflow engine.
#[derive(Debug, Error)]
pub enum PosError {
    /// Input validation failure (non-positive quantity, negative amount).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The register's active cart has no lines.
    ///
    /// Raised by `hold` and `complete_sale`, which are meaningless on an
    /// empty cart.
    #[error("cart is empty for register {register_id}")]
    EmptyCart { register_id: String },

    /// The cart has reached [`MAX_CART_LINES`] distinct lines.
    #[error("cart cannot have more than {max} lines")]
    CartFull { max: usize },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An OPEN register session already exists for the store.
    #[error("a register is already open for store {store_id}")]
    RegisterAlreadyOpen { store_id: String },

    /// The register session is CLOSED and can no longer be mutated.
    #[error("register session {session_id} is closed")]
    SessionClosed { session_id: String },

    /// A stock decrement would leave the quantity negative.
    ///
    /// During checkout this aborts the entire sale; no partial state is
    /// committed.
    #[error(
        "insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Convert raw sqlx errors (e.g. from `tx.commit()`) through the database
/// taxonomy: `sqlx::Error → DbError → PosError::Db`.
impl From<sqlx::Error> for PosError {
    fn from(err: sqlx::Error) -> Self {
        PosError::Db(DbError::from(err))
    }
}

impl PosError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PosError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a CartFull error at the configured limit.
    pub fn cart_full() -> Self {
        PosError::CartFull {
            max: MAX_CART_LINES,
        }
    }
}

/// Result type for workflow operations.
pub type PosResult<T> = Result<T, PosError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_identifiers() {
        let err = PosError::InsufficientStock {
            product_id: "prod-9".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product prod-9: available 3, requested 5"
        );

        let err = PosError::RegisterAlreadyOpen {
            store_id: "store-1".to_string(),
        };
        assert_eq!(err.to_string(), "a register is already open for store store-1");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: PosError = ValidationError::MustBePositive { field: "quantity" }.into();
        assert!(matches!(err, PosError::Validation(_)));
    }
}
