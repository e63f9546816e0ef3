//! # Stock Service
//!
//! The per-(product, location) quantity ledger.
//!
//! Quantity never goes negative after a committed operation: `reduce` is
//! the single point where overselling is prevented, via the conditional
//! decrement in the stock repository. Absence of a record is a valid
//! zero-stock state, not an error.

use tracing::{debug, info};

use minimart_core::validation::validate_stock_quantity;
use minimart_core::{Location, Money, StockRecord, ValidationError};
use minimart_db::repository::stock;
use minimart_db::Database;

use crate::error::{PosError, PosResult};

/// Stock ledger operations.
#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    pub(crate) fn new(db: Database) -> Self {
        StockService { db }
    }

    /// Atomically decrements quantity on hand.
    ///
    /// ## Errors
    /// `InsufficientStock` when the current quantity (0 for a missing
    /// record) is below the requested amount; nothing is written.
    pub async fn reduce(
        &self,
        location: &Location,
        product_id: &str,
        quantity: i64,
    ) -> PosResult<()> {
        validate_stock_quantity(quantity)?;

        let mut conn = self.db.acquire().await?;

        if !stock::try_reduce(&mut conn, location, product_id, quantity).await? {
            let available = stock::available(&mut conn, location, product_id).await?;
            return Err(PosError::InsufficientStock {
                product_id: product_id.to_string(),
                available,
                requested: quantity,
            });
        }

        debug!(product_id = %product_id, location = %location.id(), quantity, "Stock reduced");
        Ok(())
    }

    /// Adds quantity, creating the record (from 0) when absent.
    pub async fn increase(
        &self,
        location: &Location,
        product_id: &str,
        quantity: i64,
    ) -> PosResult<()> {
        validate_stock_quantity(quantity)?;

        let mut conn = self.db.acquire().await?;
        stock::upsert_increase(&mut conn, location, product_id, quantity).await?;

        info!(product_id = %product_id, location = %location.id(), quantity, "Stock received");
        Ok(())
    }

    /// Absolute overwrite of quantity (stock-take correction), optionally
    /// updating the per-location price.
    pub async fn set_quantity(
        &self,
        location: &Location,
        product_id: &str,
        quantity: i64,
        price: Option<Money>,
    ) -> PosResult<()> {
        if quantity < 0 {
            return Err(ValidationError::NotNegative { field: "quantity" }.into());
        }

        let mut conn = self.db.acquire().await?;
        stock::upsert_set(
            &mut conn,
            location,
            product_id,
            quantity,
            price.map(|p| p.cents()),
        )
        .await?;

        info!(product_id = %product_id, location = %location.id(), quantity, "Stock quantity set");
        Ok(())
    }

    /// Quantity on hand; 0 when no record exists.
    pub async fn available(&self, location: &Location, product_id: &str) -> PosResult<i64> {
        let mut conn = self.db.acquire().await?;
        Ok(stock::available(&mut conn, location, product_id).await?)
    }

    /// All stock records for a product across locations.
    pub async fn by_product(&self, product_id: &str) -> PosResult<Vec<StockRecord>> {
        let mut conn = self.db.acquire().await?;
        Ok(stock::by_product(&mut conn, product_id).await?)
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

    fn store() -> Location {
        Location::Store("store-1".to_string())
    }

    #[tokio::test]
    async fn test_available_is_zero_without_record() {
        let pos = test_pos().await;

        let qty = pos.stock().available(&store(), "prod-1").await.unwrap();
        assert_eq!(qty, 0);
    }

    #[tokio::test]
    async fn test_increase_creates_then_accumulates() {
        let pos = test_pos().await;

        pos.stock().increase(&store(), "prod-1", 10).await.unwrap();
        pos.stock().increase(&store(), "prod-1", 5).await.unwrap();

        assert_eq!(pos.stock().available(&store(), "prod-1").await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_set_quantity_overwrites() {
        let pos = test_pos().await;

        pos.stock().increase(&store(), "prod-1", 10).await.unwrap();
        pos.stock()
            .set_quantity(&store(), "prod-1", 3, Some(Money::from_cents(999)))
            .await
            .unwrap();

        assert_eq!(pos.stock().available(&store(), "prod-1").await.unwrap(), 3);

        let records = pos.stock().by_product("prod-1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price_cents, Some(999));
    }

    #[tokio::test]
    async fn test_reduce_never_goes_negative() {
        let pos = test_pos().await;

        pos.stock().increase(&store(), "prod-1", 3).await.unwrap();

        let err = pos
            .stock()
            .reduce(&store(), "prod-1", 5)
            .await
            .unwrap_err();
        match err {
            PosError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // quantity unchanged after the failed reduce
        assert_eq!(pos.stock().available(&store(), "prod-1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_reduce_missing_record_reports_zero_available() {
        let pos = test_pos().await;

        let err = pos
            .stock()
            .reduce(&store(), "prod-1", 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PosError::InsufficientStock { available: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_reduce_to_exactly_zero_is_allowed() {
        let pos = test_pos().await;

        pos.stock().increase(&store(), "prod-1", 4).await.unwrap();
        pos.stock().reduce(&store(), "prod-1", 4).await.unwrap();

        assert_eq!(pos.stock().available(&store(), "prod-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_locations_are_independent() {
        let pos = test_pos().await;
        let warehouse = Location::Warehouse("wh-1".to_string());

        pos.stock().increase(&store(), "prod-1", 10).await.unwrap();
        pos.stock().increase(&warehouse, "prod-1", 7).await.unwrap();

        pos.stock().reduce(&store(), "prod-1", 10).await.unwrap();

        assert_eq!(pos.stock().available(&store(), "prod-1").await.unwrap(), 0);
        assert_eq!(
            pos.stock().available(&warehouse, "prod-1").await.unwrap(),
            7
        );
    }
}
