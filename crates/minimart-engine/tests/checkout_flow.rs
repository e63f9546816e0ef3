//! End-to-end checkout workflow tests against an in-memory database.
//!
//! These exercise the full open-register → cart → complete-sale path,
//! including the all-or-nothing rollback semantics of sale completion.

use chrono::Utc;
use uuid::Uuid;

use minimart_core::{Location, Money, PaymentMethod, Product, SaleStatus};
use minimart_db::{repository, Database, DbConfig};
use minimart_engine::{Pos, PosError, SaleInput};

async fn test_pos() -> Pos {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Pos::new(db)
}

async fn seed_product(pos: &Pos, name: &str, cost_cents: i64, price_cents: i64) -> String {
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: format!("SKU-{}", Uuid::new_v4()),
        name: name.to_string(),
        cost_cents,
        price_cents,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let mut conn = pos.database().acquire().await.unwrap();
    repository::product::insert(&mut conn, &product)
        .await
        .unwrap();
    product.id
}

fn cash_input(total_cents: i64, paid_cents: i64) -> SaleInput {
    SaleInput {
        client_id: None,
        subtotal: Money::from_cents(total_cents),
        tax: Money::zero(),
        discount: Money::zero(),
        total: Money::from_cents(total_cents),
        paid: Money::from_cents(paid_cents),
        payment_method: PaymentMethod::Cash,
    }
}

/// The register scenario from the back-office workflow:
/// open(store-1, cash $100) → add product A ($10) ×3 → complete(paid $30,
/// cash) → session.cash_total == $30, stock −3, cart empty, receipt has
/// the total and no Change line.
#[tokio::test]
async fn complete_sale_settles_register_and_stock() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let product_a = seed_product(&pos, "Product A", 500, 1000).await;
    pos.stock().increase(&store, &product_a, 10).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::from_cents(10_000))
        .await
        .unwrap();

    for _ in 0..3 {
        pos.cart().add_item(&session.id, &product_a).await.unwrap();
    }
    assert_eq!(pos.cart().subtotal(&session.id).await.unwrap().cents(), 3000);

    let completed = pos
        .checkout()
        .complete_sale(&session.id, cash_input(3000, 3000), "cashier-1")
        .await
        .unwrap();

    // Sale record
    assert_eq!(completed.sale.status, SaleStatus::Paid);
    assert_eq!(completed.sale.item_count, 3);
    assert_eq!(completed.sale.cost_cents, 1500);
    assert_eq!(completed.sale.created_by, "cashier-1");

    // Register settlement
    let session = pos.registers().get(&session.id).await.unwrap();
    assert_eq!(session.cash_total_cents, 3000);
    assert_eq!(session.cash_settled_cents, 3000);
    assert_eq!(session.card_total_cents, 0);

    // Stock decreased by 3
    assert_eq!(pos.stock().available(&store, &product_a).await.unwrap(), 7);

    // Cart is empty
    assert_eq!(pos.cart().item_count(&session.id).await.unwrap(), 0);

    // Receipt contains the total, no Change line for exact payment
    let text = completed.receipt_text();
    assert!(text.contains("30.00"));
    assert!(!text.contains("Change"));

    // Sale items were snapshotted
    let (_, items) = pos
        .checkout()
        .sale_with_items(&completed.sale.id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].subtotal_cents, 3000);
}

/// Any line exceeding available stock aborts the whole checkout: sale,
/// sale items, earlier stock decrements, settlement and cart all roll
/// back together.
#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let plentiful = seed_product(&pos, "Plentiful", 100, 200).await;
    let scarce = seed_product(&pos, "Scarce", 100, 300).await;
    pos.stock().increase(&store, &plentiful, 50).await.unwrap();
    pos.stock().increase(&store, &scarce, 1).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();

    // plentiful ×2 first so its decrement happens before the failure
    pos.cart().add_item(&session.id, &plentiful).await.unwrap();
    pos.cart().add_item(&session.id, &plentiful).await.unwrap();
    let scarce_line = pos.cart().add_item(&session.id, &scarce).await.unwrap();
    pos.cart().set_quantity(&scarce_line.id, 3).await.unwrap();

    let err = pos
        .checkout()
        .complete_sale(&session.id, cash_input(1300, 1300), "cashier-1")
        .await
        .unwrap_err();
    match err {
        PosError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, 1);
            assert_eq!(requested, 3);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Stock untouched — including the line processed before the failure
    assert_eq!(pos.stock().available(&store, &plentiful).await.unwrap(), 50);
    assert_eq!(pos.stock().available(&store, &scarce).await.unwrap(), 1);

    // No sale recorded
    assert!(pos
        .checkout()
        .sales_for_register(&session.id)
        .await
        .unwrap()
        .is_empty());

    // Register totals untouched
    let session = pos.registers().get(&session.id).await.unwrap();
    assert_eq!(session.cash_total_cents, 0);

    // Cart still intact, ready for the caller to correct and resubmit
    assert_eq!(pos.cart().item_count(&session.id).await.unwrap(), 5);
}

#[tokio::test]
async fn empty_cart_cannot_complete() {
    let pos = test_pos().await;

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();

    let err = pos
        .checkout()
        .complete_sale(&session.id, cash_input(0, 0), "cashier-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::EmptyCart { .. }));
}

#[tokio::test]
async fn closed_session_cannot_complete() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let product = seed_product(&pos, "Widget", 100, 200).await;
    pos.stock().increase(&store, &product, 5).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();
    pos.cart().add_item(&session.id, &product).await.unwrap();

    pos.registers()
        .close(&session.id, "manager-1", None)
        .await
        .unwrap();

    let err = pos
        .checkout()
        .complete_sale(&session.id, cash_input(200, 200), "cashier-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::SessionClosed { .. }));

    // nothing moved
    assert_eq!(pos.stock().available(&store, &product).await.unwrap(), 5);
    assert_eq!(pos.cart().item_count(&session.id).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_register_is_not_found() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let product = seed_product(&pos, "Widget", 100, 200).await;
    pos.stock().increase(&store, &product, 5).await.unwrap();

    // cart lines can exist for a register id that has no session yet
    pos.cart().add_item("ghost-register", &product).await.unwrap();

    let err = pos
        .checkout()
        .complete_sale("ghost-register", cash_input(200, 200), "cashier-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PosError::NotFound {
            entity: "Register session",
            ..
        }
    ));
}

#[tokio::test]
async fn overpayment_is_paid_with_change_on_receipt() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let product = seed_product(&pos, "Widget", 100, 250).await;
    pos.stock().increase(&store, &product, 5).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();
    pos.cart().add_item(&session.id, &product).await.unwrap();

    let completed = pos
        .checkout()
        .complete_sale(&session.id, cash_input(250, 500), "cashier-1")
        .await
        .unwrap();

    assert_eq!(completed.sale.status, SaleStatus::Paid);
    assert_eq!(completed.sale.change().cents(), 250);
    assert!(completed.receipt_text().contains("Change: $2.50"));

    // the register settles the sale total, not the tendered amount
    let session = pos.registers().get(&session.id).await.unwrap();
    assert_eq!(session.cash_total_cents, 250);
}

#[tokio::test]
async fn underpayment_records_partial_sale() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let product = seed_product(&pos, "Widget", 100, 1000).await;
    pos.stock().increase(&store, &product, 5).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();
    pos.cart().add_item(&session.id, &product).await.unwrap();

    let completed = pos
        .checkout()
        .complete_sale(&session.id, cash_input(1000, 400), "cashier-1")
        .await
        .unwrap();

    assert_eq!(completed.sale.status, SaleStatus::Partial);
    assert_eq!(completed.sale.change().cents(), 0);
    assert!(!completed.receipt_text().contains("Change"));
}

/// Held carts survive a checkout of the active cart; selecting the hold
/// afterwards restores exactly the held lines.
#[tokio::test]
async fn holds_are_untouched_by_checkout() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let first = seed_product(&pos, "First Customer Item", 100, 400).await;
    let second = seed_product(&pos, "Second Customer Item", 100, 600).await;
    pos.stock().increase(&store, &first, 10).await.unwrap();
    pos.stock().increase(&store, &second, 10).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();

    // first customer's cart gets parked
    pos.cart().add_item(&session.id, &first).await.unwrap();
    let slot = pos.holds().hold(&session.id).await.unwrap();

    // second customer is rung up and checked out
    pos.cart().add_item(&session.id, &second).await.unwrap();
    pos.checkout()
        .complete_sale(&session.id, cash_input(600, 600), "cashier-1")
        .await
        .unwrap();

    // only the second customer's stock moved
    assert_eq!(pos.stock().available(&store, &first).await.unwrap(), 10);
    assert_eq!(pos.stock().available(&store, &second).await.unwrap(), 9);

    // the parked cart comes back intact
    let restored = pos
        .holds()
        .select(&session.id, slot.slot_number)
        .await
        .unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].product_id, first);
}

#[tokio::test]
async fn tax_and_discount_pass_through_to_sale_and_receipt() {
    let pos = test_pos().await;
    let store = Location::Store("store-1".to_string());

    let product = seed_product(&pos, "Widget", 100, 1000).await;
    pos.stock().increase(&store, &product, 5).await.unwrap();

    let session = pos
        .registers()
        .open("cashier-1", "store-1", Money::zero())
        .await
        .unwrap();
    pos.cart().add_item(&session.id, &product).await.unwrap();

    let input = SaleInput {
        client_id: Some("client-7".to_string()),
        subtotal: Money::from_cents(1000),
        tax: Money::from_cents(83),
        discount: Money::from_cents(100),
        total: Money::from_cents(983),
        paid: Money::from_cents(983),
        payment_method: PaymentMethod::Card,
    };

    let completed = pos
        .checkout()
        .complete_sale(&session.id, input, "cashier-1")
        .await
        .unwrap();

    assert_eq!(completed.sale.tax_cents, 83);
    assert_eq!(completed.sale.discount_cents, 100);
    assert_eq!(completed.sale.client_id.as_deref(), Some("client-7"));

    let text = completed.receipt_text();
    assert!(text.contains("Tax: $0.83"));
    assert!(text.contains("Discount: $1.00"));
    assert!(text.contains("TOTAL: $9.83"));

    let session = pos.registers().get(&session.id).await.unwrap();
    assert_eq!(session.card_total_cents, 983);
    assert_eq!(session.cash_total_cents, 0);
}
