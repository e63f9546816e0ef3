//! # Seed Data Generator
//!
//! Populates the database with a small product catalog and opening stock
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p minimart-db --bin seed
//!
//! # Specify database path and store
//! cargo run -p minimart-db --bin seed -- --db ./data/minimart.db --store store-1
//! ```

use chrono::Utc;
use std::env;
use tracing::info;
use uuid::Uuid;

use minimart_core::{Location, Product};
use minimart_db::{repository, Database, DbConfig};

/// (sku, name, cost cents, price cents, opening stock)
const CATALOG: &[(&str, &str, i64, i64, i64)] = &[
    ("BEV-001", "Coca-Cola 330ml", 150, 299, 48),
    ("BEV-002", "Mineral Water 600ml", 50, 149, 96),
    ("BEV-003", "Orange Juice 1L", 220, 449, 24),
    ("SNK-001", "Potato Chips Classic", 120, 249, 36),
    ("SNK-002", "Chocolate Bar", 90, 199, 60),
    ("SNK-003", "Instant Noodles", 80, 179, 72),
    ("GRC-001", "White Rice 1kg", 400, 699, 30),
    ("GRC-002", "Cooking Oil 1L", 650, 999, 20),
    ("GRC-003", "Granulated Sugar 1kg", 350, 599, 25),
    ("DRY-001", "Laundry Detergent 800g", 500, 899, 18),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let db_path = arg_value(&args, "--db").unwrap_or_else(|| "./minimart.db".to_string());
    let store_id = arg_value(&args, "--store").unwrap_or_else(|| "store-1".to_string());

    info!(db_path = %db_path, store_id = %store_id, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let location = Location::Store(store_id.clone());
    let now = Utc::now();

    let mut tx = db.begin().await?;
    for (sku, name, cost_cents, price_cents, stock) in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            cost_cents: *cost_cents,
            price_cents: *price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        repository::product::insert(&mut tx, &product).await?;
        repository::stock::upsert_set(
            &mut tx,
            &location,
            &product.id,
            *stock,
            Some(*price_cents),
        )
        .await?;
    }
    tx.commit().await?;

    info!(products = CATALOG.len(), "Seed complete");
    db.close().await;

    Ok(())
}

/// Returns the value following a `--flag` argument, if present.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
