//! # Repository Module
//!
//! Database repository functions for Minimart POS.
//!
//! ## Repository Pattern, Explicit Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Engine service                                                     │
//! │       │                                                             │
//! │       │  let mut tx = db.begin().await?;          ← atomicity       │
//! │       │  cart::active_lines(&mut tx, reg).await?    boundary is     │
//! │       │  sale::insert_sale(&mut tx, &sale).await?   visible here    │
//! │       │  tx.commit().await?;                                        │
//! │       ▼                                                             │
//! │  Repository functions (this module)                                 │
//! │       │  SQL isolated in one place per entity                       │
//! │       ▼                                                             │
//! │  SQLite database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function takes a `&mut SqliteConnection`, which works both with
//! a plain pooled connection (`&mut *db.acquire().await?`) and with a
//! transaction (`&mut *tx`). The caller owns commit/rollback.
//!
//! ## Available Repositories
//!
//! - [`product`] - Catalog lookups and inserts
//! - [`cart`] - Cart line CRUD, hold/activate state flips, aggregates
//! - [`hold`] - Hold slot bookkeeping
//! - [`stock`] - Quantity-on-hand upserts and the conditional decrement
//! - [`register`] - Register session lifecycle and settlement totals
//! - [`sale`] - Sale and sale item inserts and lookups

pub mod cart;
pub mod hold;
pub mod product;
pub mod register;
pub mod sale;
pub mod stock;
