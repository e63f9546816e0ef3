//! # minimart-db: Database Layer for Minimart POS
//!
//! This crate provides database access for the Minimart POS back office.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Minimart POS Data Flow                          │
//! │                                                                     │
//! │  Engine service (e.g. CheckoutService::complete_sale)               │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                   minimart-db (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │   ┌────────────┐   ┌────────────────┐   ┌──────────────┐     │ │
//! │  │   │  Database  │   │  repositories  │   │  Migrations  │     │ │
//! │  │   │  (pool.rs) │   │ cart / stock / │   │  (embedded)  │     │ │
//! │  │   │            │   │ register / ... │   │              │     │ │
//! │  │   │ SqlitePool │◄──│ fns taking a   │   │ 001_init.sql │     │ │
//! │  │   │ begin()    │   │ &mut conn      │   │              │     │ │
//! │  │   └────────────┘   └────────────────┘   └──────────────┘     │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys on)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Unit-of-Work Boundary
//!
//! Repository functions take `&mut SqliteConnection` instead of holding a
//! pool. The engine decides the atomicity boundary: it either acquires a
//! plain connection (single reads) or begins a transaction and threads it
//! through every repository call of a multi-step workflow. Either all of
//! a workflow's writes commit, or none do.
//!
//! ```rust,ignore
//! let mut tx = db.begin().await?;
//! let lines = repository::cart::active_lines(&mut tx, register_id).await?;
//! repository::sale::insert_sale(&mut tx, &sale).await?;
//! repository::cart::delete_active_lines(&mut tx, register_id).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
