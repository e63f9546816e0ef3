//! # Receipt Rendering
//!
//! Plain-text receipt generation for completed sales.
//!
//! ## Layout
//! ```text
//! ===== RECEIPT =====
//! Sale ID: 7c0e...
//! Date: 2026-08-07 14:32
//! ==================
//!
//! Coca-Cola 330ml
//!   3 x $2.99 = $8.97
//!
//! ==================
//! Subtotal: $8.97
//! Tax: $0.74           (only when > 0)
//! Discount: $1.00      (only when > 0)
//! TOTAL: $8.71
//! Paid: $10.00
//! Change: $1.29        (only when > 0)
//! ==================
//!
//! Thank you for your purchase!
//! ```
//!
//! Rendering is pure: the receipt is built from the sale and its line
//! snapshots, so it can be re-rendered at any time from stored data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CartLine, Sale};

// =============================================================================
// Receipt
// =============================================================================

/// One rendered line on a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// A customer-facing receipt for a completed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub sale_id: String,
    /// Formatted `YYYY-MM-DD HH:MM` timestamp of the sale.
    pub date: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    /// Paid − total, clamped at zero; printed only when positive.
    pub change_cents: i64,
}

impl Receipt {
    /// Builds a receipt from a completed sale and the cart lines it
    /// consumed.
    pub fn for_sale(sale: &Sale, lines: &[CartLine]) -> Self {
        Receipt {
            sale_id: sale.id.clone(),
            date: sale.created_at.format("%Y-%m-%d %H:%M").to_string(),
            lines: lines
                .iter()
                .map(|line| ReceiptLine {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                    subtotal_cents: line.subtotal().cents(),
                })
                .collect(),
            subtotal_cents: sale.subtotal_cents,
            tax_cents: sale.tax_cents,
            discount_cents: sale.discount_cents,
            total_cents: sale.total_cents,
            paid_cents: sale.paid_cents,
            change_cents: sale.change().cents(),
        }
    }

    /// Renders the receipt as printable text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("===== RECEIPT =====\n");
        out.push_str(&format!("Sale ID: {}\n", self.sale_id));
        out.push_str(&format!("Date: {}\n", self.date));
        out.push_str("==================\n\n");

        for line in &self.lines {
            out.push_str(&format!("{}\n", line.name));
            out.push_str(&format!(
                "  {} x {} = {}\n",
                line.quantity,
                Money::from_cents(line.unit_price_cents),
                Money::from_cents(line.subtotal_cents)
            ));
        }

        out.push_str("\n==================\n");
        out.push_str(&format!(
            "Subtotal: {}\n",
            Money::from_cents(self.subtotal_cents)
        ));
        if self.tax_cents > 0 {
            out.push_str(&format!("Tax: {}\n", Money::from_cents(self.tax_cents)));
        }
        if self.discount_cents > 0 {
            out.push_str(&format!(
                "Discount: {}\n",
                Money::from_cents(self.discount_cents)
            ));
        }
        out.push_str(&format!("TOTAL: {}\n", Money::from_cents(self.total_cents)));
        out.push_str(&format!("Paid: {}\n", Money::from_cents(self.paid_cents)));
        if self.change_cents > 0 {
            out.push_str(&format!(
                "Change: {}\n",
                Money::from_cents(self.change_cents)
            ));
        }
        out.push_str("==================\n");
        out.push_str("\nThank you for your purchase!\n");

        out
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
