//! Cart models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cart line joined with live product info, as returned by the API
///
/// `price` is the unit price snapshot taken when the product was first
/// added; later quantity increments keep the original snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItemView {
    pub product_id: Uuid,
    pub product_name: String,
    pub images: Vec<String>,
    pub quantity: i32,
    /// Snapshot unit price, not the live product price
    pub price: Decimal,
    pub is_active: bool,
}

impl CartItemView {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Full cart projection returned by `GET /api/cart`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Decimal,
}

impl CartView {
    /// Build the projection; total is the sum of snapshot line totals
    pub fn new(items: Vec<CartItemView>) -> Self {
        let total = items.iter().map(CartItemView::line_total).sum();
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}
