//! Product model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity (database row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit price, NUMERIC(12,2)
    pub price: Decimal,
    pub stock: i32,
    /// Stored image paths (relative URLs)
    pub images: Vec<String>,
    /// Soft-delete flag; inactive products are hidden from non-admin listings
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Update product payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
