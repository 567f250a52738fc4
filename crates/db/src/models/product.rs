//! Product entity model and DTOs.

use mailspark_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub brand_id: DbId,
    pub product_name: String,
    pub description: Option<String>,
    /// Display price as entered, e.g. `"$24.00"`.
    pub price: Option<String>,
    pub images: Vec<String>,
    pub product_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub product_name: String,
    pub description: Option<String>,
    pub price: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub product_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub images: Option<Vec<String>>,
    pub product_url: Option<String>,
}
