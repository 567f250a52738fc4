//! Brand entity model and DTOs.

use mailspark_core::style::{BrandColors, BrandFonts};
use mailspark_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `brands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Brand {
    pub id: DbId,
    pub user_id: DbId,
    pub brand_name: String,
    pub brand_url: Option<String>,
    /// Logo URLs; the first one is used in generated emails.
    pub logos: Vec<String>,
    pub fonts: Json<BrandFonts>,
    pub colors: Json<BrandColors>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a brand. The owner comes from the authenticated user.
#[derive(Debug, Deserialize)]
pub struct CreateBrand {
    pub brand_name: String,
    pub brand_url: Option<String>,
    #[serde(default)]
    pub logos: Vec<String>,
    #[serde(default)]
    pub fonts: BrandFonts,
    #[serde(default)]
    pub colors: BrandColors,
}

/// DTO for updating a brand. `logos`, when present, replaces the whole list.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBrand {
    pub brand_name: Option<String>,
    pub brand_url: Option<String>,
    pub logos: Option<Vec<String>>,
    pub fonts: Option<BrandFonts>,
    pub colors: Option<BrandColors>,
}
