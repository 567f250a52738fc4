//! Repository for the `brands` table.
//!
//! Brands are soft-deleted; every read here excludes rows with `deleted_at` set.

use mailspark_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::brand::{Brand, CreateBrand, UpdateBrand};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, brand_name, brand_url, logos, fonts, colors, \
                       deleted_at, created_at, updated_at";

/// Provides CRUD operations for brands.
pub struct BrandRepo;

impl BrandRepo {
    /// Insert a new brand owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateBrand,
    ) -> Result<Brand, sqlx::Error> {
        let query = format!(
            "INSERT INTO brands (user_id, brand_name, brand_url, logos, fonts, colors)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(user_id)
            .bind(&input.brand_name)
            .bind(&input.brand_url)
            .bind(&input.logos)
            .bind(Json(&input.fonts))
            .bind(Json(&input.colors))
            .fetch_one(pool)
            .await
    }

    /// Find a brand by id. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's brands, newest first. Excludes soft-deleted rows.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Brand>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM brands
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Number of brands the user currently has (soft-deleted excluded).
    pub async fn count_active_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM brands WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Update a brand. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBrand,
    ) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!(
            "UPDATE brands SET
                brand_name = COALESCE($2, brand_name),
                brand_url = COALESCE($3, brand_url),
                logos = COALESCE($4, logos),
                fonts = COALESCE($5, fonts),
                colors = COALESCE($6, colors)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .bind(&input.brand_name)
            .bind(&input.brand_url)
            .bind(&input.logos)
            .bind(input.fonts.as_ref().map(Json))
            .bind(input.colors.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Append a logo URL to the brand's list.
    pub async fn add_logo(
        pool: &PgPool,
        id: DbId,
        url: &str,
    ) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!(
            "UPDATE brands SET logos = array_append(logos, $2)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a brand. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE brands SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
