//! Repository for the `products` table.

use mailspark_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{CreateProduct, Product, UpdateProduct};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, brand_id, product_name, description, price, images, \
                       product_url, created_at, updated_at";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product under `brand_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        brand_id: DbId,
        input: &CreateProduct,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (brand_id, product_name, description, price, images, product_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(brand_id)
            .bind(&input.product_name)
            .bind(&input.description)
            .bind(&input.price)
            .bind(&input.images)
            .bind(&input.product_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List products of a brand, oldest first.
    pub async fn list_by_brand(pool: &PgPool, brand_id: DbId) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products WHERE brand_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(brand_id)
            .fetch_all(pool)
            .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                product_name = COALESCE($2, product_name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                images = COALESCE($5, images),
                product_url = COALESCE($6, product_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.product_name)
            .bind(&input.description)
            .bind(&input.price)
            .bind(&input.images)
            .bind(&input.product_url)
            .fetch_optional(pool)
            .await
    }

    /// Append an image URL to the product's list.
    pub async fn add_image(
        pool: &PgPool,
        id: DbId,
        url: &str,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET images = array_append(images, $2) WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(pool)
            .await
    }
}
