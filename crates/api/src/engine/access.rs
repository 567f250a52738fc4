//! Ownership checks for brands, products and editor sessions.
//!
//! Reading another user's resource answers 404 so ids cannot be enumerated;
//! writing to it answers 403.

use mailspark_core::error::CoreError;
use mailspark_core::types::DbId;
use mailspark_db::models::brand::Brand;
use mailspark_db::models::editor_session::EditorSession;
use mailspark_db::models::product::Product;
use mailspark_db::repositories::{BrandRepo, EditorSessionRepo, ProductRepo};
use mailspark_db::DbPool;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Error for a resource that exists but belongs to someone else, or `Ok`.
pub fn check_owner(
    owner_id: DbId,
    user_id: DbId,
    access: Access,
    entity: &'static str,
    id: DbId,
) -> Result<(), CoreError> {
    if owner_id == user_id {
        return Ok(());
    }
    match access {
        Access::Read => Err(CoreError::not_found(entity, id)),
        Access::Write => Err(CoreError::Forbidden(format!(
            "{entity} {id} belongs to another user"
        ))),
    }
}

/// A live brand owned by `user_id`.
pub async fn owned_brand(
    pool: &DbPool,
    user_id: DbId,
    id: DbId,
    access: Access,
) -> AppResult<Brand> {
    let brand = BrandRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Brand", id))?;
    check_owner(brand.user_id, user_id, access, "Brand", id)?;
    Ok(brand)
}

/// A product whose brand is live and owned by `user_id`, with that brand.
pub async fn owned_product(
    pool: &DbPool,
    user_id: DbId,
    id: DbId,
    access: Access,
) -> AppResult<(Product, Brand)> {
    let product = ProductRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", id))?;
    let brand = BrandRepo::find_by_id(pool, product.brand_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", id))?;
    check_owner(brand.user_id, user_id, access, "Product", id)?;
    Ok((product, brand))
}

/// An editor session owned by `user_id`.
pub async fn owned_session(
    pool: &DbPool,
    user_id: DbId,
    id: DbId,
    access: Access,
) -> AppResult<EditorSession> {
    let session = EditorSessionRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("EditorSession", id))?;
    check_owner(session.user_id, user_id, access, "EditorSession", id)?;
    Ok(session)
}
