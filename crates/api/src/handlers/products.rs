//! Handlers for products. Listing and creation are nested under a brand.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use mailspark_core::error::CoreError;
use mailspark_core::types::DbId;
use mailspark_db::models::product::{CreateProduct, Product, UpdateProduct};
use mailspark_db::repositories::ProductRepo;

use crate::engine::access::{owned_brand, owned_product, Access};
use crate::error::{AppError, AppResult};
use crate::handlers::upload::read_upload;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/brands/{brand_id}/products
pub async fn list_by_brand(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(brand_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    owned_brand(&state.pool, auth.user_id, brand_id, Access::Read).await?;
    let products = ProductRepo::list_by_brand(&state.pool, brand_id).await?;
    Ok(Json(DataResponse::new(products)))
}

/// POST /api/v1/brands/{brand_id}/products
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(brand_id): Path<DbId>,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    if input.product_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "product_name must not be empty".into(),
        )));
    }
    owned_brand(&state.pool, auth.user_id, brand_id, Access::Write).await?;

    let product = ProductRepo::create(&state.pool, brand_id, &input).await?;
    tracing::info!(brand_id, product_id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(product))))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let (product, _) = owned_product(&state.pool, auth.user_id, id, Access::Read).await?;
    Ok(Json(DataResponse::new(product)))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    owned_product(&state.pool, auth.user_id, id, Access::Write).await?;

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;
    Ok(Json(DataResponse::new(product)))
}

/// POST /api/v1/products/{id}/images
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    owned_product(&state.pool, auth.user_id, id, Access::Write).await?;

    let file = read_upload(multipart).await?;
    let url = state
        .storage
        .put_object(auth.user_id, &file.file_name, file.bytes, &file.content_type)
        .await?;

    let product = ProductRepo::add_image(&state.pool, id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(product))))
}
