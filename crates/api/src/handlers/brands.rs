//! Handlers for the `/brands` resource.
//!
//! Brands are scoped to the signed-in user. Creation is gated by the plan's
//! brand limit; deletion is soft.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use mailspark_core::error::CoreError;
use mailspark_core::providers::owned_file_name;
use mailspark_core::types::DbId;
use mailspark_db::models::brand::{Brand, CreateBrand, UpdateBrand};
use mailspark_db::repositories::BrandRepo;

use crate::engine::access::{owned_brand, Access};
use crate::engine::usage::{check_brand_allowance, require};
use crate::error::{AppError, AppResult};
use crate::handlers::upload::read_upload;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/brands
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Brand>>>> {
    let brands = BrandRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(brands)))
}

/// POST /api/v1/brands
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBrand>,
) -> AppResult<(StatusCode, Json<DataResponse<Brand>>)> {
    if input.brand_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "brand_name must not be empty".into(),
        )));
    }

    require(check_brand_allowance(&state, auth.user_id).await?)?;

    let brand = BrandRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, brand_id = brand.id, "Brand created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(brand))))
}

/// GET /api/v1/brands/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Brand>>> {
    let brand = owned_brand(&state.pool, auth.user_id, id, Access::Read).await?;
    Ok(Json(DataResponse::new(brand)))
}

/// PUT /api/v1/brands/{id}
///
/// Logos dropped from the list are also removed from storage when they were
/// uploaded by this user. Other URLs are left alone. Removal failures are
/// logged and do not fail the request.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBrand>,
) -> AppResult<Json<DataResponse<Brand>>> {
    let existing = owned_brand(&state.pool, auth.user_id, id, Access::Write).await?;

    let brand = BrandRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Brand",
            id,
        }))?;

    if let Some(kept) = &input.logos {
        let removed = existing.logos.iter().filter(|url| !kept.contains(url));
        for url in removed {
            let Some(file_name) = owned_file_name(&*state.storage, auth.user_id, url) else {
                tracing::debug!(brand_id = id, url = %url, "Removed logo is not a stored upload");
                continue;
            };
            if let Err(e) = state.storage.delete_object(auth.user_id, file_name).await {
                tracing::warn!(brand_id = id, url = %url, error = %e, "Failed to delete removed logo");
            }
        }
    }

    Ok(Json(DataResponse::new(brand)))
}

/// DELETE /api/v1/brands/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_brand(&state.pool, auth.user_id, id, Access::Write).await?;

    let deleted = BrandRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(user_id = auth.user_id, brand_id = id, "Brand deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Brand",
            id,
        }))
    }
}

/// POST /api/v1/brands/{id}/logos
///
/// Multipart upload; the `file` field is stored and appended to the logos.
pub async fn upload_logo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Brand>>)> {
    owned_brand(&state.pool, auth.user_id, id, Access::Write).await?;

    let file = read_upload(multipart).await?;
    let url = state
        .storage
        .put_object(auth.user_id, &file.file_name, file.bytes, &file.content_type)
        .await?;

    let brand = BrandRepo::add_logo(&state.pool, id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Brand",
            id,
        }))?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(brand))))
}
