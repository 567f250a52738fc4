//! Handlers for free-standing uploads under the user's storage prefix.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::upload::{read_upload, sanitize_file_name};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StoredAsset {
    pub file_name: String,
    pub url: String,
}

/// POST /api/v1/assets
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<StoredAsset>>)> {
    let file = read_upload(multipart).await?;
    let url = state
        .storage
        .put_object(auth.user_id, &file.file_name, file.bytes, &file.content_type)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(StoredAsset {
            file_name: file.file_name,
            url,
        })),
    ))
}

/// DELETE /api/v1/assets/{file_name}
///
/// Only ever touches the caller's own prefix.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> AppResult<StatusCode> {
    let file_name = sanitize_file_name(&file_name);
    if file_name.is_empty() {
        return Err(AppError::BadRequest("Invalid file name".into()));
    }
    state.storage.delete_object(auth.user_id, &file_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
