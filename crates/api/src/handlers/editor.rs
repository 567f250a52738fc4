//! Handlers for the `/editor/sessions` resource.
//!
//! Sessions hold an append-only list of compressed template saves plus the
//! URLs of assets uploaded while editing. Sessions created here are always
//! `manual`; `generated` sessions come from `POST /ai/generate`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use mailspark_core::error::CoreError;
use mailspark_core::session_codec::SaveEntry;
use mailspark_core::types::DbId;
use mailspark_db::models::editor_session::{
    CreateEditorSession, EditorSession, EditorSessionSummary, SessionType,
};
use mailspark_db::repositories::EditorSessionRepo;
use serde::{Deserialize, Serialize};

use crate::engine::access::{owned_brand, owned_product, owned_session, Access};
use crate::error::{AppError, AppResult};
use crate::handlers::upload::read_upload;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /editor/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub brand_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub session_name: String,
    /// Optional starting template, stored as the first save.
    pub template: Option<serde_json::Value>,
}

/// Request body for `POST /editor/sessions/{id}/saves`.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub template: serde_json::Value,
}

/// The most recent save, decompressed.
#[derive(Debug, Serialize)]
pub struct LatestSave {
    pub session_id: DbId,
    pub updated_at: String,
    pub template: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/editor/sessions
pub async fn list_sessions(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EditorSessionSummary>>>> {
    let sessions = EditorSessionRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(sessions)))
}

/// POST /api/v1/editor/sessions
pub async fn create_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EditorSession>>)> {
    let session_name = input.session_name.trim();
    if session_name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "session_name must not be empty".into(),
        )));
    }

    if let Some(brand_id) = input.brand_id {
        owned_brand(&state.pool, auth.user_id, brand_id, Access::Read).await?;
    }
    if let Some(product_id) = input.product_id {
        let (product, _) =
            owned_product(&state.pool, auth.user_id, product_id, Access::Read).await?;
        if let Some(brand_id) = input.brand_id.filter(|id| *id != product.brand_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Product {product_id} does not belong to brand {brand_id}"
            ))));
        }
    }

    let initial = match &input.template {
        Some(template) => vec![encode_template(template)?],
        None => Vec::new(),
    };

    let create = CreateEditorSession {
        brand_id: input.brand_id,
        product_id: input.product_id,
        session_name: session_name.to_string(),
        session_type: SessionType::Manual,
    };
    let session = EditorSessionRepo::create(&state.pool, auth.user_id, &create, &initial).await?;

    tracing::info!(user_id = auth.user_id, session_id = session.id, "Editor session created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(session))))
}

/// GET /api/v1/editor/sessions/{id}
pub async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EditorSession>>> {
    let session = owned_session(&state.pool, auth.user_id, id, Access::Read).await?;
    Ok(Json(DataResponse::new(session)))
}

/// POST /api/v1/editor/sessions/{id}/saves
///
/// Appends a save; earlier saves are never rewritten.
pub async fn append_save(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SaveRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EditorSession>>)> {
    owned_session(&state.pool, auth.user_id, id, Access::Write).await?;

    let entry = encode_template(&input.template)?;
    let session = EditorSessionRepo::append_save(&state.pool, id, &entry)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EditorSession",
            id,
        }))?;

    tracing::debug!(
        session_id = id,
        save_count = session.email_saves.0.len(),
        "Save appended"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(session))))
}

/// GET /api/v1/editor/sessions/{id}/latest
pub async fn latest_save(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LatestSave>>> {
    let session = owned_session(&state.pool, auth.user_id, id, Access::Read).await?;
    let entry = session
        .latest_save()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EditorSave",
            id,
        }))?;

    let json = entry.decode()?;
    let template = serde_json::from_str(&json)
        .map_err(|e| AppError::InternalError(format!("Stored save is not JSON: {e}")))?;

    Ok(Json(DataResponse::new(LatestSave {
        session_id: id,
        updated_at: entry.updated_at.clone(),
        template,
    })))
}

/// GET /api/v1/editor/sessions/{id}/assets
pub async fn list_assets(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let session = owned_session(&state.pool, auth.user_id, id, Access::Read).await?;
    Ok(Json(DataResponse::new(session.assets)))
}

/// POST /api/v1/editor/sessions/{id}/assets
pub async fn upload_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<EditorSession>>)> {
    owned_session(&state.pool, auth.user_id, id, Access::Write).await?;

    let file = read_upload(multipart).await?;
    let url = state
        .storage
        .put_object(auth.user_id, &file.file_name, file.bytes, &file.content_type)
        .await?;

    let session = EditorSessionRepo::add_asset(&state.pool, id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EditorSession",
            id,
        }))?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(session))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn encode_template(template: &serde_json::Value) -> AppResult<SaveEntry> {
    if !template.is_object() {
        return Err(AppError::Core(CoreError::Validation(
            "template must be a JSON object".into(),
        )));
    }
    let json = serde_json::to_string_pretty(template)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize template: {e}")))?;
    Ok(SaveEntry::new(&json, chrono::Utc::now())?)
}
