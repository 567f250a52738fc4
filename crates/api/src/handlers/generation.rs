//! Handlers for AI email generation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::engine::generation::{generate_email, GenerateEmailRequest, GeneratedEmail};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/ai/generate
///
/// Runs the full pipeline and returns the new `generated` editor session
/// together with the filled template.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateEmailRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<GeneratedEmail>>)> {
    let generated = generate_email(&state, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(generated))))
}
